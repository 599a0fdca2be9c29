use serde::{Deserialize, Serialize};
use std::fmt;

/// The shape of values a column holds, independent of SQL dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Text,
    Integer,
    BigInteger,
    Boolean,
    Float,
    Double,
    Bytes,
    Timestamp,
}

impl ValueKind {
    /// Rust type used for a column of this kind.
    pub fn native_type(self) -> &'static str {
        match self {
            ValueKind::Text => "String",
            ValueKind::Integer => "i32",
            ValueKind::BigInteger => "i64",
            ValueKind::Boolean => "bool",
            ValueKind::Float => "f32",
            ValueKind::Double => "f64",
            ValueKind::Bytes => "Vec<u8>",
            ValueKind::Timestamp => "chrono::NaiveDateTime",
        }
    }

    /// Protobuf scalar (or well-known) type for a column of this kind.
    pub fn proto_type(self) -> &'static str {
        match self {
            ValueKind::Text => "string",
            ValueKind::Integer => "int32",
            ValueKind::BigInteger => "int64",
            ValueKind::Boolean => "bool",
            ValueKind::Float => "float",
            ValueKind::Double => "double",
            ValueKind::Bytes => "bytes",
            ValueKind::Timestamp => "google.protobuf.Timestamp",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Text => "text",
            ValueKind::Integer => "integer",
            ValueKind::BigInteger => "big integer",
            ValueKind::Boolean => "boolean",
            ValueKind::Float => "float",
            ValueKind::Double => "double",
            ValueKind::Bytes => "bytes",
            ValueKind::Timestamp => "timestamp",
        };
        f.write_str(name)
    }
}

/// A parsed SQL column type such as `VARCHAR(36)`, `bit(1)`, `text[]` or
/// `DECIMAL(19,2)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlType {
    pub name: String,
    pub length: Option<i64>,
    pub scale: Option<i64>,
    pub array: bool,
    pub unsigned: bool,
}

impl SqlType {
    pub fn parse(raw: &str) -> Self {
        let mut text = raw.trim().to_ascii_uppercase();
        let mut array = false;

        if let Some(stripped) = text.strip_suffix("[]") {
            text = stripped.trim_end().to_string();
            array = true;
        } else if let Some(stripped) = text.strip_prefix('_') {
            // Postgres reports array element types as `_int4`, `_text`, ...
            text = stripped.to_string();
            array = true;
        }

        let (mut name, params) = match (text.find('('), text.rfind(')')) {
            (Some(open), Some(close)) if close > open => {
                let params = text[open + 1..close].to_string();
                let name = format!("{}{}", &text[..open], &text[close + 1..]);
                (name, Some(params))
            }
            _ => (text.clone(), None),
        };

        let mut unsigned = false;
        for suffix in [" ZEROFILL", " UNSIGNED"] {
            if let Some(stripped) = name.strip_suffix(suffix) {
                unsigned |= suffix == " UNSIGNED";
                name = stripped.to_string();
            }
        }
        let name = name.split_whitespace().collect::<Vec<_>>().join(" ");

        let mut length = None;
        let mut scale = None;
        if let Some(params) = params {
            let mut parts = params.split(',').map(|p| p.trim().parse::<i64>().ok());
            length = parts.next().flatten();
            scale = parts.next().flatten();
        }

        Self {
            name,
            length,
            scale,
            array,
            unsigned,
        }
    }

    /// Maps the type to a value kind. Unrecognized types fall back to text.
    pub fn kind(&self) -> ValueKind {
        match self.name.as_str() {
            "BIT" if self.length.map_or(true, |l| l <= 1) => ValueKind::Boolean,
            "BIT" | "VARBIT" | "BIT VARYING" => ValueKind::Bytes,
            "TINYINT" if self.length == Some(1) => ValueKind::Boolean,
            "BOOL" | "BOOLEAN" => ValueKind::Boolean,
            // An unsigned INT does not fit in i32.
            "INT" | "INTEGER" if self.unsigned => ValueKind::BigInteger,
            "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "INTEGER" | "INT2" | "INT4"
            | "SERIAL" | "SMALLSERIAL" | "YEAR" => ValueKind::Integer,
            "BIGINT" | "INT8" | "BIGSERIAL" => ValueKind::BigInteger,
            "FLOAT" | "FLOAT4" | "REAL" => ValueKind::Float,
            "DOUBLE" | "DOUBLE PRECISION" | "FLOAT8" | "DECIMAL" | "NUMERIC" | "DEC" => {
                ValueKind::Double
            }
            "BLOB" | "TINYBLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BINARY" | "VARBINARY"
            | "BYTEA" => ValueKind::Bytes,
            "DATE" | "DATETIME" | "TIMESTAMP" | "TIMESTAMPTZ" | "TIMESTAMP WITHOUT TIME ZONE"
            | "TIMESTAMP WITH TIME ZONE" => ValueKind::Timestamp,
            _ => ValueKind::Text,
        }
    }

    /// Inclusive bounds of an integer type; `None` for other types.
    pub fn integer_range(&self) -> Option<(i64, i64)> {
        let bits = match self.kind() {
            ValueKind::Integer | ValueKind::BigInteger => match self.name.as_str() {
                "TINYINT" => 8,
                "SMALLINT" | "INT2" | "SMALLSERIAL" => 16,
                "MEDIUMINT" => 24,
                "YEAR" => return Some((0, 9999)),
                "BIGINT" | "INT8" | "BIGSERIAL" => 64,
                _ => 32,
            },
            _ => return None,
        };

        let range = match (bits, self.unsigned) {
            (64, true) => (0, i64::MAX),
            (64, false) => (i64::MIN, i64::MAX),
            (bits, true) => (0, (1i64 << bits) - 1),
            (bits, false) => (-(1i64 << (bits - 1)), (1i64 << (bits - 1)) - 1),
        };
        Some(range)
    }

    /// `VARCHAR(36)`, `DECIMAL(19,2)`, `TEXT[]`.
    pub fn pretty(&self) -> String {
        let mut out = self.name.clone();
        match (self.length, self.scale) {
            (Some(length), Some(scale)) => out.push_str(&format!("({},{})", length, scale)),
            (Some(length), None) => out.push_str(&format!("({})", length)),
            _ => {}
        }
        if self.array {
            out.push_str("[]");
        }
        out
    }
}
