use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::errors::{Result, SchemaError};

use super::types::ValueKind;

/// An optional column value. Absent means SQL `NULL`.
///
/// Unlike driver-specific null wrappers this carries no database vocabulary:
/// it is a presence flag plus the underlying value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Nullable<T>(Option<T>);

impl<T> Nullable<T> {
    pub fn present(value: T) -> Self {
        Nullable(Some(value))
    }

    pub fn absent() -> Self {
        Nullable(None)
    }

    pub fn is_present(&self) -> bool {
        self.0.is_some()
    }

    pub fn is_absent(&self) -> bool {
        self.0.is_none()
    }

    pub fn value(&self) -> Option<&T> {
        self.0.as_ref()
    }

    pub fn into_option(self) -> Option<T> {
        self.0
    }
}

impl<T> Default for Nullable<T> {
    fn default() -> Self {
        Nullable(None)
    }
}

impl<T> From<Option<T>> for Nullable<T> {
    fn from(value: Option<T>) -> Self {
        Nullable(value)
    }
}

/// A single column value held by a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Text(String),
    Integer(i64),
    Boolean(bool),
    Float(f64),
    Bytes(Vec<u8>),
    Timestamp(NaiveDateTime),
    Array(Vec<Value>),
}

impl Value {
    /// Whether this value can be stored in a column of `kind`.
    pub fn matches(&self, kind: ValueKind, array: bool) -> bool {
        match self {
            Value::Array(items) => array && items.iter().all(|item| item.matches(kind, false)),
            _ if array => false,
            Value::Text(_) => kind == ValueKind::Text,
            Value::Integer(v) => match kind {
                ValueKind::Integer => i32::try_from(*v).is_ok(),
                ValueKind::BigInteger => true,
                _ => false,
            },
            Value::Boolean(_) => kind == ValueKind::Boolean,
            Value::Float(_) => matches!(kind, ValueKind::Float | ValueKind::Double),
            Value::Bytes(_) => kind == ValueKind::Bytes,
            Value::Timestamp(_) => kind == ValueKind::Timestamp,
        }
    }

    /// Widens integers stored into a float column, the way JSON numbers are
    /// read for one.
    pub fn coerce_to(self, kind: ValueKind) -> Value {
        match (self, kind) {
            (Value::Integer(v), ValueKind::Float | ValueKind::Double) => Value::Float(v as f64),
            (Value::Array(items), _) => {
                Value::Array(items.into_iter().map(|item| item.coerce_to(kind)).collect())
            }
            (value, _) => value,
        }
    }

    /// Length used for declared-length checks: characters for text, octets
    /// for bytes.
    pub fn declared_len(&self) -> Option<usize> {
        match self {
            Value::Text(s) => Some(s.chars().count()),
            Value::Bytes(b) => Some(b.len()),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Result<JsonValue> {
        let json = match self {
            Value::Text(s) => JsonValue::String(s.clone()),
            Value::Integer(v) => JsonValue::from(*v),
            Value::Boolean(v) => JsonValue::Bool(*v),
            Value::Float(v) => serde_json::Number::from_f64(*v)
                .map(JsonValue::Number)
                .ok_or_else(|| {
                    SchemaError::Validation(format!("{} has no JSON representation", v))
                })?,
            Value::Bytes(b) => serde_json::to_value(b)?,
            Value::Timestamp(ts) => serde_json::to_value(ts)?,
            Value::Array(items) => JsonValue::Array(
                items
                    .iter()
                    .map(Value::to_json)
                    .collect::<Result<Vec<_>>>()?,
            ),
        };
        Ok(json)
    }

    /// Reads a JSON value as a value of `kind`.
    pub fn from_json(json: &JsonValue, kind: ValueKind, array: bool) -> Result<Self> {
        if array {
            let items = json
                .as_array()
                .ok_or_else(|| mismatch(json, kind, true))?
                .iter()
                .map(|item| Value::from_json(item, kind, false))
                .collect::<Result<Vec<_>>>()?;
            return Ok(Value::Array(items));
        }

        let value = match kind {
            ValueKind::Text => json.as_str().map(|s| Value::Text(s.to_string())),
            ValueKind::Integer | ValueKind::BigInteger => json.as_i64().map(Value::Integer),
            ValueKind::Boolean => json.as_bool().map(Value::Boolean),
            ValueKind::Float | ValueKind::Double => json.as_f64().map(Value::Float),
            ValueKind::Bytes => serde_json::from_value::<Vec<u8>>(json.clone())
                .ok()
                .map(Value::Bytes),
            ValueKind::Timestamp => serde_json::from_value::<NaiveDateTime>(json.clone())
                .ok()
                .map(Value::Timestamp),
        };

        value
            .filter(|v| v.matches(kind, false))
            .ok_or_else(|| mismatch(json, kind, false))
    }
}

fn mismatch(json: &JsonValue, kind: ValueKind, array: bool) -> SchemaError {
    let expected = if array {
        format!("array of {}", kind)
    } else {
        kind.to_string()
    };
    SchemaError::Validation(format!("expected {}, got {}", expected, json))
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(value.into())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Bytes(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Value::Timestamp(value)
    }
}
