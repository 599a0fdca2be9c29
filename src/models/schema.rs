use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;

use crate::errors::{Result, SchemaError};

use super::naming::{
    lower_camel_case, proto_field_name, rust_field_name, snake_case, upper_camel_case,
};
use super::types::{SqlType, ValueKind};

/// Declarative input describing one column, as produced by a schema source.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ColumnDefinition {
    pub name: String,
    pub sql_type: String,
    /// Overrides any length given inside `sql_type`.
    #[serde(default)]
    pub length: Option<i64>,
    #[serde(default = "default_nullable")]
    pub is_nullable: bool,
    #[serde(default)]
    pub is_primary_key: bool,
    #[serde(default)]
    pub is_auto_increment: bool,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

fn default_nullable() -> bool {
    true
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
            length: None,
            is_nullable: true,
            is_primary_key: false,
            is_auto_increment: false,
            default: None,
            comment: None,
        }
    }

    pub fn length(mut self, length: i64) -> Self {
        self.length = Some(length);
        self
    }

    pub fn not_null(mut self) -> Self {
        self.is_nullable = false;
        self
    }

    /// Marks the column as part of the primary key. Key columns are never
    /// nullable.
    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self.is_nullable = false;
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.is_auto_increment = true;
        self
    }

    pub fn default_value(mut self, expr: impl Into<String>) -> Self {
        self.default = Some(expr.into());
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// Declarative input describing one table.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TableDefinition {
    pub name: String,
    pub columns: Vec<ColumnDefinition>,
    #[serde(default)]
    pub comment: Option<String>,
}

impl TableDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            comment: None,
        }
    }

    pub fn column(mut self, column: ColumnDefinition) -> Self {
        self.columns.push(column);
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// Serialization targets a column can be named for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SerializationFormat {
    Native,
    Json,
    Protobuf,
}

impl FromStr for SerializationFormat {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "native" | "rust" | "field" => Ok(SerializationFormat::Native),
            "json" => Ok(SerializationFormat::Json),
            "protobuf" | "proto" => Ok(SerializationFormat::Protobuf),
            _ => Err(SchemaError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Casing applied to JSON keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JsonStyle {
    #[default]
    Snake,
    Camel,
    LowerCamel,
}

impl JsonStyle {
    pub fn apply(self, name: &str) -> String {
        match self {
            JsonStyle::Snake => snake_case(name),
            JsonStyle::Camel => upper_camel_case(name),
            JsonStyle::LowerCamel => lower_camel_case(name),
        }
    }
}

impl FromStr for JsonStyle {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "snake" | "snake_case" => Ok(JsonStyle::Snake),
            "camel" | "upper_camel" => Ok(JsonStyle::Camel),
            "lower_camel" | "lowercamel" => Ok(JsonStyle::LowerCamel),
            other => Err(SchemaError::Config(format!("unknown JSON style: {}", other))),
        }
    }
}

/// Immutable metadata for one column.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ColumnDescriptor {
    pub index: usize,
    pub name: String,
    pub database_type_name: String,
    pub database_type_pretty: String,
    pub is_nullable: bool,
    pub is_primary_key: bool,
    pub is_auto_increment: bool,
    pub is_array: bool,
    pub length: Option<i64>,
    pub default: Option<String>,
    pub comment: Option<String>,
    pub kind: ValueKind,
    /// Inclusive bounds for integer columns, from the SQL type's width.
    #[serde(default)]
    pub integer_range: Option<(i64, i64)>,
    pub field_name: String,
    pub field_type: String,
    pub json_name: String,
    pub proto_name: String,
    pub proto_number: u32,
    pub proto_type: String,
}

impl ColumnDescriptor {
    fn build(index: usize, def: &ColumnDefinition, style: JsonStyle) -> Result<Self> {
        let mut sql_type = SqlType::parse(&def.sql_type);
        if def.length.is_some() {
            sql_type.length = def.length;
        }
        if sql_type.name.is_empty() {
            return Err(SchemaError::InvalidDefinition(format!(
                "column {} has no SQL type",
                def.name
            )));
        }

        // Key columns form the table's identity and are never nullable,
        // whatever the source reported.
        let is_nullable = def.is_nullable && !def.is_primary_key;

        let kind = sql_type.kind();
        let mut field_type = kind.native_type().to_string();
        if sql_type.array {
            field_type = format!("Vec<{}>", field_type);
        }
        if is_nullable {
            field_type = format!("Nullable<{}>", field_type);
        }

        let proto_number = u32::try_from(index + 1).map_err(|_| {
            SchemaError::InvalidDefinition(format!("too many columns at {}", def.name))
        })?;

        Ok(Self {
            index,
            name: def.name.clone(),
            database_type_pretty: sql_type.pretty(),
            database_type_name: sql_type.name.clone(),
            is_nullable,
            is_primary_key: def.is_primary_key,
            is_auto_increment: def.is_auto_increment,
            is_array: sql_type.array,
            length: sql_type.length,
            default: def.default.clone(),
            comment: def.comment.clone(),
            kind,
            integer_range: sql_type.integer_range(),
            field_name: rust_field_name(&def.name),
            field_type,
            json_name: style.apply(&def.name),
            proto_name: proto_field_name(&def.name),
            proto_number,
            proto_type: kind.proto_type().to_string(),
        })
    }

    /// Name of this column under `format`.
    pub fn field_name(&self, format: SerializationFormat) -> &str {
        match format {
            SerializationFormat::Native => &self.field_name,
            SerializationFormat::Json => &self.json_name,
            SerializationFormat::Protobuf => &self.proto_name,
        }
    }
}

/// Immutable metadata for one table: its name and ordered columns.
///
/// Only constructed through [`TableDescriptor::from_definition`], which
/// guarantees contiguous ordinals starting at 0 and unique column names.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct TableDescriptor {
    name: String,
    comment: Option<String>,
    columns: Vec<ColumnDescriptor>,
}

impl TableDescriptor {
    pub fn from_definition(def: &TableDefinition, style: JsonStyle) -> Result<Self> {
        if def.name.trim().is_empty() {
            return Err(SchemaError::InvalidDefinition(
                "table name is empty".to_string(),
            ));
        }
        if def.columns.is_empty() {
            return Err(SchemaError::InvalidDefinition(format!(
                "table {} has no columns",
                def.name
            )));
        }

        let mut seen_names = HashSet::new();
        let mut seen_fields = HashSet::new();
        let mut columns = Vec::with_capacity(def.columns.len());

        for (index, column_def) in def.columns.iter().enumerate() {
            if column_def.name.trim().is_empty() {
                return Err(SchemaError::InvalidDefinition(format!(
                    "table {} has a column without a name at position {}",
                    def.name, index
                )));
            }
            if !seen_names.insert(column_def.name.to_ascii_lowercase()) {
                return Err(SchemaError::InvalidDefinition(format!(
                    "duplicate column {} in table {}",
                    column_def.name, def.name
                )));
            }

            let column = ColumnDescriptor::build(index, column_def, style)?;
            if !seen_fields.insert(column.json_name.clone()) {
                return Err(SchemaError::InvalidDefinition(format!(
                    "column {} in table {} collides with another column on key {}",
                    column.name, def.name, column.json_name
                )));
            }
            columns.push(column);
        }

        let descriptor = Self {
            name: def.name.clone(),
            comment: def.comment.clone(),
            columns,
        };

        if descriptor.primary_key_columns().is_empty() {
            warn!("table {} has no primary key columns", descriptor.name);
        }
        debug!(
            "built descriptor for {} with {} columns",
            descriptor.name,
            descriptor.columns.len()
        );

        Ok(descriptor)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    /// Case-insensitive column lookup.
    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn primary_key_columns(&self) -> Vec<&ColumnDescriptor> {
        primary_key_columns(self)
    }
}

/// Columns flagged primary key, in ascending ordinal order. May be empty.
pub fn primary_key_columns(table: &TableDescriptor) -> Vec<&ColumnDescriptor> {
    table.columns.iter().filter(|c| c.is_primary_key).collect()
}

/// Name of `column` under the serialization format called `format`.
pub fn field_name_for<'a>(column: &'a ColumnDescriptor, format: &str) -> Result<&'a str> {
    let format = format.parse::<SerializationFormat>()?;
    Ok(column.field_name(format))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget() -> TableDefinition {
        TableDefinition::new("widget")
            .column(ColumnDefinition::new("id", "VARCHAR(36)").primary_key())
            .column(ColumnDefinition::new("label", "VARCHAR(255)"))
    }

    #[test]
    fn test_widget_descriptor() {
        let table = TableDescriptor::from_definition(&widget(), JsonStyle::Snake).unwrap();

        assert_eq!(table.name(), "widget");
        let ordinals: Vec<usize> = table.columns().iter().map(|c| c.index).collect();
        assert_eq!(ordinals, vec![0, 1]);

        let id = &table.columns()[0];
        assert_eq!(id.database_type_name, "VARCHAR");
        assert_eq!(id.database_type_pretty, "VARCHAR(36)");
        assert_eq!(id.length, Some(36));
        assert!(!id.is_nullable);
        assert_eq!(id.field_type, "String");
        assert_eq!(id.proto_number, 1);

        let label = table.column("LABEL").unwrap();
        assert!(label.is_nullable);
        assert_eq!(label.field_type, "Nullable<String>");
        assert_eq!(field_name_for(label, "json").unwrap(), "label");
    }

    #[test]
    fn test_primary_key_columns_in_ordinal_order() {
        let def = TableDefinition::new("user_role_mapping")
            .column(ColumnDefinition::new("ROLE_ID", "VARCHAR(255)").primary_key())
            .column(ColumnDefinition::new("NOTE", "TEXT"))
            .column(ColumnDefinition::new("USER_ID", "VARCHAR(36)").primary_key());
        let table = TableDescriptor::from_definition(&def, JsonStyle::Snake).unwrap();

        let first: Vec<&str> = table
            .primary_key_columns()
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        let second: Vec<&str> = primary_key_columns(&table)
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(first, vec!["ROLE_ID", "USER_ID"]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_table_without_primary_key_is_valid() {
        let def = TableDefinition::new("migration_model_log")
            .column(ColumnDefinition::new("VERSION", "VARCHAR(36)"));
        let table = TableDescriptor::from_definition(&def, JsonStyle::Snake).unwrap();
        assert!(table.primary_key_columns().is_empty());
    }

    #[test]
    fn test_field_name_for_formats() {
        let def = TableDefinition::new("user_entity")
            .column(ColumnDefinition::new("ID", "VARCHAR(36)").primary_key())
            .column(ColumnDefinition::new("FIRST_NAME", "VARCHAR(255)"))
            .column(ColumnDefinition::new("TYPE", "INT"));
        let table = TableDescriptor::from_definition(&def, JsonStyle::LowerCamel).unwrap();
        let first_name = table.column("first_name").unwrap();
        let ty = table.column("type").unwrap();

        assert_eq!(field_name_for(first_name, "native").unwrap(), "first_name");
        assert_eq!(field_name_for(first_name, "JSON").unwrap(), "firstName");
        assert_eq!(field_name_for(first_name, "protobuf").unwrap(), "first_name");
        assert_eq!(field_name_for(ty, "native").unwrap(), "r#type");
        assert_eq!(
            field_name_for(first_name, "json").unwrap(),
            field_name_for(first_name, "json").unwrap()
        );
    }

    #[test]
    fn test_unsupported_format() {
        let table = TableDescriptor::from_definition(&widget(), JsonStyle::Snake).unwrap();
        let err = field_name_for(&table.columns()[0], "xml").unwrap_err();
        assert!(matches!(err, SchemaError::UnsupportedFormat(name) if name == "xml"));
    }

    #[test]
    fn test_duplicate_columns_rejected() {
        let def = TableDefinition::new("realm")
            .column(ColumnDefinition::new("ID", "VARCHAR(36)").primary_key())
            .column(ColumnDefinition::new("id", "VARCHAR(36)"));
        let err = TableDescriptor::from_definition(&def, JsonStyle::Snake).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidDefinition(_)));

        let def = TableDefinition::new("realm")
            .column(ColumnDefinition::new("REALM_ID", "VARCHAR(36)"))
            .column(ColumnDefinition::new("realmId", "VARCHAR(36)"));
        let err = TableDescriptor::from_definition(&def, JsonStyle::Snake).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidDefinition(_)));
    }

    #[test]
    fn test_empty_table_rejected() {
        let err = TableDescriptor::from_definition(&TableDefinition::new("empty"), JsonStyle::Snake)
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidDefinition(_)));
    }

    #[test]
    fn test_length_override_and_arrays() {
        let def = TableDefinition::new("t")
            .column(ColumnDefinition::new("NAME", "varchar").length(100).not_null())
            .column(ColumnDefinition::new("TAGS", "text[]"));
        let table = TableDescriptor::from_definition(&def, JsonStyle::Snake).unwrap();

        assert_eq!(table.columns()[0].database_type_pretty, "VARCHAR(100)");
        let tags = &table.columns()[1];
        assert!(tags.is_array);
        assert_eq!(tags.field_type, "Nullable<Vec<String>>");
    }

    #[test]
    fn test_primary_key_from_json_is_not_nullable() {
        let def: TableDefinition = serde_json::from_str(
            r#"{"name": "widget", "columns": [
                {"name": "id", "sql_type": "VARCHAR(36)", "is_primary_key": true}
            ]}"#,
        )
        .unwrap();
        assert!(def.columns[0].is_nullable);

        let table = TableDescriptor::from_definition(&def, JsonStyle::Snake).unwrap();
        let id = &table.columns()[0];
        assert!(!id.is_nullable);
        assert_eq!(id.field_type, "String");
    }

    #[test]
    fn test_integer_range_and_proto_name() {
        let def = TableDefinition::new("t")
            .column(ColumnDefinition::new("2FA", "SMALLINT"))
            .column(ColumnDefinition::new("LABEL", "VARCHAR(10)"));
        let table = TableDescriptor::from_definition(&def, JsonStyle::Snake).unwrap();

        assert_eq!(table.columns()[0].integer_range, Some((-32768, 32767)));
        assert_eq!(table.columns()[0].proto_name, "f_2_fa");
        assert_eq!(table.columns()[1].integer_range, None);
    }

    #[test]
    fn test_definition_from_json_defaults() {
        let def: TableDefinition = serde_json::from_str(
            r#"{"name": "widget", "columns": [
                {"name": "id", "sql_type": "VARCHAR(36)", "is_nullable": false, "is_primary_key": true},
                {"name": "label", "sql_type": "VARCHAR(255)"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(def, widget());
    }
}
