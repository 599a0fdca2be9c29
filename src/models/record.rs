use serde_json::{Map, Value as JsonValue};
use std::sync::Arc;

use crate::errors::{Result, SchemaError};

use super::schema::{ColumnDescriptor, TableDescriptor};
use super::value::{Nullable, Value};

/// One row conforming to a [`TableDescriptor`].
///
/// Every column has a slot; a freshly created record has all slots absent.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    table: Arc<TableDescriptor>,
    values: Vec<Nullable<Value>>,
}

impl Record {
    pub fn new(table: Arc<TableDescriptor>) -> Self {
        let values = vec![Nullable::absent(); table.columns().len()];
        Self { table, values }
    }

    pub fn descriptor(&self) -> &TableDescriptor {
        &self.table
    }

    pub fn descriptor_arc(&self) -> Arc<TableDescriptor> {
        Arc::clone(&self.table)
    }

    /// Stores `value` in `column` after checking its kind, integer range and
    /// declared length. Integers given for float columns are widened.
    pub fn set(&mut self, column: &str, value: impl Into<Value>) -> Result<()> {
        let col = self.column(column)?;
        let index = col.index;
        let value = value.into().coerce_to(col.kind);
        check_value(&self.table.columns()[index], &value)?;
        self.values[index] = Nullable::present(value);
        Ok(())
    }

    pub fn set_null(&mut self, column: &str) -> Result<()> {
        let col = self.column(column)?;
        if !col.is_nullable {
            return Err(SchemaError::Validation(format!(
                "column {}.{} is not nullable",
                self.table.name(),
                col.name
            )));
        }
        let index = col.index;
        self.values[index] = Nullable::absent();
        Ok(())
    }

    pub fn get(&self, column: &str) -> Result<&Nullable<Value>> {
        let index = self.column(column)?.index;
        Ok(&self.values[index])
    }

    /// Columns paired with their current values, in ordinal order.
    pub fn entries(&self) -> impl Iterator<Item = (&ColumnDescriptor, &Nullable<Value>)> {
        self.table.columns().iter().zip(self.values.iter())
    }

    /// Values of the primary-key columns, in ordinal order.
    pub fn primary_key(&self) -> Vec<(&ColumnDescriptor, &Nullable<Value>)> {
        self.entries().filter(|(c, _)| c.is_primary_key).collect()
    }

    /// Checks that every non-nullable column holds a value and that every
    /// present value fits its column.
    pub fn check_shape(&self) -> Result<()> {
        for (column, value) in self.entries() {
            match value.value() {
                Some(v) => check_value(column, v)?,
                None if !column.is_nullable => {
                    return Err(SchemaError::Validation(format!(
                        "column {}.{} requires a value",
                        self.table.name(),
                        column.name
                    )));
                }
                None => {}
            }
        }
        Ok(())
    }

    /// Renders the record as a JSON object keyed by each column's JSON name.
    pub fn to_json(&self) -> Result<JsonValue> {
        let mut map = Map::with_capacity(self.values.len());
        for (column, value) in self.entries() {
            let json = match value.value() {
                Some(v) => v.to_json()?,
                None => JsonValue::Null,
            };
            map.insert(column.json_name.clone(), json);
        }
        Ok(JsonValue::Object(map))
    }

    /// Parses a JSON object keyed by JSON names. Missing keys and `null`
    /// leave the slot absent; unknown keys are rejected.
    pub fn from_json(table: Arc<TableDescriptor>, json: &JsonValue) -> Result<Self> {
        let object = json.as_object().ok_or_else(|| {
            SchemaError::Validation(format!("{} record must be a JSON object", table.name()))
        })?;

        if let Some(unknown) = object
            .keys()
            .find(|key| !table.columns().iter().any(|c| &c.json_name == *key))
        {
            return Err(SchemaError::Validation(format!(
                "unknown key {} for table {}",
                unknown,
                table.name()
            )));
        }

        let mut record = Record::new(Arc::clone(&table));
        for column in table.columns() {
            match object.get(&column.json_name) {
                None | Some(JsonValue::Null) => {}
                Some(json) => {
                    let value = Value::from_json(json, column.kind, column.is_array)
                        .map_err(|e| match e {
                            SchemaError::Validation(msg) => SchemaError::Validation(format!(
                                "{}.{}: {}",
                                table.name(),
                                column.name,
                                msg
                            )),
                            other => other,
                        })?;
                    check_value(column, &value)?;
                    record.values[column.index] = Nullable::present(value);
                }
            }
        }
        Ok(record)
    }

    fn column(&self, name: &str) -> Result<&ColumnDescriptor> {
        self.table.column(name).ok_or_else(|| {
            SchemaError::Validation(format!(
                "table {} has no column {}",
                self.table.name(),
                name
            ))
        })
    }
}

fn check_value(column: &ColumnDescriptor, value: &Value) -> Result<()> {
    if !value.matches(column.kind, column.is_array) {
        return Err(SchemaError::Validation(format!(
            "column {} expects {}{}, got {:?}",
            column.name,
            if column.is_array { "array of " } else { "" },
            column.kind,
            value
        )));
    }

    if let Some((lo, hi)) = column.integer_range {
        let out_of_range = match value {
            Value::Integer(v) => Some(*v).filter(|v| !(lo..=hi).contains(v)),
            Value::Array(items) => items.iter().find_map(|item| match item {
                Value::Integer(v) if !(lo..=hi).contains(v) => Some(*v),
                _ => None,
            }),
            _ => None,
        };
        if let Some(v) = out_of_range {
            return Err(SchemaError::Validation(format!(
                "column {} ({}) cannot hold {}",
                column.name, column.database_type_pretty, v
            )));
        }
    }

    if let (Some(limit), Some(len)) = (column.length, value.declared_len()) {
        if limit > 0 && len as i64 > limit {
            return Err(SchemaError::Validation(format!(
                "column {} holds at most {} characters, got {}",
                column.name, limit, len
            )));
        }
    }
    Ok(())
}
