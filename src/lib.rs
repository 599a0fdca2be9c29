//! Language-neutral descriptors of a relational schema (the Keycloak tables
//! built in), generic records conforming to them, and pluggable lifecycle
//! hooks run ahead of persistence.

pub mod client;
pub mod db;
pub mod errors;
pub mod models;
pub mod registry;

pub use errors::{Result, SchemaError};
pub use models::hooks::RecordHooks;
pub use models::record::Record;
pub use models::schema::{
    field_name_for, primary_key_columns, ColumnDefinition, ColumnDescriptor, JsonStyle,
    SerializationFormat, TableDefinition, TableDescriptor,
};
pub use models::value::{Nullable, Value};
pub use registry::SchemaRegistry;
