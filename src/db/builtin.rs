use async_trait::async_trait;

use crate::{
    errors::SchemaError,
    models::{keycloak::keycloak_tables, schema::TableDefinition},
};

use super::SchemaSource;

/// Serves the built-in Keycloak catalog.
pub struct BuiltinSource;

#[async_trait]
impl SchemaSource for BuiltinSource {
    async fn list_tables(&self) -> Result<Vec<String>, SchemaError> {
        Ok(keycloak_tables().into_iter().map(|t| t.name).collect())
    }

    async fn describe_table(&self, table_name: &str) -> Result<TableDefinition, SchemaError> {
        keycloak_tables()
            .into_iter()
            .find(|t| t.name.eq_ignore_ascii_case(table_name))
            .ok_or_else(|| SchemaError::NotFound(table_name.to_string()))
    }
}
