use async_trait::async_trait;
use log::{debug, info};

use crate::{
    errors::SchemaError,
    models::{
        config::{SourceConfig, SourceType},
        schema::{JsonStyle, TableDefinition},
    },
    registry::SchemaRegistry,
};

pub mod builtin;
pub mod file;
pub mod mysql;
pub mod postgres;

/// Produces table definitions that seed a [`SchemaRegistry`]: a live
/// database catalog, a catalog file, or the built-in Keycloak tables.
#[async_trait]
pub trait SchemaSource {
    async fn list_tables(&self) -> Result<Vec<String>, SchemaError>;
    async fn describe_table(&self, table_name: &str) -> Result<TableDefinition, SchemaError>;
}

/// Describes every table the source lists and registers it.
pub async fn load_registry<S>(
    source: &S,
    json_style: JsonStyle,
) -> Result<SchemaRegistry, SchemaError>
where
    S: SchemaSource + Sync + ?Sized,
{
    let mut registry = SchemaRegistry::with_json_style(json_style);

    for table_name in source.list_tables().await? {
        let definition = source.describe_table(&table_name).await?;
        debug!(
            "described {} ({} columns)",
            table_name,
            definition.columns.len()
        );
        registry.register(definition)?;
    }

    info!("loaded {} tables into the schema registry", registry.len());
    Ok(registry)
}

/// Opens the source named by `config`.
pub async fn open_source(
    config: &SourceConfig,
) -> Result<Box<dyn SchemaSource + Send + Sync>, SchemaError> {
    let location = config.require_location()?;

    let source: Box<dyn SchemaSource + Send + Sync> = match (config.source_type, location) {
        (SourceType::Builtin, _) => Box::new(builtin::BuiltinSource),
        (SourceType::File, Some(path)) => Box::new(file::FileSource::new(path)),
        (SourceType::Postgres, Some(url)) => Box::new(postgres::PostgresSource::connect(url).await?),
        (SourceType::MySql, Some(url)) => Box::new(mysql::MySqlSource::connect(url).await?),
        (source, None) => {
            return Err(SchemaError::Config(format!(
                "no location configured for source {:?}",
                source
            )))
        }
    };
    Ok(source)
}

/// Opens the configured source and loads a registry from it.
pub async fn load_from_config(config: &SourceConfig) -> Result<SchemaRegistry, SchemaError> {
    let source = open_source(config).await?;
    load_registry(source.as_ref(), config.json_style).await
}
