use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use crate::{errors::SchemaError, models::schema::TableDefinition};

use super::SchemaSource;

/// On-disk catalog: `{"tables": [...]}`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct CatalogDocument {
    pub tables: Vec<TableDefinition>,
}

impl CatalogDocument {
    pub async fn read(path: &Path) -> Result<Self, SchemaError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| SchemaError::Source(format!("{}: {}", path.display(), e)))?;
        let document = serde_json::from_str(&content)?;
        Ok(document)
    }

    pub async fn write(&self, path: &Path) -> Result<(), SchemaError> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content)
            .await
            .map_err(|e| SchemaError::Source(format!("{}: {}", path.display(), e)))
    }
}

/// Reads table definitions from a JSON catalog file.
///
/// `list_tables` re-reads the file and keeps the parsed document for the
/// `describe_table` calls that follow, so a load reads the file once and
/// edits made between loads are still seen.
pub struct FileSource {
    path: PathBuf,
    document: Mutex<Option<CatalogDocument>>,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            document: Mutex::new(None),
        }
    }
}

#[async_trait]
impl SchemaSource for FileSource {
    async fn list_tables(&self) -> Result<Vec<String>, SchemaError> {
        let document = CatalogDocument::read(&self.path).await?;
        let names = document.tables.iter().map(|t| t.name.clone()).collect();
        *self.document.lock().await = Some(document);
        Ok(names)
    }

    async fn describe_table(&self, table_name: &str) -> Result<TableDefinition, SchemaError> {
        let mut cached = self.document.lock().await;
        if cached.is_none() {
            *cached = Some(CatalogDocument::read(&self.path).await?);
        }

        cached
            .iter()
            .flat_map(|document| document.tables.iter())
            .find(|t| t.name.eq_ignore_ascii_case(table_name))
            .cloned()
            .ok_or_else(|| SchemaError::NotFound(table_name.to_string()))
    }
}
