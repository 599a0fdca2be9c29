use async_trait::async_trait;
use log::debug;
use sqlx::{mysql::MySqlPoolOptions, MySqlPool};

use crate::{
    errors::SchemaError,
    models::schema::{ColumnDefinition, TableDefinition},
};

use super::SchemaSource;

const LIST_TABLES: &str = r#"
    SELECT CAST(TABLE_NAME AS CHAR) AS table_name
    FROM information_schema.TABLES
    WHERE TABLE_SCHEMA = DATABASE() AND TABLE_TYPE = 'BASE TABLE'
    ORDER BY TABLE_NAME
"#;

const DESCRIBE_TABLE: &str = r#"
    SELECT
        CAST(COLUMN_NAME AS CHAR) AS column_name,
        CAST(COLUMN_TYPE AS CHAR) AS column_type,
        CAST(IS_NULLABLE AS CHAR) AS is_nullable,
        CAST(COLUMN_DEFAULT AS CHAR) AS column_default,
        CAST(COLUMN_KEY AS CHAR) AS column_key,
        CAST(EXTRA AS CHAR) AS extra,
        CAST(COLUMN_COMMENT AS CHAR) AS column_comment
    FROM information_schema.COLUMNS
    WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ?
    ORDER BY ORDINAL_POSITION
"#;

/// Introspects `information_schema` of the connected MySQL/MariaDB database.
pub struct MySqlSource {
    pub pool: MySqlPool,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct MySqlColumnRow {
    column_name: String,
    column_type: String,
    is_nullable: String,
    column_default: Option<String>,
    column_key: String,
    extra: String,
    column_comment: Option<String>,
}

impl MySqlColumnRow {
    fn into_definition(self) -> ColumnDefinition {
        // COLUMN_TYPE already carries the declared length, e.g. `varchar(36)`.
        ColumnDefinition {
            name: self.column_name,
            sql_type: self.column_type,
            length: None,
            is_nullable: self.is_nullable == "YES",
            is_primary_key: self.column_key == "PRI",
            is_auto_increment: self.extra.to_ascii_lowercase().contains("auto_increment"),
            default: self.column_default,
            comment: self.column_comment.filter(|c| !c.is_empty()),
        }
    }
}

impl MySqlSource {
    pub async fn connect(database_url: &str) -> Result<Self, SchemaError> {
        let pool = MySqlPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl SchemaSource for MySqlSource {
    async fn list_tables(&self) -> Result<Vec<String>, SchemaError> {
        let tables: Vec<(String,)> = sqlx::query_as(LIST_TABLES).fetch_all(&self.pool).await?;
        Ok(tables.into_iter().map(|(name,)| name).collect())
    }

    async fn describe_table(&self, table_name: &str) -> Result<TableDefinition, SchemaError> {
        let rows: Vec<MySqlColumnRow> = sqlx::query_as(DESCRIBE_TABLE)
            .bind(table_name)
            .fetch_all(&self.pool)
            .await?;

        if rows.is_empty() {
            return Err(SchemaError::NotFound(table_name.to_string()));
        }
        debug!("mysql: {} has {} columns", table_name, rows.len());

        Ok(TableDefinition {
            name: table_name.to_string(),
            columns: rows
                .into_iter()
                .map(MySqlColumnRow::into_definition)
                .collect(),
            comment: None,
        })
    }
}
