use async_trait::async_trait;
use log::debug;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    errors::SchemaError,
    models::schema::{ColumnDefinition, TableDefinition},
};

use super::SchemaSource;

const LIST_TABLES: &str = r#"
    SELECT table_name::text AS table_name
    FROM information_schema.tables
    WHERE table_schema = $1 AND table_type = 'BASE TABLE'
    ORDER BY table_name
"#;

const DESCRIBE_TABLE: &str = r#"
    SELECT
        c.column_name::text AS column_name,
        c.data_type::text AS data_type,
        c.udt_name::text AS udt_name,
        c.is_nullable::text AS is_nullable,
        c.column_default::text AS column_default,
        c.character_maximum_length::int4 AS max_length,
        COALESCE(c.column_default LIKE 'nextval(%' OR c.is_identity = 'YES', false)
            AS is_auto_increment,
        EXISTS (
            SELECT 1
            FROM information_schema.table_constraints tc
            JOIN information_schema.key_column_usage kcu
              ON tc.constraint_name = kcu.constraint_name
             AND tc.table_schema = kcu.table_schema
             AND tc.table_name = kcu.table_name
            WHERE tc.constraint_type = 'PRIMARY KEY'
              AND tc.table_schema = c.table_schema
              AND tc.table_name = c.table_name
              AND kcu.column_name = c.column_name
        ) AS is_primary_key,
        pgd.description AS comment
    FROM information_schema.columns c
    LEFT JOIN pg_catalog.pg_statio_all_tables st
      ON st.schemaname = c.table_schema AND st.relname = c.table_name
    LEFT JOIN pg_catalog.pg_description pgd
      ON pgd.objoid = st.relid AND pgd.objsubid = c.ordinal_position
    WHERE c.table_schema = $1 AND c.table_name = $2
    ORDER BY c.ordinal_position
"#;

/// Introspects `information_schema` of a PostgreSQL database.
pub struct PostgresSource {
    pub pool: PgPool,
    pub schema: String,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct PgColumnRow {
    column_name: String,
    data_type: String,
    udt_name: String,
    is_nullable: String,
    column_default: Option<String>,
    max_length: Option<i32>,
    is_auto_increment: bool,
    is_primary_key: bool,
    comment: Option<String>,
}

impl PgColumnRow {
    fn into_definition(self) -> ColumnDefinition {
        // Arrays and user-defined types only carry their element type in udt_name.
        let sql_type = match self.data_type.as_str() {
            "ARRAY" | "USER-DEFINED" => self.udt_name,
            _ => self.data_type,
        };

        ColumnDefinition {
            name: self.column_name,
            sql_type,
            length: self.max_length.map(i64::from),
            is_nullable: self.is_nullable == "YES",
            is_primary_key: self.is_primary_key,
            is_auto_increment: self.is_auto_increment,
            default: self.column_default,
            comment: self.comment,
        }
    }
}

impl PostgresSource {
    pub async fn connect(database_url: &str) -> Result<Self, SchemaError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        Ok(Self {
            pool,
            schema: "public".to_string(),
        })
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }
}

#[async_trait]
impl SchemaSource for PostgresSource {
    async fn list_tables(&self) -> Result<Vec<String>, SchemaError> {
        let tables: Vec<(String,)> = sqlx::query_as(LIST_TABLES)
            .bind(&self.schema)
            .fetch_all(&self.pool)
            .await?;

        Ok(tables.into_iter().map(|(name,)| name).collect())
    }

    async fn describe_table(&self, table_name: &str) -> Result<TableDefinition, SchemaError> {
        let rows: Vec<PgColumnRow> = sqlx::query_as(DESCRIBE_TABLE)
            .bind(&self.schema)
            .bind(table_name)
            .fetch_all(&self.pool)
            .await?;

        if rows.is_empty() {
            return Err(SchemaError::NotFound(table_name.to_string()));
        }
        debug!("postgres: {}.{} has {} columns", self.schema, table_name, rows.len());

        Ok(TableDefinition {
            name: table_name.to_string(),
            columns: rows.into_iter().map(PgColumnRow::into_definition).collect(),
            comment: None,
        })
    }
}
