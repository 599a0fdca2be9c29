use thiserror::Error;

/// Error type shared by descriptors, records and schema sources.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The requested table is not registered.
    #[error("Table not found: {0}")]
    NotFound(String),
    /// The requested serialization format is not known.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    /// A record was rejected by a shape check or a lifecycle hook.
    #[error("Validation error: {0}")]
    Validation(String),
    /// A table definition breaks descriptor invariants.
    #[error("Invalid definition: {0}")]
    InvalidDefinition(String),
    /// A schema source could not produce definitions (I/O, bad catalog).
    #[error("Source error: {0}")]
    Source(String),
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Missing or malformed configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, SchemaError>;
