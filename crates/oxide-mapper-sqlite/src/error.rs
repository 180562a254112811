//! Error types for statement execution.

use oxide_mapper_core::MapperError;

/// Errors that can occur while generating or executing statements.
#[derive(Debug, thiserror::Error)]
pub enum ExecutorError {
    /// Statement generation or row mapping failed.
    #[error("Mapping error: {0}")]
    Mapper(#[from] MapperError),

    /// Database error during execution.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A value SQLite has no storage class for.
    #[error("SQLite cannot bind {0} values")]
    UnsupportedValue(&'static str),
}

/// Result type for executor operations.
pub type Result<T> = std::result::Result<T, ExecutorError>;
