//! Storage-specific error types.
//!
//! All store operations return [`StorageError`] on failure, which can be
//! matched to tell a load failure (schema or row) from a read failure.

use thiserror::Error;

/// Errors that can occur in the storage layer.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Opening the in-memory database failed.
    #[error("failed to open stats store: {0}")]
    Connect(#[source] sqlx::Error),

    /// DDL or load transaction rejected by the store.
    #[error("schema load failed: {0}")]
    SchemaLoad(#[source] sqlx::Error),

    /// A data row was rejected by the store.
    #[error("schema load failed at row {row}: {source}")]
    RowInsert {
        row: usize,
        #[source]
        source: sqlx::Error,
    },

    /// Read query failed (typically an absent column).
    #[error("query failed: {0}")]
    Query(#[source] sqlx::Error),
}

impl StorageError {
    /// Whether the error aborted loading the feed into the store.
    pub fn is_schema_load(&self) -> bool {
        matches!(self, Self::SchemaLoad(_) | Self::RowInsert { .. })
    }
}
