//! Storage-specific error types.
//!
//! All storage operations return [`StorageError`] on failure, which can be
//! matched to determine the underlying cause (configuration, connection,
//! database).

use thiserror::Error;

/// Errors that can occur in the storage layer.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No database URL configured (neither explicit nor via environment).
    #[error("database URL not configured: {0}")]
    Configuration(String),

    /// Failed to establish the initial database connection.
    #[error("database connection failed: {0}")]
    Connection(#[source] sqlx::Error),

    /// Database operation failed (sqlx error).
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StorageError {
    /// Whether the failure happened while configuring or reaching the
    /// database, as opposed to during an otherwise-valid operation.
    pub fn is_connect_failure(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::Connection(_))
    }
}
