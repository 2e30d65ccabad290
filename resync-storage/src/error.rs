//! Error types for the storage layer.

use resync_types::ResourceId;
use thiserror::Error;

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Resource not found.
    #[error("resource not found: {0}")]
    NotFound(ResourceId),

    /// Provisioning hit an existing resource.
    #[error("resource already exists: {0}")]
    AlreadyExists(ResourceId),

    /// The write lock was not acquired in time.
    #[error("timed out after {waited_ms}ms waiting for write lock on {id}")]
    Timeout { id: ResourceId, waited_ms: u64 },

    /// The transaction was invalidated by an earlier structural change.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Unexpected backend failure.
    #[error("internal store error: {0}")]
    Internal(String),
}

impl StoreError {
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
