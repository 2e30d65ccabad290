//! Service-level errors.

use resync_model::{FieldViolation, ModelError};
use resync_storage::StoreError;
use thiserror::Error;
use tracing::warn;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failure returned to the requester.
///
/// Store errors other than `NotFound` and `Timeout` collapse into
/// `Internal`; their detail is only logged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("invalid parameter {field}: {message}")]
    InvalidParameter { field: String, message: String },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl ServiceError {
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Wire error code for this failure.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidParameter { .. } => "system.invalidParams",
            Self::NotFound(_) => "system.notFound",
            Self::Timeout(_) => "system.timeout",
            Self::Internal(_) | Self::Config(_) => "system.internalError",
        }
    }
}

impl From<FieldViolation> for ServiceError {
    fn from(violation: FieldViolation) -> Self {
        Self::InvalidParameter {
            field: violation.field,
            message: violation.message,
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::NotFound(id.into_string()),
            StoreError::Timeout { .. } => Self::Timeout(err.to_string()),
            other => {
                warn!("Store failure: {}", other);
                Self::Internal(other.to_string())
            }
        }
    }
}

impl From<ModelError> for ServiceError {
    fn from(err: ModelError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<resync_types::Error> for ServiceError {
    fn from(err: resync_types::Error) -> Self {
        Self::Config(err.to_string())
    }
}
