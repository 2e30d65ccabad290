//! Resource model for resync.
//!
//! Defines the types that every layer above the identifiers depends on:
//! - [`Resource`] - an internal id plus its structured value
//! - [`FieldDiff`] / [`diff_fields`] - the minimal difference between two values
//! - [`ResourceSchema`] - declares a resource type's fields for validation
//! - [`ResourceHandler`] - optional per-type hooks for validation and read transforms

mod diff;
mod handler;
mod resource;
mod schema;

pub use diff::{FieldDiff, diff_fields};
pub use handler::{PassThrough, ResourceHandler};
pub use resource::{Resource, to_fields};
pub use schema::{FieldSpec, FieldType, FieldViolation, ResourceSchema};

/// Result type for model conversions.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors converting between typed values and [`resync_types::Fields`].
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("resource value must be an object, got {0}")]
    NotAnObject(&'static str),
}
