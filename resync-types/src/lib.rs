//! Core type definitions for resync.
//!
//! This crate defines the fundamental types shared by the store, the event
//! dispatcher and the service layer:
//! - Internal resource identifiers and external resource identifiers (RIDs)
//! - Resource patterns with a single named tag, and the write-once registry
//!   that captures them
//! - Change and collection events published after a commit
//!
//! Resource payloads are plain JSON objects ([`Fields`]); their structure is
//! owned by the resource type, not by this crate.

mod event;
mod identity;
mod ids;
mod pattern;

pub use event::{ChangeEvent, CollectionDelta, CollectionEvent, StoreEvent};
pub use identity::{IdentityMapper, PatternRegistry};
pub use ids::{ResourceId, Rid};
pub use pattern::{PathParams, Pattern};

/// Structured resource value: field name to typed JSON value.
pub type Fields = serde_json::Map<String, serde_json::Value>;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("pattern already registered: {0}")]
    PatternAlreadyRegistered(String),

    #[error("no pattern registered")]
    PatternNotRegistered,

    #[error("pattern {pattern:?} does not carry tag ${tag}")]
    TagMismatch { pattern: String, tag: String },
}
