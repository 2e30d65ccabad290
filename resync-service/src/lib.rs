//! Request handling for resync resources.
//!
//! Turns resolved mutation requests into store transactions:
//! - [`Field`] models whether a request parameter was sent at all
//! - [`Mutation`] validates and normalizes a request before the store is
//!   touched, producing a [`Patch`] of the fields to overwrite
//! - [`ResourceService`] runs the read and write paths for one resource
//!   class and maps store failures to [`ServiceError`]
//!
//! The [`books`] module wires a complete resource class: pattern, collection
//! sorted by title, typed parameters and handler.

pub mod books;
mod config;
mod error;
pub mod logging;
mod request;
mod service;

pub use config::ServiceConfig;
pub use error::{ServiceError, ServiceResult};
pub use request::{Field, Mutation, Patch, SchemaMutation, normalize_text};
pub use service::ResourceService;
