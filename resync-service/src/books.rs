//! The book resource class: `library.book.$id` resources listed in the
//! `library.books` collection, sorted by title.

use crate::config::ServiceConfig;
use crate::error::ServiceResult;
use crate::request::{Field, Mutation, Patch, normalize_text};
use crate::service::ResourceService;
use resync_events::CollectionSpec;
use resync_model::{FieldSpec, FieldViolation, Resource, ResourceHandler, ResourceSchema};
use resync_storage::Backend;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const BOOK_PATTERN: &str = "library.book.$id";
pub const BOOKS_COLLECTION: &str = "library.books";

/// Stored value of a book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub title: String,
    pub author: String,
}

impl Book {
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
        }
    }
}

/// Parameters of a `set` request on a book.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BookParams {
    pub title: Field<String>,
    pub author: Field<String>,
}

impl BookParams {
    #[must_use]
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Field::Present(title.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn author(author: impl Into<String>) -> Self {
        Self {
            author: Field::Present(author.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Field::Present(author.into());
        self
    }
}

impl Mutation for BookParams {
    fn normalize(self) -> Result<Patch, FieldViolation> {
        let mut patch = Patch::new();
        patch.set_opt("title", normalize_text("title", self.title)?);
        patch.set_opt("author", normalize_text("author", self.author)?);
        Ok(patch)
    }
}

/// Schema of a stored book.
#[must_use]
pub fn book_schema() -> ResourceSchema {
    ResourceSchema::new("book")
        .with_field(FieldSpec::text("title", true))
        .with_field(FieldSpec::text("author", true))
}

/// Rejects values missing a title or author, or holding a blank or non-text
/// one. Other stored fields are left alone. Values are served unchanged.
#[derive(Debug, Clone)]
pub struct BookHandler {
    schema: ResourceSchema,
}

impl Default for BookHandler {
    fn default() -> Self {
        Self {
            schema: book_schema(),
        }
    }
}

impl ResourceHandler for BookHandler {
    fn validate(&self, resource: &Resource) -> Result<(), FieldViolation> {
        for spec in self.schema.fields.iter().filter(|f| f.required) {
            let value = resource
                .get(&spec.name)
                .cloned()
                .ok_or_else(|| FieldViolation::new(spec.name.as_str(), "field is required"))?;
            spec.normalize(value)?;
        }
        Ok(())
    }
}

/// Configuration of the book class with the title-sorted collection.
#[must_use]
pub fn library_config() -> ServiceConfig {
    ServiceConfig::new(BOOK_PATTERN)
        .with_collection(CollectionSpec::new(BOOKS_COLLECTION, "title").case_insensitive())
}

/// Opens the book service over `backend`.
pub fn open_library(backend: Arc<dyn Backend>) -> ServiceResult<ResourceService> {
    ResourceService::open(library_config(), backend, Arc::new(BookHandler::default()))
}
