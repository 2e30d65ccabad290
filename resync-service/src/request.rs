//! Mutation requests.

use resync_model::{FieldSpec, FieldViolation, ResourceSchema};
use resync_types::Fields;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::sync::Arc;

/// A request parameter that is either sent with a value or not sent at all.
///
/// Use with `#[serde(default)]` so a missing key deserializes as
/// [`Field::Absent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field<T> {
    Absent,
    Present(T),
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Self::Absent
    }
}

impl<T> Field<T> {
    #[must_use]
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }
}

impl<T> From<Option<T>> for Field<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Self::Present)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Field<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        T::deserialize(deserializer).map(Self::Present)
    }
}

/// Trims a text parameter. Blank text is rejected with a message naming the
/// field, e.g. `Title must not be empty`.
pub fn normalize_text(
    name: &str,
    field: Field<String>,
) -> Result<Option<String>, FieldViolation> {
    let Field::Present(text) = field else {
        return Ok(None);
    };
    match FieldSpec::text(name, true).normalize(Value::String(text))? {
        Value::String(trimmed) => Ok(Some(trimmed)),
        _ => Err(FieldViolation::new(name, "expected text")),
    }
}

/// Normalized field values to write over the current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patch {
    fields: Fields,
}

impl Patch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `name` if `value` is present.
    pub fn set_opt(&mut self, name: &str, value: Option<impl Into<Value>>) {
        if let Some(value) = value {
            self.fields.insert(name.to_owned(), value.into());
        }
    }

    pub fn set(&mut self, name: &str, value: impl Into<Value>) {
        self.fields.insert(name.to_owned(), value.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[must_use]
    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Overwrites the patched fields in `value`; other fields are kept.
    pub fn apply_to(&self, value: &mut Fields) {
        for (name, field) in &self.fields {
            value.insert(name.clone(), field.clone());
        }
    }
}

/// A validated-on-demand change request for one resource.
pub trait Mutation {
    /// Validates every present parameter and returns the fields to write.
    /// Runs before any store access; an error means nothing was changed.
    fn normalize(self) -> Result<Patch, FieldViolation>;
}

impl Mutation for Patch {
    fn normalize(self) -> Result<Patch, FieldViolation> {
        Ok(self)
    }
}

/// Untyped parameters checked against a [`ResourceSchema`].
#[derive(Debug, Clone)]
pub struct SchemaMutation {
    schema: Arc<ResourceSchema>,
    params: Fields,
}

impl SchemaMutation {
    pub fn new(schema: Arc<ResourceSchema>, params: Fields) -> Self {
        Self { schema, params }
    }
}

impl Mutation for SchemaMutation {
    fn normalize(self) -> Result<Patch, FieldViolation> {
        let mut patch = Patch::new();
        for (name, value) in self.params {
            let value = self.schema.normalize(&name, value)?;
            patch.set(&name, value);
        }
        Ok(patch)
    }
}
