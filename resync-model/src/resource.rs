use crate::{ModelError, ModelResult};
use resync_types::{Fields, ResourceId};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A resource held by the store.
///
/// The `fields` map holds the structured value; its shape is defined by the
/// resource type (see [`crate::ResourceSchema`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    pub fields: Fields,
}

impl Resource {
    #[must_use]
    pub fn new(id: ResourceId, fields: Fields) -> Self {
        Self { id, fields }
    }

    /// Builds a resource from any value that serializes to a JSON object.
    pub fn from_value<T: Serialize>(id: ResourceId, value: &T) -> ModelResult<Self> {
        Ok(Self {
            id,
            fields: to_fields(value)?,
        })
    }

    /// Deserializes the fields into a typed value.
    pub fn to_value<T: DeserializeOwned>(&self) -> ModelResult<T> {
        Ok(serde_json::from_value(Value::Object(self.fields.clone()))?)
    }

    /// Returns the raw value of a field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Extract a string value from a field.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(|v| v.as_str())
    }
}

/// Serializes a typed value into a field map.
pub fn to_fields<T: Serialize>(value: &T) -> ModelResult<Fields> {
    match serde_json::to_value(value)? {
        Value::Object(fields) => Ok(fields),
        Value::Null => Err(ModelError::NotAnObject("null")),
        Value::Bool(_) => Err(ModelError::NotAnObject("bool")),
        Value::Number(_) => Err(ModelError::NotAnObject("number")),
        Value::String(_) => Err(ModelError::NotAnObject("string")),
        Value::Array(_) => Err(ModelError::NotAnObject("array")),
    }
}
