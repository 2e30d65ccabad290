use resync_types::Fields;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Describes a resource type's fields for validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceSchema {
    pub resource_type: String,
    pub fields: Vec<FieldSpec>,
}

/// A declared field of a resource type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub field_type: FieldType,
    /// Required fields must be present; required text must not be blank.
    #[serde(default)]
    pub required: bool,
}

impl FieldSpec {
    fn simple(name: &str, field_type: FieldType, required: bool) -> Self {
        Self {
            name: name.into(),
            field_type,
            required,
        }
    }

    /// Shorthand for a text field. Text is trimmed on input.
    pub fn text(name: &str, required: bool) -> Self {
        Self::simple(name, FieldType::Text, required)
    }

    /// Shorthand for a numeric field.
    pub fn number(name: &str) -> Self {
        Self::simple(name, FieldType::Number, false)
    }

    /// Shorthand for a boolean field.
    pub fn bool(name: &str) -> Self {
        Self::simple(name, FieldType::Bool, false)
    }

    /// Shorthand for a free-form JSON field.
    pub fn json(name: &str) -> Self {
        Self::simple(name, FieldType::Json, false)
    }

    /// Validates and normalizes an incoming value for this field.
    ///
    /// Text is trimmed; a blank result is rejected when the field is
    /// required. `null` is only accepted for optional fields.
    pub fn normalize(&self, value: Value) -> Result<Value, FieldViolation> {
        if value.is_null() {
            return if self.required {
                Err(self.violation(format!("{} must not be empty", display_name(&self.name))))
            } else {
                Ok(value)
            };
        }

        match (self.field_type, value) {
            (FieldType::Text, Value::String(text)) => {
                let trimmed = text.trim();
                if self.required && trimmed.is_empty() {
                    return Err(self.violation(format!(
                        "{} must not be empty",
                        display_name(&self.name)
                    )));
                }
                Ok(Value::String(trimmed.to_owned()))
            }
            (FieldType::Number, value @ Value::Number(_))
            | (FieldType::Bool, value @ Value::Bool(_))
            | (FieldType::Json, value) => Ok(value),
            (field_type, _) => Err(self.violation(format!("expected {}", field_type.as_str()))),
        }
    }

    fn violation(&self, message: String) -> FieldViolation {
        FieldViolation {
            field: self.name.clone(),
            message,
        }
    }
}

/// The data type of a declared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Number,
    Bool,
    Json,
}

impl FieldType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Bool => "bool",
            Self::Json => "json",
        }
    }
}

/// A field failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {field}: {message}")]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl ResourceSchema {
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            fields: Vec::new(),
        }
    }

    /// Adds a field declaration.
    #[must_use]
    pub fn with_field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Looks up a declared field.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Validates and normalizes a single incoming field value.
    pub fn normalize(&self, name: &str, value: Value) -> Result<Value, FieldViolation> {
        self.field(name)
            .ok_or_else(|| FieldViolation::new(name, "unknown field"))?
            .normalize(value)
    }

    /// Checks a complete value: every field declared, every required field
    /// present, every value of the declared type.
    pub fn check(&self, fields: &Fields) -> Result<(), FieldViolation> {
        for (name, value) in fields {
            let normalized = self.normalize(name, value.clone())?;
            if &normalized != value {
                return Err(FieldViolation::new(name.as_str(), "value is not normalized"));
            }
        }
        for spec in self.fields.iter().filter(|f| f.required) {
            if !fields.contains_key(&spec.name) {
                return Err(spec.violation("field is required".to_owned()));
            }
        }
        Ok(())
    }
}

fn display_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
