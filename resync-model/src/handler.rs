use crate::{FieldViolation, Resource, ResourceSchema};

/// Optional per-type hooks around the store.
///
/// Most resource types do not need one; [`PassThrough`] accepts everything
/// and returns values unchanged.
///
/// Implement this if you need:
/// - Validation of the complete value before a commit
/// - A different representation on the read path (e.g., hiding fields)
pub trait ResourceHandler: Send + Sync {
    /// Validate a resource before it is committed.
    /// Return `Err` to reject the write; nothing is stored.
    fn validate(&self, resource: &Resource) -> Result<(), FieldViolation> {
        let _ = resource;
        Ok(())
    }

    /// Called on the read path before a value leaves the service.
    fn transform(&self, resource: Resource) -> Resource {
        resource
    }
}

/// Handler that performs no validation and no transformation.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl ResourceHandler for PassThrough {}

impl ResourceHandler for ResourceSchema {
    fn validate(&self, resource: &Resource) -> Result<(), FieldViolation> {
        self.check(&resource.fields)
    }
}
