//! Storage backends.
//!
//! A backend only needs whole-value operations: the store never writes
//! individual fields, so every `put` is an atomic replacement.

use crate::error::{StoreError, StoreResult};
use resync_types::{Fields, ResourceId};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Persistence for resource values, keyed by internal id.
pub trait Backend: Send + Sync {
    /// Returns the stored value, if any.
    fn get(&self, id: &ResourceId) -> StoreResult<Option<Fields>>;

    /// Stores `fields` as the complete value of `id`, replacing any previous
    /// value in one step.
    fn put(&self, id: &ResourceId, fields: &Fields) -> StoreResult<()>;

    /// Removes a value. Returns false if there was none.
    fn remove(&self, id: &ResourceId) -> StoreResult<bool>;

    /// Returns every stored resource.
    fn list(&self) -> StoreResult<Vec<(ResourceId, Fields)>>;

    fn contains(&self, id: &ResourceId) -> StoreResult<bool> {
        Ok(self.get(id)?.is_some())
    }
}

/// In-memory backend. Readers proceed concurrently.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    resources: RwLock<HashMap<ResourceId, Fields>>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend pre-populated with `resources`.
    pub fn with_resources(resources: impl IntoIterator<Item = (ResourceId, Fields)>) -> Self {
        Self {
            resources: RwLock::new(resources.into_iter().collect()),
        }
    }

    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.read()?.is_empty())
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, HashMap<ResourceId, Fields>>> {
        self.resources
            .read()
            .map_err(|_| StoreError::Internal("memory backend lock poisoned".into()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, HashMap<ResourceId, Fields>>> {
        self.resources
            .write()
            .map_err(|_| StoreError::Internal("memory backend lock poisoned".into()))
    }
}

impl Backend for MemoryBackend {
    fn get(&self, id: &ResourceId) -> StoreResult<Option<Fields>> {
        Ok(self.read()?.get(id).cloned())
    }

    fn put(&self, id: &ResourceId, fields: &Fields) -> StoreResult<()> {
        self.write()?.insert(id.clone(), fields.clone());
        Ok(())
    }

    fn remove(&self, id: &ResourceId) -> StoreResult<bool> {
        Ok(self.write()?.remove(id).is_some())
    }

    fn list(&self) -> StoreResult<Vec<(ResourceId, Fields)>> {
        Ok(self
            .read()?
            .iter()
            .map(|(id, fields)| (id.clone(), fields.clone()))
            .collect())
    }

    fn contains(&self, id: &ResourceId) -> StoreResult<bool> {
        Ok(self.read()?.contains_key(id))
    }
}
