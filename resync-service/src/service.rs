//! Read and write paths for one resource class.

use crate::config::ServiceConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::request::Mutation;
use resync_model::{Resource, ResourceHandler};
use resync_storage::{Backend, ResourceStore, Transaction};
use resync_types::{Fields, IdentityMapper, PatternRegistry, ResourceId, Rid, StoreEvent};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info};

/// Serves get, set, create and delete requests for resources matching one
/// pattern.
#[derive(Clone)]
pub struct ResourceService {
    store: ResourceStore,
    handler: Arc<dyn ResourceHandler>,
}

impl ResourceService {
    pub fn new(store: ResourceStore, handler: Arc<dyn ResourceHandler>) -> Self {
        Self { store, handler }
    }

    /// Registers the configured pattern and opens a store over `backend`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn open(
        config: ServiceConfig,
        backend: Arc<dyn Backend>,
        handler: Arc<dyn ResourceHandler>,
    ) -> ServiceResult<Self> {
        let registry = PatternRegistry::new(config.tag);
        registry.register(&config.pattern)?;
        let mapper = registry.mapper()?;

        let store = ResourceStore::open(backend, mapper, config.collections, config.store)?;
        info!("Serving resources at {}", config.pattern);
        Ok(Self::new(store, handler))
    }

    #[must_use]
    pub fn store(&self) -> &ResourceStore {
        &self.store
    }

    #[must_use]
    pub fn mapper(&self) -> &IdentityMapper {
        self.store.mapper()
    }

    /// Resolves an RID to the internal id.
    pub fn resolve(&self, rid: &Rid) -> ServiceResult<ResourceId> {
        self.mapper()
            .resolve(rid)
            .ok_or_else(|| ServiceError::NotFound(rid.to_string()))
    }

    /// Returns the current value of a resource as clients see it.
    pub fn get(&self, rid: &Rid) -> ServiceResult<Resource> {
        let id = self.resolve(rid)?;
        self.get_id(&id)
    }

    pub fn get_id(&self, id: &ResourceId) -> ServiceResult<Resource> {
        let fields = self.store.read(id)?;
        Ok(self.handler.transform(Resource::new(id.clone(), fields)))
    }

    /// Applies a mutation request to a resource.
    ///
    /// The request is validated before the store is touched. Only present
    /// parameters are written, and the store is updated exactly once.
    pub async fn set<M: Mutation>(&self, id: &ResourceId, mutation: M) -> ServiceResult<()> {
        let patch = mutation.normalize()?;

        let mut tx = self.store.write(id).await?;
        let result = self.commit(&mut tx, |value| patch.apply_to(value));
        if result.is_ok() {
            tx.close();
        } else {
            tx.abort();
        }
        result
    }

    /// Like [`ResourceService::set`], addressed by RID.
    pub async fn set_rid<M: Mutation>(&self, rid: &Rid, mutation: M) -> ServiceResult<()> {
        let id = self.resolve(rid)?;
        self.set(&id, mutation).await
    }

    /// Provisions a new resource and returns its RID.
    pub async fn create(&self, fields: Fields) -> ServiceResult<Rid> {
        let resource = Resource::new(ResourceId::generate(), fields);
        self.handler.validate(&resource)?;

        let rid = self.mapper().id_to_rid(&resource.id);
        self.store.insert(resource.id, resource.fields).await?;
        debug!("Created {}", rid);
        Ok(rid)
    }

    pub async fn delete(&self, id: &ResourceId) -> ServiceResult<()> {
        let mut tx = self.store.write(id).await?;
        let result = tx.delete().map_err(ServiceError::from);
        tx.close();
        result
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.store.subscribe()
    }

    /// Waits until events for every completed request were published.
    pub async fn flush(&self) {
        self.store.flush().await;
    }

    fn commit(&self, tx: &mut Transaction, edit: impl FnOnce(&mut Fields)) -> ServiceResult<()> {
        let mut value = match tx.value() {
            Ok(value) => value,
            Err(err) if err.is_not_found() && self.store.config().auto_create => Fields::new(),
            Err(err) => return Err(err.into()),
        };
        edit(&mut value);

        let resource = Resource::new(tx.id().clone(), value);
        self.handler.validate(&resource)?;

        if !tx.update(resource.fields)? {
            debug!("Request left {} unchanged", tx.id());
        }
        Ok(())
    }
}
