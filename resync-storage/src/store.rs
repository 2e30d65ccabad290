use crate::backend::{Backend, MemoryBackend};
use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::lock::LockTable;
use crate::transaction::Transaction;
use resync_events::{CollectionIndex, CollectionSpec, Commit, EventEmitter};
use resync_types::{Fields, IdentityMapper, ResourceId, Rid, StoreEvent};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info};

/// State shared by the store and its open transactions.
pub(crate) struct StoreShared {
    pub(crate) backend: Arc<dyn Backend>,
    pub(crate) emitter: EventEmitter,
    pub(crate) config: StoreConfig,
    pub(crate) locks: LockTable,
    pub(crate) mapper: IdentityMapper,
}

/// Transactional store of resources with change notification.
///
/// Cheap to clone; clones share the backend, the lock table and the event
/// dispatcher.
#[derive(Clone)]
pub struct ResourceStore {
    shared: Arc<StoreShared>,
}

impl ResourceStore {
    /// Opens a store over `backend`.
    ///
    /// Existing resources are loaded into every collection without emitting
    /// events. Spawns the event dispatcher, so it must be called from within
    /// a tokio runtime.
    pub fn open(
        backend: Arc<dyn Backend>,
        mapper: IdentityMapper,
        collections: Vec<CollectionSpec>,
        config: StoreConfig,
    ) -> StoreResult<Self> {
        let existing = backend.list()?;
        let indices: Vec<CollectionIndex> = collections
            .into_iter()
            .map(|spec| {
                let mut index = CollectionIndex::new(spec, mapper.clone());
                for (id, fields) in &existing {
                    index.seed(id.clone(), fields);
                }
                index
            })
            .collect();

        info!(
            "Opened resource store for {} ({} resources, {} collections)",
            mapper.pattern(),
            existing.len(),
            indices.len()
        );

        let emitter = EventEmitter::spawn(mapper.clone(), indices, config.event_capacity);
        Ok(Self {
            shared: Arc::new(StoreShared {
                backend,
                emitter,
                config,
                locks: LockTable::new(),
                mapper,
            }),
        })
    }

    /// Opens a store over an empty in-memory backend.
    pub fn in_memory(
        mapper: IdentityMapper,
        collections: Vec<CollectionSpec>,
        config: StoreConfig,
    ) -> StoreResult<Self> {
        Self::open(Arc::new(MemoryBackend::new()), mapper, collections, config)
    }

    /// Opens a write transaction on `id`, waiting for any open transaction
    /// on the same id to close.
    ///
    /// Fails with [`StoreError::NotFound`] if the resource does not exist
    /// and auto-creation is disabled, and with [`StoreError::Timeout`] if the
    /// lock is not acquired within the configured bound.
    pub async fn write(&self, id: &ResourceId) -> StoreResult<Transaction> {
        let guard = self
            .shared
            .locks
            .acquire(id, self.shared.config.lock_timeout())
            .await?;

        if !self.shared.config.auto_create && !self.shared.backend.contains(id)? {
            return Err(StoreError::NotFound(id.clone()));
        }

        Ok(Transaction::open(id.clone(), Arc::clone(&self.shared), guard))
    }

    /// Returns the latest committed value. Takes no lock.
    pub fn read(&self, id: &ResourceId) -> StoreResult<Fields> {
        self.shared
            .backend
            .get(id)?
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    pub fn exists(&self, id: &ResourceId) -> StoreResult<bool> {
        self.shared.backend.contains(id)
    }

    /// Provisions a resource under a caller-chosen id.
    pub async fn insert(&self, id: ResourceId, fields: Fields) -> StoreResult<()> {
        let _guard = self
            .shared
            .locks
            .acquire(&id, self.shared.config.lock_timeout())
            .await?;

        if self.shared.backend.contains(&id)? {
            return Err(StoreError::AlreadyExists(id));
        }

        self.shared.backend.put(&id, &fields)?;
        debug!("Inserted resource {}", id);
        self.shared.emitter.publish(Commit::Created { id, value: fields });
        Ok(())
    }

    /// Provisions a resource under a freshly generated id.
    pub async fn create(&self, fields: Fields) -> StoreResult<ResourceId> {
        let id = ResourceId::generate();
        self.insert(id.clone(), fields).await?;
        Ok(id)
    }

    /// Subscribes to events committed from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.shared.emitter.subscribe()
    }

    /// Waits until every commit made so far has been published.
    pub async fn flush(&self) {
        self.shared.emitter.flush().await;
    }

    /// Member RIDs of a collection, in order.
    pub async fn collection(&self, collection: &Rid) -> Option<Vec<Rid>> {
        self.shared.emitter.collection(collection).await
    }

    /// Returns true while a transaction on `id` is open.
    #[must_use]
    pub fn is_locked(&self, id: &ResourceId) -> bool {
        self.shared.locks.is_locked(id)
    }

    #[must_use]
    pub fn mapper(&self) -> &IdentityMapper {
        &self.shared.mapper
    }

    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.shared.config
    }
}
