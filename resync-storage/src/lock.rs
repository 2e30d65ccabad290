//! Per-id write locks.
//!
//! Each id that is being written, or waited for, has one entry in the table.
//! The table mutex only guards the map and is never held across an await, so
//! contention stays local to one id. Entries are dropped when the last holder
//! or waiter leaves.

use crate::error::{StoreError, StoreResult};
use resync_types::ResourceId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{Mutex as KeyMutex, OwnedMutexGuard};
use tracing::debug;

type LockMap = HashMap<ResourceId, Arc<KeyMutex<()>>>;

/// Table of exclusive locks keyed by internal id.
#[derive(Clone, Default)]
pub struct LockTable {
    inner: Arc<TableInner>,
}

#[derive(Default)]
struct TableInner {
    locks: Mutex<LockMap>,
}

impl TableInner {
    fn map(&self) -> MutexGuard<'_, LockMap> {
        // The map is only touched by single inserts and removals, so it is
        // consistent even if a holder panicked.
        self.locks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drops the entry for `id` if nobody holds or awaits it.
    fn release_entry(&self, id: &ResourceId) {
        let mut locks = self.map();
        let unused = locks
            .get(id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1);
        if unused {
            locks.remove(id);
        }
    }
}

impl LockTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `id`.
    ///
    /// With a `timeout`, gives up with [`StoreError::Timeout`] once it
    /// elapses.
    pub async fn acquire(
        &self,
        id: &ResourceId,
        timeout: Option<Duration>,
    ) -> StoreResult<KeyGuard> {
        let lock = Arc::clone(self.inner.map().entry(id.clone()).or_default());

        let guard = match timeout {
            Some(limit) => match tokio::time::timeout(limit, lock.lock_owned()).await {
                Ok(guard) => guard,
                Err(_) => {
                    self.inner.release_entry(id);
                    debug!("Timed out waiting for write lock on {}", id);
                    return Err(StoreError::Timeout {
                        id: id.clone(),
                        waited_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                    });
                }
            },
            None => lock.lock_owned().await,
        };

        debug!("Acquired write lock on {}", id);
        Ok(KeyGuard {
            id: id.clone(),
            guard: Some(guard),
            table: Arc::clone(&self.inner),
        })
    }

    /// Returns true while a guard for `id` is held.
    #[must_use]
    pub fn is_locked(&self, id: &ResourceId) -> bool {
        self.inner
            .map()
            .get(id)
            .is_some_and(|lock| lock.try_lock().is_err())
    }

    /// Number of ids currently held or awaited.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.map().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Exclusive access to one id. Released on drop.
pub struct KeyGuard {
    id: ResourceId,
    guard: Option<OwnedMutexGuard<()>>,
    table: Arc<TableInner>,
}

impl KeyGuard {
    #[must_use]
    pub fn id(&self) -> &ResourceId {
        &self.id
    }
}

impl Drop for KeyGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.table.release_entry(&self.id);
        debug!("Released write lock on {}", self.id);
    }
}
