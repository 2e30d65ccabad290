//! Write transactions.
//!
//! A transaction owns the write lock of one id from `ResourceStore::write`
//! until it is closed or dropped. Commits are enqueued for the dispatcher
//! while the lock is held, which keeps per-id event order equal to commit
//! order.

use crate::error::{StoreError, StoreResult};
use crate::lock::KeyGuard;
use crate::store::StoreShared;
use resync_events::Commit;
use resync_model::diff_fields;
use resync_types::{Fields, ResourceId};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Lifecycle of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    /// The lock is held.
    Open,
    /// Closed without a failed mutation.
    Committed,
    /// Closed after a mutation failed or by [`Transaction::abort`].
    Aborted,
}

/// Exclusive handle for reading and mutating one resource.
pub struct Transaction {
    id: ResourceId,
    shared: Arc<StoreShared>,
    guard: Option<KeyGuard>,
    state: TransactionState,
    failed: bool,
    deleted: bool,
}

impl Transaction {
    pub(crate) fn open(id: ResourceId, shared: Arc<StoreShared>, guard: KeyGuard) -> Self {
        Self {
            id,
            shared,
            guard: Some(guard),
            state: TransactionState::Open,
            failed: false,
            deleted: false,
        }
    }

    #[must_use]
    pub fn id(&self) -> &ResourceId {
        &self.id
    }

    #[must_use]
    pub fn state(&self) -> TransactionState {
        self.state
    }

    pub fn exists(&self) -> StoreResult<bool> {
        self.shared.backend.contains(&self.id)
    }

    /// Returns the latest committed value.
    pub fn value(&self) -> StoreResult<Fields> {
        self.shared
            .backend
            .get(&self.id)?
            .ok_or_else(|| StoreError::NotFound(self.id.clone()))
    }

    /// Replaces the value with `value`.
    ///
    /// Returns `Ok(false)` without writing anything if no field differs.
    /// Otherwise stores the new value in one step, enqueues one commit and
    /// returns `Ok(true)`. With auto-creation enabled, updating a missing
    /// resource creates it.
    pub fn update(&mut self, value: Fields) -> StoreResult<bool> {
        let result = self.apply_update(value);
        self.failed |= result.is_err();
        result
    }

    /// Removes the resource.
    pub fn delete(&mut self) -> StoreResult<()> {
        let result = self.apply_delete();
        self.failed |= result.is_err();
        result
    }

    /// Releases the lock and returns the final state.
    pub fn close(mut self) -> TransactionState {
        self.finish();
        self.state
    }

    /// Releases the lock, marking the transaction as failed. Used when the
    /// caller rejects the request after opening the transaction.
    pub fn abort(mut self) -> TransactionState {
        self.failed = true;
        self.finish();
        self.state
    }

    fn apply_update(&mut self, value: Fields) -> StoreResult<bool> {
        if self.deleted {
            return Err(StoreError::Conflict(format!(
                "resource {} was deleted in this transaction",
                self.id
            )));
        }

        match self.shared.backend.get(&self.id)? {
            Some(old) => {
                let diff = diff_fields(&old, &value);
                if diff.is_empty() {
                    debug!("No changes for {}, skipping write", self.id);
                    return Ok(false);
                }

                self.shared.backend.put(&self.id, &value)?;
                debug!("Updated {} ({} fields)", self.id, diff.len());
                self.shared.emitter.publish(Commit::Updated {
                    id: self.id.clone(),
                    diff,
                    value,
                });
                Ok(true)
            }
            None if self.shared.config.auto_create => {
                self.shared.backend.put(&self.id, &value)?;
                debug!("Created {} on first write", self.id);
                self.shared.emitter.publish(Commit::Created {
                    id: self.id.clone(),
                    value,
                });
                Ok(true)
            }
            None => Err(StoreError::NotFound(self.id.clone())),
        }
    }

    fn apply_delete(&mut self) -> StoreResult<()> {
        if self.deleted || !self.shared.backend.remove(&self.id)? {
            return Err(StoreError::NotFound(self.id.clone()));
        }
        self.deleted = true;
        debug!("Deleted {}", self.id);
        self.shared.emitter.publish(Commit::Deleted {
            id: self.id.clone(),
        });
        Ok(())
    }

    fn finish(&mut self) {
        if self.guard.take().is_some() {
            self.state = if self.failed {
                TransactionState::Aborted
            } else {
                TransactionState::Committed
            };
        }
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        if self.guard.is_some() {
            debug!("Transaction on {} dropped without close", self.id);
            self.finish();
        }
    }
}

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("id", &self.id)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
