//! Transactional resource store for resync.
//!
//! Keeps resource values in a [`Backend`] and serializes every mutation per
//! internal id. Reads never take a lock.
//!
//! # Architecture
//!
//! - [`ResourceStore::write`] acquires the per-id lock from a [`LockTable`]
//!   and hands out a [`Transaction`]; no global lock is held while waiting
//! - [`Transaction::update`] diffs the new value against the stored one,
//!   replaces it in a single backend call and enqueues one commit
//! - The commit is turned into events by the dispatcher of `resync-events`,
//!   outside the per-id lock
//! - The lock is released when the transaction is closed or dropped
//!
//! A call path must not open a transaction on a second id while it holds one
//! on a first id.

mod backend;
mod config;
mod error;
mod lock;
mod sqlite;
mod store;
mod transaction;

pub use backend::{Backend, MemoryBackend};
pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use lock::{KeyGuard, LockTable};
pub use sqlite::SqliteBackend;
pub use store::ResourceStore;
pub use transaction::{Transaction, TransactionState};
