//! Change-event dispatch for resync.
//!
//! # Architecture
//!
//! The store enqueues one [`Commit`] per successful mutation while it still
//! holds the per-id lock. Enqueueing never waits. A single dispatcher task
//! drains the queue in order and, outside any store lock:
//!
//! 1. Updates every [`CollectionIndex`] affected by the commit
//! 2. Broadcasts the member event (`Created`, `Changed`, `Deleted`)
//! 3. Broadcasts one collection event per index whose ordering moved
//!
//! Because the queue is drained by one task, events for a given id are
//! published in commit order.

mod collection;
mod emitter;

pub use collection::{CollectionEntry, CollectionIndex, CollectionSpec, SortKey, SortOrder};
pub use emitter::{Commit, EventEmitter};

/// Default broadcast capacity for subscribers.
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;
