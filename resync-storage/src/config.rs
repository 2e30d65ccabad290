use resync_events::DEFAULT_EVENT_CAPACITY;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the resource store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Create resources on first write instead of failing with `NotFound`.
    pub auto_create: bool,
    /// Maximum wait for a per-id write lock (ms). `None` waits forever.
    pub lock_timeout_ms: Option<u64>,
    /// Events buffered per subscriber before the oldest are dropped.
    pub event_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            auto_create: false,
            lock_timeout_ms: Some(30_000),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl StoreConfig {
    /// The lock wait bound as a `Duration`.
    #[must_use]
    pub fn lock_timeout(&self) -> Option<Duration> {
        self.lock_timeout_ms.map(Duration::from_millis)
    }
}
