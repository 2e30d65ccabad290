//! Events published after a commit.
//!
//! Member events describe what happened to one resource; collection events
//! describe how the ordered membership of a collection moved. Events are
//! immutable and carry both the internal id and the external RID so
//! subscribers never need to translate.

use crate::{Fields, ResourceId, Rid};
use serde::{Deserialize, Serialize};

/// Minimal description of one committed update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Internal id of the changed resource.
    pub id: ResourceId,

    /// External id of the changed resource.
    pub rid: Rid,

    /// Fields whose value changed or that were added, with their new value.
    pub changed: Fields,

    /// Fields present before the update and absent after it.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub removed: Vec<String>,
}

impl ChangeEvent {
    /// Returns true if `field` was changed, added or removed.
    #[must_use]
    pub fn touches(&self, field: &str) -> bool {
        self.changed.contains_key(field) || self.removed.iter().any(|f| f == field)
    }
}

/// One step of an ordered collection delta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum CollectionDelta {
    /// The member at `idx` left the collection.
    Remove { idx: usize, rid: Rid },

    /// A member was inserted at `idx`.
    Add { idx: usize, rid: Rid },
}

/// Ordered membership change of one collection.
///
/// Deltas must be applied in order: indices of later steps refer to the
/// sequence produced by the earlier ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionEvent {
    /// External id of the collection.
    pub collection: Rid,

    pub deltas: Vec<CollectionDelta>,
}

impl CollectionEvent {
    /// A single insertion.
    #[must_use]
    pub fn added(collection: Rid, idx: usize, rid: Rid) -> Self {
        Self {
            collection,
            deltas: vec![CollectionDelta::Add { idx, rid }],
        }
    }

    /// A single removal.
    #[must_use]
    pub fn removed(collection: Rid, idx: usize, rid: Rid) -> Self {
        Self {
            collection,
            deltas: vec![CollectionDelta::Remove { idx, rid }],
        }
    }

    /// A member moved from `from` to `to`, expressed as remove-then-add.
    #[must_use]
    pub fn moved(collection: Rid, from: usize, to: usize, rid: Rid) -> Self {
        Self {
            collection,
            deltas: vec![
                CollectionDelta::Remove {
                    idx: from,
                    rid: rid.clone(),
                },
                CollectionDelta::Add { idx: to, rid },
            ],
        }
    }
}

/// Envelope published to store subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum StoreEvent {
    /// A resource was provisioned.
    Created {
        id: ResourceId,
        rid: Rid,
        value: Fields,
    },

    /// A resource was updated.
    Changed(ChangeEvent),

    /// A resource was removed.
    Deleted { id: ResourceId, rid: Rid },

    /// The ordering of a collection changed.
    Collection(CollectionEvent),
}

impl StoreEvent {
    /// External id of the affected resource or collection.
    #[must_use]
    pub fn rid(&self) -> &Rid {
        match self {
            Self::Created { rid, .. } | Self::Deleted { rid, .. } => rid,
            Self::Changed(change) => &change.rid,
            Self::Collection(event) => &event.collection,
        }
    }
}
