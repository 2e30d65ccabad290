//! Field-level differences between two resource values.

use resync_types::{ChangeEvent, Fields, ResourceId, Rid};

/// Minimal difference between an old and a new value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldDiff {
    /// Added fields and fields whose value changed, with the new value.
    pub changed: Fields,
    /// Fields present in the old value and absent from the new one.
    pub removed: Vec<String>,
}

impl FieldDiff {
    /// True when old and new value are identical.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty() && self.removed.is_empty()
    }

    /// Number of affected fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.changed.len() + self.removed.len()
    }

    /// Returns true if `field` was changed, added or removed.
    #[must_use]
    pub fn touches(&self, field: &str) -> bool {
        self.changed.contains_key(field) || self.removed.iter().any(|f| f == field)
    }

    /// Turns the diff into the event published for `id`.
    #[must_use]
    pub fn into_change_event(self, id: ResourceId, rid: Rid) -> ChangeEvent {
        ChangeEvent {
            id,
            rid,
            changed: self.changed,
            removed: self.removed,
        }
    }
}

/// Computes the fields that differ between `old` and `new`.
///
/// Only fields whose value actually changed are reported; unchanged fields
/// never appear in the result.
#[must_use]
pub fn diff_fields(old: &Fields, new: &Fields) -> FieldDiff {
    let changed = new
        .iter()
        .filter(|(name, value)| old.get(name.as_str()) != Some(*value))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();

    let removed = old
        .keys()
        .filter(|name| !new.contains_key(name.as_str()))
        .cloned()
        .collect();

    FieldDiff { changed, removed }
}
