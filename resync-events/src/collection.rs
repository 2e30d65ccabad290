//! Ordered collection indices.
//!
//! A collection lists the RIDs of its members sorted by one field of their
//! value. The index is kept consistent with member commits and reports every
//! change of ordering as a remove/add delta.

use resync_model::FieldDiff;
use resync_types::{CollectionEvent, Fields, IdentityMapper, ResourceId, Rid};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

/// Declares a collection and the field its members are sorted by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSpec {
    /// External id of the collection, e.g. `library.books`.
    pub collection: Rid,
    /// Member field used as sort key.
    pub sort_field: String,
    #[serde(default)]
    pub order: SortOrder,
    /// Compare text keys ignoring case.
    #[serde(default)]
    pub case_insensitive: bool,
}

impl CollectionSpec {
    pub fn new(collection: impl Into<Rid>, sort_field: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            sort_field: sort_field.into(),
            order: SortOrder::Ascending,
            case_insensitive: false,
        }
    }

    #[must_use]
    pub fn descending(mut self) -> Self {
        self.order = SortOrder::Descending;
        self
    }

    #[must_use]
    pub fn case_insensitive(mut self) -> Self {
        self.case_insensitive = true;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Comparable projection of a sort field value.
///
/// Keys of different kinds order as `Missing < Bool < Number < Text < Other`.
/// `Missing` covers absent fields and `null`.
#[derive(Debug, Clone)]
pub enum SortKey {
    Missing,
    Bool(bool),
    Number(f64),
    Text(String),
    /// Arrays and objects, compared by their JSON text.
    Other(String),
}

impl SortKey {
    /// Projects a field value. Text is lowercased when `case_insensitive`.
    #[must_use]
    pub fn from_value(value: Option<&Value>, case_insensitive: bool) -> Self {
        match value {
            None | Some(Value::Null) => Self::Missing,
            Some(Value::Bool(b)) => Self::Bool(*b),
            Some(Value::Number(n)) => n.as_f64().map_or(Self::Missing, Self::Number),
            Some(Value::String(s)) if case_insensitive => Self::Text(s.to_lowercase()),
            Some(Value::String(s)) => Self::Text(s.clone()),
            Some(other) => Self::Other(other.to_string()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Missing => 0,
            Self::Bool(_) => 1,
            Self::Number(_) => 2,
            Self::Text(_) => 3,
            Self::Other(_) => 4,
        }
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Text(a), Self::Text(b)) | (Self::Other(a), Self::Other(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SortKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortKey {}

/// One member of a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionEntry {
    pub sort_key: SortKey,
    pub id: ResourceId,
}

/// Ordered view over the members of one collection.
///
/// Entries are ordered by `(sort key, id)` so ties resolve deterministically.
#[derive(Debug, Clone)]
pub struct CollectionIndex {
    spec: CollectionSpec,
    mapper: IdentityMapper,
    entries: Vec<CollectionEntry>,
}

impl CollectionIndex {
    #[must_use]
    pub fn new(spec: CollectionSpec, mapper: IdentityMapper) -> Self {
        Self {
            spec,
            mapper,
            entries: Vec::new(),
        }
    }

    #[must_use]
    pub fn spec(&self) -> &CollectionSpec {
        &self.spec
    }

    #[must_use]
    pub fn collection(&self) -> &Rid {
        &self.spec.collection
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn entries(&self) -> &[CollectionEntry] {
        &self.entries
    }

    /// Member ids in collection order.
    pub fn ids(&self) -> impl Iterator<Item = &ResourceId> {
        self.entries.iter().map(|e| &e.id)
    }

    /// Member RIDs in collection order.
    #[must_use]
    pub fn rids(&self) -> Vec<Rid> {
        self.ids().map(|id| self.mapper.id_to_rid(id)).collect()
    }

    /// Current position of a member.
    #[must_use]
    pub fn position(&self, id: &ResourceId) -> Option<usize> {
        self.entries.iter().position(|e| &e.id == id)
    }

    /// Adds a member without reporting a delta. Used to load existing
    /// resources before traffic starts.
    pub fn seed(&mut self, id: ResourceId, fields: &Fields) {
        if let Some(idx) = self.position(&id) {
            self.entries.remove(idx);
        }
        let sort_key = self.key_for(fields);
        let idx = self.insertion_point(&sort_key, &id);
        self.entries.insert(idx, CollectionEntry { sort_key, id });
    }

    /// Adds a new member. An id that is already a member is repositioned.
    pub fn insert(&mut self, id: &ResourceId, fields: &Fields) -> Option<CollectionEvent> {
        let sort_key = self.key_for(fields);
        if self.position(id).is_some() {
            return self.reposition(id, sort_key);
        }

        let idx = self.insertion_point(&sort_key, id);
        self.entries.insert(
            idx,
            CollectionEntry {
                sort_key,
                id: id.clone(),
            },
        );
        Some(CollectionEvent::added(
            self.spec.collection.clone(),
            idx,
            self.mapper.id_to_rid(id),
        ))
    }

    /// Removes a member.
    pub fn remove(&mut self, id: &ResourceId) -> Option<CollectionEvent> {
        let idx = self.position(id)?;
        self.entries.remove(idx);
        Some(CollectionEvent::removed(
            self.spec.collection.clone(),
            idx,
            self.mapper.id_to_rid(id),
        ))
    }

    /// Reacts to a committed update of a member.
    ///
    /// Diffs that do not touch the sort field are ignored. Otherwise the
    /// entry is repositioned and a remove/add delta is returned if its index
    /// changed.
    pub fn apply_change(
        &mut self,
        id: &ResourceId,
        diff: &FieldDiff,
        fields: &Fields,
    ) -> Option<CollectionEvent> {
        if !diff.touches(&self.spec.sort_field) {
            return None;
        }
        if self.position(id).is_none() {
            return self.insert(id, fields);
        }
        let sort_key = self.key_for(fields);
        self.reposition(id, sort_key)
    }

    fn reposition(&mut self, id: &ResourceId, sort_key: SortKey) -> Option<CollectionEvent> {
        let from = self.position(id)?;
        let mut entry = self.entries.remove(from);
        entry.sort_key = sort_key;

        let to = self.insertion_point(&entry.sort_key, id);
        self.entries.insert(to, entry);

        (from != to).then(|| {
            CollectionEvent::moved(
                self.spec.collection.clone(),
                from,
                to,
                self.mapper.id_to_rid(id),
            )
        })
    }

    fn key_for(&self, fields: &Fields) -> SortKey {
        SortKey::from_value(fields.get(&self.spec.sort_field), self.spec.case_insensitive)
    }

    fn compare(&self, entry: &CollectionEntry, key: &SortKey, id: &ResourceId) -> Ordering {
        let by_key = match self.spec.order {
            SortOrder::Ascending => entry.sort_key.cmp(key),
            SortOrder::Descending => key.cmp(&entry.sort_key),
        };
        by_key.then_with(|| entry.id.cmp(id))
    }

    fn insertion_point(&self, key: &SortKey, id: &ResourceId) -> usize {
        self.entries
            .partition_point(|entry| self.compare(entry, key, id) == Ordering::Less)
    }
}
