use pretty_assertions::assert_eq;
use resync_types::{ChangeEvent, CollectionDelta, CollectionEvent, Fields, ResourceId, Rid, StoreEvent};
use serde_json::json;

fn fields(value: serde_json::Value) -> Fields {
    value.as_object().cloned().unwrap()
}

fn change(changed: serde_json::Value, removed: &[&str]) -> ChangeEvent {
    ChangeEvent {
        id: ResourceId::new("b1"),
        rid: Rid::new("library.book.b1"),
        changed: fields(changed),
        removed: removed.iter().map(|s| s.to_string()).collect(),
    }
}

// ── ChangeEvent ──────────────────────────────────────────────────

#[test]
fn change_touches_changed_and_removed_fields() {
    let event = change(json!({"title": "New"}), &["subtitle"]);
    assert!(event.touches("title"));
    assert!(event.touches("subtitle"));
    assert!(!event.touches("author"));
}

#[test]
fn change_serializes_without_empty_removed() {
    let event = change(json!({"title": "New"}), &[]);
    let value = serde_json::to_value(&event).unwrap();
    assert_eq!(
        value,
        json!({"id": "b1", "rid": "library.book.b1", "changed": {"title": "New"}})
    );
}

#[test]
fn change_deserializes_without_removed() {
    let event: ChangeEvent = serde_json::from_value(json!({
        "id": "b1",
        "rid": "library.book.b1",
        "changed": {"title": "New"}
    }))
    .unwrap();
    assert!(event.removed.is_empty());
}

// ── CollectionEvent ──────────────────────────────────────────────

#[test]
fn moved_is_remove_then_add() {
    let event = CollectionEvent::moved(Rid::new("library.books"), 0, 2, Rid::new("library.book.b1"));
    assert_eq!(
        event.deltas,
        vec![
            CollectionDelta::Remove { idx: 0, rid: Rid::new("library.book.b1") },
            CollectionDelta::Add { idx: 2, rid: Rid::new("library.book.b1") },
        ]
    );
}

#[test]
fn collection_delta_wire_shape() {
    let event = CollectionEvent::added(Rid::new("library.books"), 1, Rid::new("library.book.b2"));
    let value = serde_json::to_value(&event).unwrap();
    assert_eq!(
        value,
        json!({
            "collection": "library.books",
            "deltas": [{"op": "add", "idx": 1, "rid": "library.book.b2"}]
        })
    );
}

// ── StoreEvent ───────────────────────────────────────────────────

#[test]
fn store_event_accessors() {
    let changed = StoreEvent::Changed(change(json!({"title": "New"}), &[]));
    assert_eq!(changed.rid(), &Rid::new("library.book.b1"));

    let deleted = StoreEvent::Deleted {
        id: ResourceId::new("b2"),
        rid: Rid::new("library.book.b2"),
    };

    let collection = StoreEvent::Collection(CollectionEvent::removed(
        Rid::new("library.books"),
        0,
        Rid::new("library.book.b2"),
    ));
    assert_eq!(collection.rid(), &Rid::new("library.books"));
}

#[test]
fn store_event_is_adjacently_tagged() {
    let event = StoreEvent::Deleted {
        id: ResourceId::new("b2"),
        rid: Rid::new("library.book.b2"),
    };
    let value = serde_json::to_value(&event).unwrap();
    assert_eq!(
        value,
        json!({"event": "deleted", "data": {"id": "b2", "rid": "library.book.b2"}})
    );

    let parsed: StoreEvent = serde_json::from_value(value).unwrap();
    assert_eq!(parsed, event);
}
