use pretty_assertions::assert_eq;
use resync_events::{CollectionIndex, CollectionSpec, Commit, EventEmitter};
use resync_model::diff_fields;
use resync_types::{
    CollectionDelta, Fields, IdentityMapper, PatternRegistry, ResourceId, Rid, StoreEvent,
};
use serde_json::{Value, json};
use std::time::Duration;
use tokio::sync::broadcast;

fn mapper() -> IdentityMapper {
    let registry = PatternRegistry::new("id");
    registry.register("library.book.$id").unwrap();
    registry.mapper().unwrap()
}

fn fields(value: Value) -> Fields {
    value.as_object().cloned().unwrap()
}

fn book(title: &str) -> Fields {
    fields(json!({"title": title, "author": "A"}))
}

fn make_emitter() -> EventEmitter {
    let mut index = CollectionIndex::new(CollectionSpec::new("library.books", "title"), mapper());
    index.seed(ResourceId::new("b1"), &book("Alpha"));
    index.seed(ResourceId::new("b2"), &book("Charlie"));
    EventEmitter::spawn(mapper(), vec![index], 64)
}

async fn next(rx: &mut broadcast::Receiver<StoreEvent>) -> StoreEvent {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("channel closed")
}

fn update(id: &str, old: &Fields, new: &Fields) -> Commit {
    Commit::Updated {
        id: ResourceId::new(id),
        diff: diff_fields(old, new),
        value: new.clone(),
    }
}

#[tokio::test]
async fn update_publishes_change_event() {
    let emitter = make_emitter();
    let mut rx = emitter.subscribe();

    let new = fields(json!({"title": "Alpha", "author": "B"}));
    emitter.publish(update("b1", &book("Alpha"), &new));
    emitter.flush().await;

    match next(&mut rx).await {
        StoreEvent::Changed(change) => {
            assert_eq!(change.id, ResourceId::new("b1"));
            assert_eq!(change.rid, Rid::new("library.book.b1"));
            assert_eq!(change.changed, fields(json!({"author": "B"})));
        }
        other => panic!("Expected Changed, got {other:?}"),
    }
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn sort_key_update_publishes_collection_delta_after_member_event() {
    let emitter = make_emitter();
    let mut rx = emitter.subscribe();

    emitter.publish(update("b1", &book("Alpha"), &book("Zulu")));
    emitter.flush().await;

    assert!(matches!(next(&mut rx).await, StoreEvent::Changed(_)));
    match next(&mut rx).await {
        StoreEvent::Collection(event) => {
            assert_eq!(event.collection, Rid::new("library.books"));
            assert_eq!(
                event.deltas,
                vec![
                    CollectionDelta::Remove { idx: 0, rid: Rid::new("library.book.b1") },
                    CollectionDelta::Add { idx: 1, rid: Rid::new("library.book.b1") },
                ]
            );
        }
        other => panic!("Expected Collection, got {other:?}"),
    }
    assert_eq!(
        emitter.collection(&Rid::new("library.books")).await.unwrap(),
        vec![Rid::new("library.book.b2"), Rid::new("library.book.b1")]
    );
}

#[tokio::test]
async fn create_and_delete_update_membership() {
    let emitter = make_emitter();
    let mut rx = emitter.subscribe();

    emitter.publish(Commit::Created {
        id: ResourceId::new("b3"),
        value: book("Bravo"),
    });
    emitter.publish(Commit::Deleted {
        id: ResourceId::new("b1"),
    });
    emitter.flush().await;

    assert!(matches!(next(&mut rx).await, StoreEvent::Created { .. }));
    assert!(matches!(
        next(&mut rx).await,
        StoreEvent::Collection(e) if e.deltas == vec![CollectionDelta::Add { idx: 1, rid: Rid::new("library.book.b3") }]
    ));
    assert!(matches!(next(&mut rx).await, StoreEvent::Deleted { .. }));
    assert!(matches!(
        next(&mut rx).await,
        StoreEvent::Collection(e) if e.deltas == vec![CollectionDelta::Remove { idx: 0, rid: Rid::new("library.book.b1") }]
    ));

    assert_eq!(
        emitter.collection(&Rid::new("library.books")).await.unwrap(),
        vec![Rid::new("library.book.b3"), Rid::new("library.book.b2")]
    );
}

#[tokio::test]
async fn events_for_one_id_keep_commit_order() {
    let emitter = make_emitter();
    let mut rx = emitter.subscribe();

    let mut current = book("Alpha");
    for i in 0..20 {
        let new = fields(json!({"title": "Alpha", "author": format!("A{i}")}));
        emitter.publish(update("b1", &current, &new));
        current = new;
    }
    emitter.flush().await;

    for i in 0..20 {
        match next(&mut rx).await {
            StoreEvent::Changed(change) => {
                assert_eq!(change.changed["author"], json!(format!("A{i}")));
            }
            other => panic!("Expected Changed, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn unknown_collection_is_none() {
    let emitter = make_emitter();
    assert!(emitter.collection(&Rid::new("library.authors")).await.is_none());
    assert!(emitter.collection(&Rid::new("library.books")).await.is_some());
}

#[tokio::test]
async fn publish_without_subscribers_still_updates_collections() {
    let emitter = make_emitter();
    emitter.publish(Commit::Deleted {
        id: ResourceId::new("b2"),
    });
    emitter.flush().await;
    assert_eq!(
        emitter.collection(&Rid::new("library.books")).await.unwrap(),
        vec![Rid::new("library.book.b1")]
    );
}
