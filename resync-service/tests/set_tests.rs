use pretty_assertions::assert_eq;
use resync_service::books::{BookParams, open_library};
use resync_service::{Field, Patch, ResourceService, ServiceError, logging};
use resync_storage::MemoryBackend;
use resync_types::{ChangeEvent, CollectionDelta, Fields, ResourceId, Rid, StoreEvent};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::sync::broadcast;

fn fields(value: Value) -> Fields {
    value.as_object().cloned().unwrap()
}

fn library(books: &[(&str, &str, &str)]) -> ResourceService {
    logging::init_logging("warn");
    let backend = MemoryBackend::with_resources(books.iter().map(|(id, title, author)| {
        (
            ResourceId::new(*id),
            fields(json!({"title": title, "author": author})),
        )
    }));
    open_library(Arc::new(backend)).unwrap()
}

fn drain(rx: &mut broadcast::Receiver<StoreEvent>) -> Vec<StoreEvent> {
    std::iter::from_fn(|| rx.try_recv().ok()).collect()
}

#[tokio::test]
async fn set_title_commits_and_emits_one_change() {
    let service = library(&[("b1", "Old", "A")]);
    let mut rx = service.subscribe();
    let id = ResourceId::new("b1");

    service.set(&id, BookParams::title("New")).await.unwrap();
    service.flush().await;

    assert_eq!(
        service.get_id(&id).unwrap().fields,
        fields(json!({"title": "New", "author": "A"}))
    );
    assert_eq!(
        drain(&mut rx),
        vec![StoreEvent::Changed(ChangeEvent {
            id,
            rid: Rid::new("library.book.b1"),
            changed: fields(json!({"title": "New"})),
            removed: vec![],
        })]
    );
}

#[tokio::test]
async fn blank_title_is_rejected_before_the_store() {
    let service = library(&[("b1", "Old", "A")]);
    let mut rx = service.subscribe();
    let id = ResourceId::new("b1");

    let err = service.set(&id, BookParams::title("   ")).await.unwrap_err();
    assert_eq!(err, ServiceError::invalid("title", "Title must not be empty"));
    assert_eq!(err.code(), "system.invalidParams");

    service.flush().await;
    assert_eq!(service.get_id(&id).unwrap().fields["title"], json!("Old"));
    assert!(drain(&mut rx).is_empty());
    assert!(!service.store().is_locked(&id));
}

#[tokio::test]
async fn blank_author_is_rejected_even_with_valid_title() {
    let service = library(&[("b1", "Old", "A")]);
    let id = ResourceId::new("b1");

    let err = service
        .set(&id, BookParams::title("New").with_author("\t"))
        .await
        .unwrap_err();
    assert_eq!(err, ServiceError::invalid("author", "Author must not be empty"));
    assert_eq!(service.get_id(&id).unwrap().fields["title"], json!("Old"));
}

#[tokio::test]
async fn parameters_are_trimmed() {
    let service = library(&[("b1", "Old", "A")]);
    let id = ResourceId::new("b1");

    service
        .set(&id, BookParams::author("  Ursula K. Le Guin "))
        .await
        .unwrap();
    assert_eq!(
        service.get_id(&id).unwrap().fields,
        fields(json!({"title": "Old", "author": "Ursula K. Le Guin"}))
    );
}

#[tokio::test]
async fn absent_parameters_leave_value_untouched() {
    let service = library(&[("b1", "Old", "A")]);
    let mut rx = service.subscribe();
    let id = ResourceId::new("b1");

    service.set(&id, BookParams::default()).await.unwrap();
    service.set(&id, BookParams::title(" Old ")).await.unwrap();
    service.flush().await;

    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn params_deserialize_missing_keys_as_absent() {
    let params: BookParams = serde_json::from_value(json!({"author": "B"})).unwrap();
    assert_eq!(params.title, Field::Absent);
    assert_eq!(params.author, Field::Present("B".to_owned()));

    let service = library(&[("b1", "Old", "A")]);
    service
        .set(&ResourceId::new("b1"), params)
        .await
        .unwrap();
    assert_eq!(
        service.get_id(&ResourceId::new("b1")).unwrap().fields,
        fields(json!({"title": "Old", "author": "B"}))
    );
}

#[tokio::test]
async fn title_change_reorders_collection() {
    let service = library(&[("b1", "Beta", "A"), ("b2", "gamma", "B")]);
    let mut rx = service.subscribe();

    service
        .set(&ResourceId::new("b1"), BookParams::title("Omega"))
        .await
        .unwrap();
    service.flush().await;

    let events = drain(&mut rx);
    assert_eq!(events.len(), 2);
    let StoreEvent::Collection(collection) = &events[1] else {
        panic!("expected a collection event, got {:?}", events[1]);
    };
    assert_eq!(collection.collection, Rid::new("library.books"));
    assert_eq!(
        collection.deltas,
        vec![
            CollectionDelta::Remove {
                idx: 0,
                rid: Rid::new("library.book.b1")
            },
            CollectionDelta::Add {
                idx: 1,
                rid: Rid::new("library.book.b1")
            },
        ]
    );
}

#[tokio::test]
async fn author_change_keeps_collection_order() {
    let service = library(&[("b1", "Beta", "A"), ("b2", "Gamma", "B")]);
    let mut rx = service.subscribe();

    service
        .set(&ResourceId::new("b1"), BookParams::author("Z"))
        .await
        .unwrap();
    service.flush().await;

    let events = drain(&mut rx);
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], StoreEvent::Changed(_)));
}

#[tokio::test]
async fn set_on_unknown_id_is_not_found() {
    let service = library(&[]);
    let err = service
        .set(&ResourceId::new("nope"), BookParams::title("X"))
        .await
        .unwrap_err();
    assert_eq!(err, ServiceError::NotFound("nope".into()));
    assert_eq!(err.code(), "system.notFound");
}

#[tokio::test]
async fn set_by_rid() {
    let service = library(&[("b1", "Old", "A")]);
    service
        .set_rid(&Rid::new("library.book.b1"), BookParams::title("New"))
        .await
        .unwrap();
    assert_eq!(
        service.get(&Rid::new("library.book.b1")).unwrap().fields["title"],
        json!("New")
    );

    let err = service
        .set_rid(&Rid::new("library.author.b1"), BookParams::title("X"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "system.notFound");
}

#[tokio::test]
async fn handler_rejects_blank_title_in_merged_value() {
    let service = library(&[("b1", "Old", "A")]);
    let id = ResourceId::new("b1");
    let mut patch = Patch::new();
    patch.set("title", "");

    let err = service.set(&id, patch).await.unwrap_err();
    assert_eq!(err, ServiceError::invalid("title", "Title must not be empty"));
    assert_eq!(service.get_id(&id).unwrap().fields["title"], json!("Old"));
    assert!(!service.store().is_locked(&id));
}

#[tokio::test]
async fn stored_fields_outside_the_request_are_not_revalidated() {
    let backend = MemoryBackend::with_resources([(
        ResourceId::new("b1"),
        fields(json!({"title": "Old ", "author": "A", "year": 1999})),
    )]);
    let service = open_library(Arc::new(backend)).unwrap();
    let id = ResourceId::new("b1");

    service.set(&id, BookParams::author("B")).await.unwrap();
    assert_eq!(
        service.get_id(&id).unwrap().fields,
        fields(json!({"title": "Old ", "author": "B", "year": 1999}))
    );
}
