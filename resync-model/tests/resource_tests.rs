use pretty_assertions::assert_eq;
use resync_model::{ModelError, Resource, to_fields};
use resync_types::ResourceId;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Book {
    title: String,
    author: String,
}

fn book() -> Book {
    Book {
        title: "Old".into(),
        author: "A".into(),
    }
}

#[test]
fn from_value_and_back() {
    let resource = Resource::from_value(ResourceId::new("b1"), &book()).unwrap();
    assert_eq!(resource.id, ResourceId::new("b1"));
    assert_eq!(resource.get_str("title"), Some("Old"));

    let back: Book = resource.to_value().unwrap();
    assert_eq!(back, book());
}

#[test]
fn typed_getters() {
    let fields = json!({"title": "T", "pages": 120, "available": true})
        .as_object()
        .cloned()
        .unwrap();
    let resource = Resource::new(ResourceId::new("b1"), fields);

    assert_eq!(resource.get_str("title"), Some("T"));
    assert_eq!(resource.get("pages"), Some(&json!(120)));
    assert_eq!(resource.get_str("pages"), None);
    assert!(resource.get("missing").is_none());
}

#[test]
fn to_fields_rejects_non_objects() {
    assert!(matches!(to_fields(&"text"), Err(ModelError::NotAnObject("string"))));
    assert!(matches!(to_fields(&vec![1, 2]), Err(ModelError::NotAnObject("array"))));
    assert!(matches!(to_fields(&()), Err(ModelError::NotAnObject("null"))));
}

#[test]
fn to_value_reports_shape_mismatch() {
    let fields = json!({"title": "T"}).as_object().cloned().unwrap();
    let resource = Resource::new(ResourceId::new("b1"), fields);
    let result: Result<Book, _> = resource.to_value();
    assert!(matches!(result, Err(ModelError::Serialization(_))));
}
