use resync_model::{FieldSpec, FieldViolation, PassThrough, Resource, ResourceHandler, ResourceSchema};
use resync_types::ResourceId;
use serde_json::json;

fn make_resource(data: serde_json::Value) -> Resource {
    Resource::new(ResourceId::new("b1"), data.as_object().cloned().unwrap())
}

// ── Default implementations ──────────────────────────────────────

#[test]
fn pass_through_accepts_anything() {
    let resource = make_resource(json!({"anything": "goes"}));
    assert!(PassThrough.validate(&resource).is_ok());
}

#[test]
fn pass_through_transform_is_identity() {
    let resource = make_resource(json!({"title": "before"}));
    assert_eq!(PassThrough.transform(resource.clone()), resource);
}

// ── Custom handler ───────────────────────────────────────────────

struct HideDrafts;

impl ResourceHandler for HideDrafts {
    fn validate(&self, resource: &Resource) -> Result<(), FieldViolation> {
        match resource.get_str("title") {
            Some(title) if title.starts_with('_') => {
                Err(FieldViolation::new("title", "reserved prefix"))
            }
            _ => Ok(()),
        }
    }

    fn transform(&self, mut resource: Resource) -> Resource {
        resource.fields.remove("draft");
        resource
    }
}

#[test]
fn custom_validate_rejects() {
    let err = HideDrafts
        .validate(&make_resource(json!({"title": "_x"})))
        .unwrap_err();
    assert_eq!(err.field, "title");
}

#[test]
fn custom_transform_applies() {
    let out = HideDrafts.transform(make_resource(json!({"title": "T", "draft": true})));
    assert!(out.get("draft").is_none());
    assert_eq!(out.get_str("title"), Some("T"));
}

// ── Schema as handler ────────────────────────────────────────────

#[test]
fn schema_handler_checks_value() {
    let schema = ResourceSchema::new("book").with_field(FieldSpec::text("title", true));
    let handler: &dyn ResourceHandler = &schema;

    assert!(handler.validate(&make_resource(json!({"title": "T"}))).is_ok());
    assert!(handler.validate(&make_resource(json!({}))).is_err());
}
