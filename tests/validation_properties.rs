//! Validation Engine Property Tests
//!
//! Field-path addressing, idempotence and taxonomy reference checks of
//! the recursive validator, driven through the public API.

use std::sync::Arc;
use std::time::{Duration, Instant};

use matter_core::core::{StoreError, StoreResult, SystemError};
use matter_core::schema::{
    FieldDef, FieldType, Schema, SchemaError, SchemaValidator, TermResolver, ValidationErrorKind,
};
use matter_core::taxonomy::{InMemoryTaxonomyStore, TaxonomyStore, Term};
use serde_json::{json, Value};
use uuid::Uuid;

// =============================================================================
// Helper Functions
// =============================================================================

struct Palette {
    store: InMemoryTaxonomyStore,
    t1: Term,
    t2: Term,
}

/// `T1` belongs to `colors`, `T2` to `sizes`
fn palette() -> Palette {
    let store = InMemoryTaxonomyStore::new();
    let t1 = Term::new("colors", "Red", "red");
    let t2 = Term::new("sizes", "Large", "large");
    store.insert_term(&t1).unwrap();
    store.insert_term(&t2).unwrap();
    Palette { store, t1, t2 }
}

fn schema(fields: Vec<FieldDef>) -> Schema {
    Schema::new("product", 1, "Product", fields)
}

fn validate(resolver: &dyn TermResolver, schema: &Schema, data: Value) -> Result<(), SchemaError> {
    SchemaValidator::new(resolver).validate_document(schema, &data)
}

fn failure(result: Result<(), SchemaError>) -> (String, ValidationErrorKind) {
    match result {
        Err(SchemaError::Validation(v)) => (v.field, v.kind),
        other => panic!("expected a validation failure, got {:?}", other),
    }
}

// =============================================================================
// Nested Addressing Tests
// =============================================================================

fn nested_schema() -> Schema {
    schema(vec![FieldDef::object("a", vec![FieldDef::required_string("b")]).required()])
}

#[test]
fn test_missing_parent_addressed_to_parent() {
    let terms = InMemoryTaxonomyStore::new();
    let (field, kind) = failure(validate(&terms, &nested_schema(), json!({})));
    assert_eq!(field, "a");
    assert_eq!(kind, ValidationErrorKind::MissingRequiredField);
}

#[test]
fn test_missing_child_addressed_by_dotted_path() {
    let terms = InMemoryTaxonomyStore::new();
    let (field, kind) = failure(validate(&terms, &nested_schema(), json!({"a": {}})));
    assert_eq!(field, "a.b");
    assert_eq!(kind, ValidationErrorKind::MissingRequiredField);
}

#[test]
fn test_array_element_addressed_by_index() {
    let terms = InMemoryTaxonomyStore::new();
    let schema = schema(vec![FieldDef::array(
        "tags",
        Some(FieldDef::new("tag", FieldType::String)),
    )]);

    let (field, kind) = failure(validate(&terms, &schema, json!({"tags": ["x", 5]})));
    assert_eq!(field, "tags[1]");
    assert!(matches!(
        kind,
        ValidationErrorKind::TypeMismatch {
            expected: "string",
            ..
        }
    ));
}

#[test]
fn test_first_violation_in_declaration_order_wins() {
    let terms = InMemoryTaxonomyStore::new();
    let schema = schema(vec![
        FieldDef::required_string("first"),
        FieldDef::new("second", FieldType::Number).required(),
    ]);

    let (field, _) = failure(validate(&terms, &schema, json!({"second": "nope"})));
    assert_eq!(field, "first");
}

#[test]
fn test_idempotent_outcomes() {
    let p = palette();
    let schema = schema(vec![
        FieldDef::required_string("title"),
        FieldDef::taxonomy_reference("color", "colors"),
        FieldDef::new("published", FieldType::Date),
    ]);
    let good = json!({"title": "x", "color": p.t1.id.to_string(), "published": "2024-05-01T10:00:00Z"});
    let bad = json!({"title": "x", "published": "yesterday"});

    for _ in 0..3 {
        assert!(validate(&p.store, &schema, good.clone()).is_ok());
        let (field, kind) = failure(validate(&p.store, &schema, bad.clone()));
        assert_eq!(field, "published");
        assert!(matches!(kind, ValidationErrorKind::InvalidFormat { .. }));
    }
}

// =============================================================================
// Single Reference Tests
// =============================================================================

#[test]
fn test_reference_accepts_term_of_expected_taxonomy() {
    let p = palette();
    let schema = schema(vec![FieldDef::taxonomy_reference("color", "colors")]);
    assert!(validate(&p.store, &schema, json!({"color": p.t1.id.to_string()})).is_ok());
}

#[test]
fn test_reference_rejects_term_of_other_taxonomy() {
    let p = palette();
    let schema = schema(vec![FieldDef::taxonomy_reference("color", "colors")]);

    let (field, kind) = failure(validate(&p.store, &schema, json!({"color": p.t2.id.to_string()})));
    assert_eq!(field, "color");
    assert_eq!(
        kind,
        ValidationErrorKind::WrongTaxonomy {
            term_id: p.t2.id.to_string(),
            expected: "colors".into(),
            actual: "sizes".into(),
        }
    );
}

#[test]
fn test_reference_to_unknown_term() {
    let p = palette();
    let schema = schema(vec![FieldDef::taxonomy_reference("color", "colors")]);
    let ghost = Uuid::new_v4().to_string();

    let (_, kind) = failure(validate(&p.store, &schema, json!({"color": ghost.clone()})));
    assert_eq!(kind, ValidationErrorKind::ReferenceNotFound { term_id: ghost });
}

#[test]
fn test_reference_must_be_a_term_id() {
    let p = palette();
    let schema = schema(vec![FieldDef::taxonomy_reference("color", "colors")]);

    let (_, kind) = failure(validate(&p.store, &schema, json!({"color": "red"})));
    assert!(matches!(kind, ValidationErrorKind::InvalidReferenceFormat { .. }));

    let (_, kind) = failure(validate(&p.store, &schema, json!({"color": 7})));
    assert!(matches!(kind, ValidationErrorKind::InvalidFormat { .. }));
}

#[test]
fn test_reference_without_taxonomy_key_accepts_any_term() {
    let p = palette();
    let schema = schema(vec![FieldDef::taxonomy_reference("any", "")]);
    assert!(validate(&p.store, &schema, json!({"any": p.t2.id.to_string()})).is_ok());
}

// =============================================================================
// Multi-valued Reference Tests
// =============================================================================

fn multi_schema() -> Schema {
    schema(vec![FieldDef::taxonomy_reference("colors", "colors").multiple()])
}

#[test]
fn test_multi_reference_accepts_list() {
    let p = palette();
    assert!(validate(&p.store, &multi_schema(), json!({"colors": [p.t1.id.to_string()]})).is_ok());
}

#[test]
fn test_multi_reference_rejects_bare_string() {
    let p = palette();
    let (field, kind) = failure(validate(
        &p.store,
        &multi_schema(),
        json!({"colors": p.t1.id.to_string()}),
    ));
    assert_eq!(field, "colors");
    assert!(matches!(kind, ValidationErrorKind::InvalidFormat { .. }));
}

#[test]
fn test_multi_reference_reports_first_offending_element() {
    let p = palette();
    let (field, kind) = failure(validate(
        &p.store,
        &multi_schema(),
        json!({"colors": [p.t1.id.to_string(), p.t2.id.to_string()]}),
    ));
    assert_eq!(field, "colors[1]");
    assert!(matches!(
        kind,
        ValidationErrorKind::WrongTaxonomy { ref term_id, .. } if *term_id == p.t2.id.to_string()
    ));
}

// =============================================================================
// System Failure Tests
// =============================================================================

struct Unreachable;

impl TermResolver for Unreachable {
    fn term_by_id(&self, _id: Uuid, _deadline: Instant) -> StoreResult<Option<Term>> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
}

/// Takes its full latency regardless of the deadline
struct Slow(Duration);

impl TermResolver for Slow {
    fn term_by_id(&self, _id: Uuid, _deadline: Instant) -> StoreResult<Option<Term>> {
        std::thread::sleep(self.0);
        Ok(None)
    }
}

/// A remote store with long latency that stops waiting at the deadline
struct Laggy(Duration);

impl TermResolver for Laggy {
    fn term_by_id(&self, _id: Uuid, deadline: Instant) -> StoreResult<Option<Term>> {
        let answer_at = Instant::now() + self.0;
        if answer_at <= deadline {
            std::thread::sleep(self.0);
            return Ok(None);
        }
        std::thread::sleep(deadline.saturating_duration_since(Instant::now()));
        Err(StoreError::DeadlineExceeded)
    }
}

#[test]
fn test_unreachable_resolver_is_not_not_found() {
    let schema = schema(vec![FieldDef::taxonomy_reference("color", "colors")]);
    let err = validate(&Unreachable, &schema, json!({"color": Uuid::new_v4().to_string()}))
        .unwrap_err();

    assert!(matches!(
        err,
        SchemaError::System(SystemError::ResolverUnavailable(_))
    ));
    assert_eq!(err.status_code(), 503);
}

#[test]
fn test_deadline_exceeded_is_timeout() {
    let schema = schema(vec![FieldDef::taxonomy_reference("colors", "colors").multiple()]);
    let ids: Vec<String> = (0..5).map(|_| Uuid::new_v4().to_string()).collect();
    let resolver = Arc::new(Slow(Duration::from_millis(20)));

    let err = SchemaValidator::new(resolver.as_ref())
        .with_budget(Duration::from_millis(10))
        .validate_document(&schema, &json!({ "colors": ids }))
        .unwrap_err();
    assert!(matches!(err, SchemaError::System(SystemError::Timeout { .. })));
    assert_eq!(err.status_code(), 504);
}

#[test]
fn test_slow_lookup_is_cut_off_at_the_budget() {
    let schema = schema(vec![FieldDef::taxonomy_reference("color", "colors")]);
    let started = Instant::now();

    let err = SchemaValidator::new(&Laggy(Duration::from_millis(1500)))
        .with_budget(Duration::from_millis(100))
        .validate_document(&schema, &json!({"color": Uuid::new_v4().to_string()}))
        .unwrap_err();

    assert_eq!(
        err,
        SchemaError::System(SystemError::Timeout { budget_ms: 100 })
    );
    assert!(started.elapsed() < Duration::from_millis(1000));
}

#[test]
fn test_taxonomy_store_lookup_within_budget() {
    let p = palette();
    let schema = schema(vec![FieldDef::taxonomy_reference("color", "colors")]);
    let ok = SchemaValidator::new(&p.store)
        .with_budget(Duration::from_millis(100))
        .validate_document(&schema, &json!({"color": p.t1.id.to_string()}));
    assert!(ok.is_ok());
}
