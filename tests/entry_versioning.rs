//! Entry Versioning Tests
//!
//! Entries are validated against the newest schema when created and stay
//! pinned to that version afterwards.

use std::sync::Arc;

use matter_core::auth::{AuthContext, Role};
use matter_core::content::{
    ContentError, CreateEntryRequest, EntryFilter, EntryService, InMemoryCommentStore,
    InMemoryEntryStore, UpdateEntryRequest,
};
use matter_core::schema::{
    FieldDef, InMemorySchemaStore, SchemaError, SchemaRegistry, ValidationErrorKind,
};
use matter_core::search::SearchSync;
use matter_core::taxonomy::{
    CreateTaxonomyRequest, CreateTermRequest, InMemoryTaxonomyStore, TaxonomyService,
};
use serde_json::{json, Map, Value};
use uuid::Uuid;

// =============================================================================
// Helper Functions
// =============================================================================

struct Platform {
    schemas: SchemaRegistry,
    entries: EntryService,
    taxonomies: TaxonomyService,
}

fn platform() -> Platform {
    let schemas = SchemaRegistry::new(Arc::new(InMemorySchemaStore::new()));
    let entry_store = Arc::new(InMemoryEntryStore::new());
    let taxonomy_store = Arc::new(InMemoryTaxonomyStore::new());

    let entries = EntryService::new(
        schemas.clone(),
        entry_store.clone(),
        Arc::new(InMemoryCommentStore::new()),
        taxonomy_store.clone(),
        SearchSync::disabled(),
    );
    let taxonomies = TaxonomyService::new(taxonomy_store, entry_store);

    Platform {
        schemas,
        entries,
        taxonomies,
    }
}

fn attrs(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("not an object: {}", other),
    }
}

fn post(title: &str, attributes: Value) -> CreateEntryRequest {
    CreateEntryRequest {
        schema_key: "post".into(),
        title: title.into(),
        slug: None,
        draft: false,
        body: String::new(),
        attributes: attrs(attributes),
    }
}

fn writer() -> AuthContext {
    AuthContext::new(Uuid::new_v4(), Role::User)
}

fn post_v1() -> Vec<FieldDef> {
    vec![FieldDef::required_string("title")]
}

fn post_v2() -> Vec<FieldDef> {
    vec![
        FieldDef::required_string("title"),
        FieldDef::taxonomy_reference("author", "people").required(),
    ]
}

// =============================================================================
// End-to-end Scenario
// =============================================================================

#[test]
fn test_post_v1_entry_survives_v2() {
    let p = platform();
    let author = writer();

    p.schemas.create_schema("post", "Post", post_v1()).unwrap();
    let old = p
        .entries
        .create(&author, post("Before", json!({"title": "Before"})))
        .unwrap();
    assert_eq!(old.schema_version, 1);

    p.schemas.create_schema("post", "Post", post_v2()).unwrap();

    // The v1 entry is untouched by the new version
    let fetched = p.entries.get(old.id).unwrap();
    assert_eq!(fetched, old);

    // New entries must satisfy v2
    let err = p
        .entries
        .create(&author, post("After", json!({"title": "After"})))
        .unwrap_err();
    match err {
        ContentError::Schema(SchemaError::Validation(v)) => {
            assert_eq!(v.field, "author");
            assert_eq!(v.kind, ValidationErrorKind::MissingRequiredField);
        }
        other => panic!("unexpected error {:?}", other),
    }

    p.taxonomies
        .create_taxonomy(CreateTaxonomyRequest {
            key: "people".into(),
            name: "People".into(),
            is_hierarchical: false,
        })
        .unwrap();
    let ada = p
        .taxonomies
        .create_term(CreateTermRequest {
            taxonomy_key: "people".into(),
            name: "Ada Lovelace".into(),
            slug: None,
            color: None,
            parent_id: None,
        })
        .unwrap();

    let new = p
        .entries
        .create(
            &author,
            post("After", json!({"title": "After", "author": ada.id.to_string()})),
        )
        .unwrap();
    assert_eq!(new.schema_version, 2);
}

/// Updating a v1 entry after v2 exists checks the v1 rules only.
#[test]
fn test_update_of_pinned_entry_ignores_newer_version() {
    let p = platform();
    let author = writer();

    p.schemas.create_schema("post", "Post", post_v1()).unwrap();
    let entry = p
        .entries
        .create(&author, post("Old", json!({"title": "Old"})))
        .unwrap();
    p.schemas.create_schema("post", "Post", post_v2()).unwrap();

    let updated = p
        .entries
        .update(
            &author,
            entry.id,
            UpdateEntryRequest {
                attributes: Some(attrs(json!({"title": "Edited"}))),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(updated.schema_version, 1);
    assert_eq!(updated.attributes["title"], "Edited");

    let err = p
        .entries
        .update(
            &author,
            entry.id,
            UpdateEntryRequest {
                attributes: Some(attrs(json!({}))),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert_eq!(err.status_code(), 400);
}

/// Deleting every schema version leaves pinned entries readable but
/// their attributes can no longer be revalidated.
#[test]
fn test_entry_outlives_deleted_schema() {
    let p = platform();
    let author = writer();

    p.schemas.create_schema("post", "Post", post_v1()).unwrap();
    let entry = p
        .entries
        .create(&author, post("Orphan", json!({"title": "Orphan"})))
        .unwrap();
    p.schemas.delete_all_versions("post").unwrap();

    assert_eq!(p.entries.get(entry.id).unwrap().id, entry.id);

    let err = p
        .entries
        .update(
            &author,
            entry.id,
            UpdateEntryRequest {
                attributes: Some(attrs(json!({"title": "x"}))),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, ContentError::Conflict(_)));

    // Non-attribute edits still work
    let renamed = p
        .entries
        .update(
            &author,
            entry.id,
            UpdateEntryRequest {
                title: Some("Renamed".into()),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(renamed.base.title, "Renamed");
}

/// Referenced terms cannot be deleted out from under entries.
#[test]
fn test_referenced_term_is_protected() {
    let p = platform();
    p.taxonomies
        .create_taxonomy(CreateTaxonomyRequest {
            key: "people".into(),
            name: "People".into(),
            is_hierarchical: false,
        })
        .unwrap();
    let ada = p
        .taxonomies
        .create_term(CreateTermRequest {
            taxonomy_key: "people".into(),
            name: "Ada".into(),
            slug: None,
            color: None,
            parent_id: None,
        })
        .unwrap();
    p.schemas.create_schema("post", "Post", post_v2()).unwrap();
    let entry = p
        .entries
        .create(
            &writer(),
            post("Hi", json!({"title": "Hi", "author": ada.id.to_string()})),
        )
        .unwrap();

    assert!(matches!(
        p.taxonomies.delete_term(ada.id),
        Err(ContentError::Conflict(_))
    ));

    let admin = AuthContext::new(Uuid::new_v4(), Role::Admin);
    p.entries.delete(&admin, entry.id).unwrap();
    p.taxonomies.delete_term(ada.id).unwrap();
}

#[test]
fn test_listing_filters_by_schema_and_draft() {
    let p = platform();
    let author = writer();
    p.schemas.create_schema("post", "Post", vec![]).unwrap();
    p.schemas.create_schema("page", "Page", vec![]).unwrap();

    p.entries.create(&author, post("A", json!({}))).unwrap();
    let mut draft = post("B", json!({}));
    draft.draft = true;
    p.entries.create(&author, draft).unwrap();
    let mut page = post("C", json!({}));
    page.schema_key = "page".into();
    p.entries.create(&author, page).unwrap();

    let posts = p
        .entries
        .list(&EntryFilter {
            schema_key: Some("post".into()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(posts.total, 2);

    let published = p
        .entries
        .list(&EntryFilter {
            schema_key: Some("post".into()),
            draft: Some(false),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(published.total, 1);
    assert_eq!(published.items[0].base.title, "A");
}
