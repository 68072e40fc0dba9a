//! Schema Invariant Tests
//!
//! Versioning rules for the schema registry:
//! - Version N after the N-th create for a key, no gaps
//! - Versions are independent per key
//! - Old versions stay addressable by id
//! - A lost version race is retried once, then reported

use std::sync::{Arc, Mutex};

use matter_core::core::{StoreError, StoreResult};
use matter_core::schema::{
    FieldDef, FieldType, InMemorySchemaStore, Schema, SchemaError, SchemaRegistry, SchemaStore,
};
use uuid::Uuid;

// =============================================================================
// Helper Functions
// =============================================================================

fn registry() -> SchemaRegistry {
    SchemaRegistry::new(Arc::new(InMemorySchemaStore::new()))
}

fn title_only() -> Vec<FieldDef> {
    vec![FieldDef::required_string("title")]
}

/// Store whose `latest` lags behind for a fixed number of reads, as if a
/// concurrent writer had just committed.
struct StaleReads {
    inner: InMemorySchemaStore,
    stale_reads: Mutex<u32>,
}

impl StaleReads {
    fn new(stale_reads: u32) -> Self {
        Self {
            inner: InMemorySchemaStore::new(),
            stale_reads: Mutex::new(stale_reads),
        }
    }
}

impl SchemaStore for StaleReads {
    fn insert(&self, schema: &Schema) -> StoreResult<()> {
        self.inner.insert(schema)
    }

    fn latest(&self, key: &str) -> StoreResult<Option<Schema>> {
        let mut stale = self.stale_reads.lock().unwrap();
        if *stale > 0 {
            *stale -= 1;
            return Ok(None);
        }
        self.inner.latest(key)
    }

    fn by_id(&self, id: Uuid) -> StoreResult<Option<Schema>> {
        self.inner.by_id(id)
    }

    fn list_latest(&self) -> StoreResult<Vec<Schema>> {
        self.inner.list_latest()
    }

    fn delete_all(&self, key: &str) -> StoreResult<usize> {
        self.inner.delete_all(key)
    }
}

// =============================================================================
// Version Sequence Tests
// =============================================================================

/// The N-th create yields version N, strictly increasing with no gaps.
#[test]
fn test_nth_create_yields_version_n() {
    let registry = registry();

    for n in 1..=10u32 {
        let created = registry.create_schema("post", "Post", title_only()).unwrap();
        assert_eq!(created.version, n);
        assert_eq!(registry.latest_schema("post").unwrap().version, n);
    }
}

/// Versions of different keys do not interfere.
#[test]
fn test_versions_are_per_key() {
    let registry = registry();
    registry.create_schema("post", "Post", title_only()).unwrap();
    registry.create_schema("post", "Post", title_only()).unwrap();
    let page = registry.create_schema("page", "Page", title_only()).unwrap();

    assert_eq!(page.version, 1);
    assert_eq!(registry.latest_schema("post").unwrap().version, 2);
}

/// Superseded versions remain readable by id with their original fields.
#[test]
fn test_old_versions_remain_addressable() {
    let registry = registry();
    let v1 = registry.create_schema("post", "Post", title_only()).unwrap();
    let mut fields = title_only();
    fields.push(FieldDef::new("rating", FieldType::Number));
    registry.create_schema("post", "Post", fields).unwrap();

    let fetched = registry.schema_by_id(v1.id).unwrap();
    assert_eq!(fetched.version, 1);
    assert_eq!(fetched.fields.len(), 1);
}

/// Listing shows only the newest version of each key.
#[test]
fn test_list_latest_one_row_per_key() {
    let registry = registry();
    for _ in 0..3 {
        registry.create_schema("post", "Post", title_only()).unwrap();
    }
    registry.create_schema("page", "Page", title_only()).unwrap();

    let mut latest: Vec<_> = registry
        .list_latest()
        .unwrap()
        .into_iter()
        .map(|s| (s.key, s.version))
        .collect();
    latest.sort();
    assert_eq!(latest, vec![("page".to_string(), 1), ("post".to_string(), 3)]);
}

// =============================================================================
// Deletion Tests
// =============================================================================

#[test]
fn test_delete_all_versions() {
    let registry = registry();
    registry.create_schema("post", "Post", title_only()).unwrap();
    registry.create_schema("post", "Post", title_only()).unwrap();

    assert_eq!(registry.delete_all_versions("post").unwrap(), 2);
    assert!(matches!(
        registry.latest_schema("post"),
        Err(SchemaError::UnknownSchema(_))
    ));
    assert!(matches!(
        registry.delete_all_versions("post"),
        Err(SchemaError::UnknownSchema(_))
    ));
}

// =============================================================================
// Concurrency Tests
// =============================================================================

/// One stale read loses the race once; the retry re-reads and succeeds.
#[test]
fn test_single_version_race_is_retried() {
    let store = Arc::new(StaleReads::new(0));
    let registry = SchemaRegistry::new(store.clone());
    registry.create_schema("post", "Post", title_only()).unwrap();

    *store.stale_reads.lock().unwrap() = 1;
    let created = registry.create_schema("post", "Post", title_only()).unwrap();
    assert_eq!(created.version, 2);
}

/// Two lost races in a row surface as a conflict, never an overwrite.
#[test]
fn test_repeated_version_race_is_a_conflict() {
    let store = Arc::new(StaleReads::new(0));
    let registry = SchemaRegistry::new(store.clone());
    let original = registry.create_schema("post", "Post", title_only()).unwrap();

    *store.stale_reads.lock().unwrap() = 2;
    let err = registry
        .create_schema("post", "Post", vec![])
        .unwrap_err();
    assert!(matches!(
        err,
        SchemaError::VersioningConflict { ref key, version: 1 } if key == "post"
    ));
    assert_eq!(err.status_code(), 409);
    assert_eq!(registry.latest_schema("post").unwrap().id, original.id);
}

/// Parallel creators on one key end up with distinct, gap-free versions.
#[test]
fn test_parallel_creates_get_distinct_versions() {
    let registry = registry();
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let registry = registry.clone();
            std::thread::spawn(move || registry.create_schema("post", "Post", title_only()))
        })
        .collect();

    let mut versions = Vec::new();
    for handle in handles {
        match handle.join().unwrap() {
            Ok(schema) => versions.push(schema.version),
            Err(SchemaError::VersioningConflict { .. }) => {}
            Err(other) => panic!("unexpected error {:?}", other),
        }
    }
    versions.sort();
    let expected: Vec<u32> = (1..=versions.len() as u32).collect();
    assert_eq!(versions, expected);
}

// =============================================================================
// Definition Tests
// =============================================================================

#[test]
fn test_invalid_definitions_rejected() {
    let registry = registry();

    let bad_key = registry.create_schema("not ok", "Post", title_only());
    assert!(matches!(bad_key, Err(SchemaError::InvalidDefinition(_))));

    let dup = registry.create_schema(
        "post",
        "Post",
        vec![FieldDef::required_string("a"), FieldDef::optional_string("a")],
    );
    assert!(matches!(dup, Err(SchemaError::InvalidDefinition(_))));

    let nested_dup = registry.create_schema(
        "post",
        "Post",
        vec![FieldDef::object(
            "seo",
            vec![FieldDef::optional_string("x"), FieldDef::optional_string("x")],
        )],
    );
    assert!(matches!(nested_dup, Err(SchemaError::InvalidDefinition(_))));

    // Nothing was persisted by the rejected calls
    assert!(registry.list_latest().unwrap().is_empty());
}

/// Failures of the store are system errors, not conflicts.
#[test]
fn test_store_failure_is_system_error() {
    struct Down;
    impl SchemaStore for Down {
        fn insert(&self, _: &Schema) -> StoreResult<()> {
            Err(StoreError::Unavailable("down".into()))
        }
        fn latest(&self, _: &str) -> StoreResult<Option<Schema>> {
            Ok(None)
        }
        fn by_id(&self, _: Uuid) -> StoreResult<Option<Schema>> {
            Ok(None)
        }
        fn list_latest(&self) -> StoreResult<Vec<Schema>> {
            Ok(Vec::new())
        }
        fn delete_all(&self, _: &str) -> StoreResult<usize> {
            Ok(0)
        }
    }

    let registry = SchemaRegistry::new(Arc::new(Down));
    let err = registry.create_schema("post", "Post", title_only()).unwrap_err();
    assert!(matches!(err, SchemaError::System(_)));
    assert!(!err.is_client_error());
}
