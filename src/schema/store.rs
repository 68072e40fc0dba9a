//! Schema persistence
//!
//! Rows are never updated in place. A store must reject a second row with
//! the same `(key, version)`; version assignment relies on that.

use std::collections::BTreeMap;
use std::sync::RwLock;

use uuid::Uuid;

use super::types::Schema;
use crate::core::{StoreError, StoreResult};

/// Schema repository trait
pub trait SchemaStore: Send + Sync {
    /// Persist a new row. Fails with `StoreError::Duplicate` when
    /// `(key, version)` already exists.
    fn insert(&self, schema: &Schema) -> StoreResult<()>;

    /// Highest version stored for `key`
    fn latest(&self, key: &str) -> StoreResult<Option<Schema>>;

    /// Find a specific row by id
    fn by_id(&self, id: Uuid) -> StoreResult<Option<Schema>>;

    /// Newest version of every key, ordered by key
    fn list_latest(&self) -> StoreResult<Vec<Schema>>;

    /// Remove every version of `key`, returning how many rows went
    fn delete_all(&self, key: &str) -> StoreResult<usize>;
}

/// In-memory schema store keyed by `(key, version)`
#[derive(Debug, Default)]
pub struct InMemorySchemaStore {
    rows: RwLock<BTreeMap<(String, u32), Schema>>,
}

impl InMemorySchemaStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SchemaStore for InMemorySchemaStore {
    fn insert(&self, schema: &Schema) -> StoreResult<()> {
        let mut rows = self.rows.write().map_err(|_| StoreError::Poisoned("schemas"))?;

        let slot = (schema.key.clone(), schema.version);
        if rows.contains_key(&slot) {
            return Err(StoreError::Duplicate(format!(
                "{}@{}",
                schema.key, schema.version
            )));
        }
        rows.insert(slot, schema.clone());
        Ok(())
    }

    fn latest(&self, key: &str) -> StoreResult<Option<Schema>> {
        let rows = self.rows.read().map_err(|_| StoreError::Poisoned("schemas"))?;
        Ok(rows
            .range((key.to_string(), 0)..=(key.to_string(), u32::MAX))
            .next_back()
            .map(|(_, s)| s.clone()))
    }

    fn by_id(&self, id: Uuid) -> StoreResult<Option<Schema>> {
        let rows = self.rows.read().map_err(|_| StoreError::Poisoned("schemas"))?;
        Ok(rows.values().find(|s| s.id == id).cloned())
    }

    fn list_latest(&self) -> StoreResult<Vec<Schema>> {
        let rows = self.rows.read().map_err(|_| StoreError::Poisoned("schemas"))?;

        // Rows are sorted by (key, version), so the last row seen per key wins
        let mut newest: BTreeMap<&str, &Schema> = BTreeMap::new();
        for ((key, _), schema) in rows.iter() {
            newest.insert(key.as_str(), schema);
        }
        Ok(newest.into_values().cloned().collect())
    }

    fn delete_all(&self, key: &str) -> StoreResult<usize> {
        let mut rows = self.rows.write().map_err(|_| StoreError::Poisoned("schemas"))?;
        let before = rows.len();
        rows.retain(|(k, _), _| k != key);
        Ok(before - rows.len())
    }
}
