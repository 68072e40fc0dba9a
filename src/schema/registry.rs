//! Schema versioning policy
//!
//! Editing a schema never mutates a stored row. Each create appends
//! `latest + 1` for the key and relies on the store rejecting duplicate
//! `(key, version)` pairs to detect concurrent writers.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use super::errors::{SchemaError, SchemaResult};
use super::store::SchemaStore;
use super::types::{check_definition, FieldDef, Schema};
use crate::core::SystemError;
use crate::observability::Event;

/// How many times a lost version race is retried before giving up
const VERSION_RACE_RETRIES: usize = 1;

/// Versioned schema registry over a [`SchemaStore`]
#[derive(Clone)]
pub struct SchemaRegistry {
    store: Arc<dyn SchemaStore>,
}

impl SchemaRegistry {
    pub fn new(store: Arc<dyn SchemaStore>) -> Self {
        Self { store }
    }

    /// Create the next version of `key`.
    ///
    /// # Errors
    ///
    /// - `InvalidDefinition` if the key, name or field tree is malformed
    /// - `VersioningConflict` if a concurrent writer keeps taking the slot
    /// - `System` if the store fails
    pub fn create_schema(&self, key: &str, name: &str, fields: Vec<FieldDef>) -> SchemaResult<Schema> {
        check_definition(key, name, &fields).map_err(SchemaError::InvalidDefinition)?;

        let mut attempt = 0;
        loop {
            let latest = self.store.latest(key).map_err(SystemError::from)?;
            let version = latest.map(|s| s.version).unwrap_or(0) + 1;
            let schema = Schema::new(key, version, name.trim(), fields.clone());

            match self.store.insert(&schema) {
                Ok(()) => {
                    info!(
                        event = %Event::SchemaCreated,
                        key = %schema.key,
                        version = schema.version,
                        fields = schema.fields.len(),
                        "schema version created"
                    );
                    return Ok(schema);
                }
                Err(e) if e.is_duplicate() => {
                    if attempt >= VERSION_RACE_RETRIES {
                        return Err(SchemaError::VersioningConflict {
                            key: key.to_string(),
                            version,
                        });
                    }
                    attempt += 1;
                    warn!(
                        event = %Event::SchemaVersionRetry,
                        key = %key,
                        version,
                        "schema version taken concurrently, re-reading latest"
                    );
                }
                Err(e) => return Err(SystemError::from(e).into()),
            }
        }
    }

    /// Newest version of `key`
    pub fn latest_schema(&self, key: &str) -> SchemaResult<Schema> {
        self.store
            .latest(key)
            .map_err(SystemError::from)?
            .ok_or_else(|| SchemaError::UnknownSchema(key.to_string()))
    }

    /// A specific stored version by id
    pub fn schema_by_id(&self, id: Uuid) -> SchemaResult<Schema> {
        self.store
            .by_id(id)
            .map_err(SystemError::from)?
            .ok_or_else(|| SchemaError::UnknownSchema(id.to_string()))
    }

    /// Newest version of every key
    pub fn list_latest(&self) -> SchemaResult<Vec<Schema>> {
        Ok(self.store.list_latest().map_err(SystemError::from)?)
    }

    /// Remove every version of `key`.
    ///
    /// Entries stamped with the deleted versions are left alone.
    pub fn delete_all_versions(&self, key: &str) -> SchemaResult<usize> {
        let removed = self.store.delete_all(key).map_err(SystemError::from)?;
        if removed == 0 {
            return Err(SchemaError::UnknownSchema(key.to_string()));
        }
        info!(event = %Event::SchemaDeleted, key = %key, versions = removed, "schema deleted");
        Ok(removed)
    }
}
