//! Taxonomy and term persistence

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, TryLockError};
use std::thread;
use std::time::{Duration, Instant};

use uuid::Uuid;

use super::types::{Taxonomy, Term};
use crate::core::{StoreError, StoreResult};
use crate::schema::TermResolver;

/// Taxonomy repository trait
pub trait TaxonomyStore: Send + Sync {
    /// Fails with `Duplicate` if the key is taken
    fn insert_taxonomy(&self, taxonomy: &Taxonomy) -> StoreResult<()>;

    fn taxonomy(&self, key: &str) -> StoreResult<Option<Taxonomy>>;

    fn list_taxonomies(&self) -> StoreResult<Vec<Taxonomy>>;

    fn update_taxonomy(&self, taxonomy: &Taxonomy) -> StoreResult<bool>;

    /// Removes the taxonomy and all of its terms
    fn delete_taxonomy(&self, key: &str) -> StoreResult<bool>;

    /// Fails with `Duplicate` if the slug is taken within the taxonomy
    fn insert_term(&self, term: &Term) -> StoreResult<()>;

    fn term(&self, id: Uuid) -> StoreResult<Option<Term>>;

    /// Terms of one taxonomy, ordered by name
    fn terms_in(&self, taxonomy_key: &str) -> StoreResult<Vec<Term>>;

    /// Fails with `Duplicate` if the new slug clashes with another term
    fn update_term(&self, term: &Term) -> StoreResult<bool>;

    fn delete_term(&self, id: Uuid) -> StoreResult<bool>;

    fn has_children(&self, id: Uuid) -> StoreResult<bool>;
}

#[derive(Debug, Default)]
struct Tables {
    taxonomies: BTreeMap<String, Taxonomy>,
    terms: BTreeMap<Uuid, Term>,
}

impl Tables {
    fn slug_taken(&self, term: &Term) -> bool {
        self.terms.values().any(|t| {
            t.id != term.id && t.taxonomy_key == term.taxonomy_key && t.slug == term.slug
        })
    }
}

/// In-memory taxonomy store. Also serves term lookups for validation.
#[derive(Debug, Default)]
pub struct InMemoryTaxonomyStore {
    tables: RwLock<Tables>,
}

impl InMemoryTaxonomyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TaxonomyStore for InMemoryTaxonomyStore {
    fn insert_taxonomy(&self, taxonomy: &Taxonomy) -> StoreResult<()> {
        let mut tables = self.tables.write().map_err(|_| StoreError::Poisoned("taxonomies"))?;
        if tables.taxonomies.contains_key(&taxonomy.key) {
            return Err(StoreError::Duplicate(taxonomy.key.clone()));
        }
        tables
            .taxonomies
            .insert(taxonomy.key.clone(), taxonomy.clone());
        Ok(())
    }

    fn taxonomy(&self, key: &str) -> StoreResult<Option<Taxonomy>> {
        let tables = self.tables.read().map_err(|_| StoreError::Poisoned("taxonomies"))?;
        Ok(tables.taxonomies.get(key).cloned())
    }

    fn list_taxonomies(&self) -> StoreResult<Vec<Taxonomy>> {
        let tables = self.tables.read().map_err(|_| StoreError::Poisoned("taxonomies"))?;
        Ok(tables.taxonomies.values().cloned().collect())
    }

    fn update_taxonomy(&self, taxonomy: &Taxonomy) -> StoreResult<bool> {
        let mut tables = self.tables.write().map_err(|_| StoreError::Poisoned("taxonomies"))?;
        match tables.taxonomies.get_mut(&taxonomy.key) {
            Some(existing) => {
                *existing = taxonomy.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete_taxonomy(&self, key: &str) -> StoreResult<bool> {
        let mut tables = self.tables.write().map_err(|_| StoreError::Poisoned("taxonomies"))?;
        if tables.taxonomies.remove(key).is_none() {
            return Ok(false);
        }
        tables.terms.retain(|_, t| t.taxonomy_key != key);
        Ok(true)
    }

    fn insert_term(&self, term: &Term) -> StoreResult<()> {
        let mut tables = self.tables.write().map_err(|_| StoreError::Poisoned("terms"))?;
        if tables.slug_taken(term) {
            return Err(StoreError::Duplicate(format!(
                "{}/{}",
                term.taxonomy_key, term.slug
            )));
        }
        tables.terms.insert(term.id, term.clone());
        Ok(())
    }

    fn term(&self, id: Uuid) -> StoreResult<Option<Term>> {
        let tables = self.tables.read().map_err(|_| StoreError::Poisoned("terms"))?;
        Ok(tables.terms.get(&id).cloned())
    }

    fn terms_in(&self, taxonomy_key: &str) -> StoreResult<Vec<Term>> {
        let tables = self.tables.read().map_err(|_| StoreError::Poisoned("terms"))?;
        let mut terms: Vec<Term> = tables
            .terms
            .values()
            .filter(|t| t.taxonomy_key == taxonomy_key)
            .cloned()
            .collect();
        terms.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(terms)
    }

    fn update_term(&self, term: &Term) -> StoreResult<bool> {
        let mut tables = self.tables.write().map_err(|_| StoreError::Poisoned("terms"))?;
        if !tables.terms.contains_key(&term.id) {
            return Ok(false);
        }
        if tables.slug_taken(term) {
            return Err(StoreError::Duplicate(format!(
                "{}/{}",
                term.taxonomy_key, term.slug
            )));
        }
        tables.terms.insert(term.id, term.clone());
        Ok(true)
    }

    fn delete_term(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().map_err(|_| StoreError::Poisoned("terms"))?;
        Ok(tables.terms.remove(&id).is_some())
    }

    fn has_children(&self, id: Uuid) -> StoreResult<bool> {
        let tables = self.tables.read().map_err(|_| StoreError::Poisoned("terms"))?;
        Ok(tables.terms.values().any(|t| t.parent_id == Some(id)))
    }
}

/// Pause between attempts to take a contended read lock
const LOCK_RETRY_INTERVAL: Duration = Duration::from_millis(1);

impl InMemoryTaxonomyStore {
    /// Read access that gives up at `deadline` instead of waiting on a writer.
    fn read_until(&self, deadline: Instant) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        loop {
            match self.tables.try_read() {
                Ok(tables) => return Ok(tables),
                Err(TryLockError::Poisoned(_)) => return Err(StoreError::Poisoned("terms")),
                Err(TryLockError::WouldBlock) => {
                    if Instant::now() >= deadline {
                        return Err(StoreError::DeadlineExceeded);
                    }
                    thread::sleep(LOCK_RETRY_INTERVAL);
                }
            }
        }
    }
}

impl TermResolver for InMemoryTaxonomyStore {
    fn term_by_id(&self, id: Uuid, deadline: Instant) -> StoreResult<Option<Term>> {
        if Instant::now() >= deadline {
            return Err(StoreError::DeadlineExceeded);
        }
        let tables = self.read_until(deadline)?;
        Ok(tables.terms.get(&id).cloned())
    }
}
