//! Taxonomy and term operations

use std::collections::HashSet;
use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use super::store::TaxonomyStore;
use super::types::{
    CreateTaxonomyRequest, CreateTermRequest, Taxonomy, Term, UpdateTaxonomyRequest,
    UpdateTermRequest,
};
use crate::content::{ContentError, ContentResult, EntryStore};
use crate::core::{is_valid_key, slugify, StoreError, MAX_KEY_LEN};
use crate::observability::Event;

/// Longest accepted taxonomy or term name
pub const MAX_NAME_LEN: usize = 100;

fn check_name(name: &str) -> ContentResult<String> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
        return Err(ContentError::invalid(format!(
            "name must be 1-{} characters",
            MAX_NAME_LEN
        )));
    }
    Ok(name.to_string())
}

fn conflict_on_duplicate(err: StoreError, what: String) -> ContentError {
    if err.is_duplicate() {
        ContentError::Conflict(what)
    } else {
        err.into()
    }
}

#[derive(Clone)]
pub struct TaxonomyService {
    store: Arc<dyn TaxonomyStore>,
    entries: Arc<dyn EntryStore>,
}

impl TaxonomyService {
    pub fn new(store: Arc<dyn TaxonomyStore>, entries: Arc<dyn EntryStore>) -> Self {
        Self { store, entries }
    }

    pub fn create_taxonomy(&self, req: CreateTaxonomyRequest) -> ContentResult<Taxonomy> {
        if !is_valid_key(&req.key) {
            return Err(ContentError::invalid(format!(
                "taxonomy key must be 1-{} characters of letters, digits, '_' or '-'",
                MAX_KEY_LEN
            )));
        }
        let name = check_name(&req.name)?;

        let taxonomy = Taxonomy::new(req.key, name, req.is_hierarchical);
        self.store.insert_taxonomy(&taxonomy).map_err(|e| {
            conflict_on_duplicate(e, format!("taxonomy '{}' already exists", taxonomy.key))
        })?;
        info!(event = %Event::TaxonomyCreated, key = %taxonomy.key);
        Ok(taxonomy)
    }

    pub fn taxonomy(&self, key: &str) -> ContentResult<Taxonomy> {
        self.store
            .taxonomy(key)?
            .ok_or_else(|| ContentError::not_found("taxonomy"))
    }

    pub fn list_taxonomies(&self) -> ContentResult<Vec<Taxonomy>> {
        Ok(self.store.list_taxonomies()?)
    }

    /// Rename or toggle the hierarchy flag. Flattening is refused while
    /// any term still has a parent.
    pub fn update_taxonomy(&self, key: &str, req: UpdateTaxonomyRequest) -> ContentResult<Taxonomy> {
        let mut taxonomy = self.taxonomy(key)?;

        if let Some(name) = req.name {
            taxonomy.name = check_name(&name)?;
        }
        if let Some(hierarchical) = req.is_hierarchical {
            if taxonomy.is_hierarchical && !hierarchical {
                let nested = self
                    .store
                    .terms_in(key)?
                    .iter()
                    .any(|t| t.parent_id.is_some());
                if nested {
                    return Err(ContentError::Conflict(
                        "taxonomy still has nested terms".into(),
                    ));
                }
            }
            taxonomy.is_hierarchical = hierarchical;
        }

        if !self.store.update_taxonomy(&taxonomy)? {
            return Err(ContentError::not_found("taxonomy"));
        }
        Ok(taxonomy)
    }

    /// Deletes the taxonomy together with its terms
    pub fn delete_taxonomy(&self, key: &str) -> ContentResult<()> {
        if !self.store.delete_taxonomy(key)? {
            return Err(ContentError::not_found("taxonomy"));
        }
        info!(event = %Event::TaxonomyDeleted, key = %key);
        Ok(())
    }

    fn check_parent(
        &self,
        taxonomy: &Taxonomy,
        term_id: Uuid,
        parent_id: Uuid,
    ) -> ContentResult<()> {
        if !taxonomy.is_hierarchical {
            return Err(ContentError::invalid(format!(
                "taxonomy '{}' is not hierarchical",
                taxonomy.key
            )));
        }
        if parent_id == term_id {
            return Err(ContentError::invalid("a term cannot be its own parent"));
        }

        // Walk up from the parent; meeting the term again means a cycle
        let mut seen = HashSet::new();
        let mut cursor = Some(parent_id);
        while let Some(id) = cursor {
            if id == term_id {
                return Err(ContentError::invalid("parent would create a cycle"));
            }
            if !seen.insert(id) {
                break;
            }
            let term = self
                .store
                .term(id)?
                .ok_or_else(|| ContentError::invalid("parent term does not exist"))?;
            if term.taxonomy_key != taxonomy.key {
                return Err(ContentError::invalid(
                    "parent term belongs to another taxonomy",
                ));
            }
            cursor = term.parent_id;
        }
        Ok(())
    }

    pub fn create_term(&self, req: CreateTermRequest) -> ContentResult<Term> {
        let taxonomy = self.taxonomy(&req.taxonomy_key)?;
        let name = check_name(&req.name)?;
        let slug = slugify(req.slug.as_deref().unwrap_or(&name));
        if slug.is_empty() {
            return Err(ContentError::invalid("slug cannot be empty"));
        }

        let mut term = Term::new(taxonomy.key.clone(), name, slug);
        term.color = req.color.unwrap_or_default();
        if let Some(parent_id) = req.parent_id {
            self.check_parent(&taxonomy, term.id, parent_id)?;
            term.parent_id = Some(parent_id);
        }

        self.store.insert_term(&term).map_err(|e| {
            conflict_on_duplicate(e, format!("term slug '{}' already exists", term.slug))
        })?;
        info!(event = %Event::TermCreated, term_id = %term.id, taxonomy = %term.taxonomy_key);
        Ok(term)
    }

    pub fn term(&self, id: Uuid) -> ContentResult<Term> {
        self.store
            .term(id)?
            .ok_or_else(|| ContentError::not_found("term"))
    }

    pub fn terms_in(&self, taxonomy_key: &str) -> ContentResult<Vec<Term>> {
        self.taxonomy(taxonomy_key)?;
        Ok(self.store.terms_in(taxonomy_key)?)
    }

    pub fn update_term(&self, id: Uuid, req: UpdateTermRequest) -> ContentResult<Term> {
        let mut term = self.term(id)?;

        if let Some(name) = req.name {
            term.name = check_name(&name)?;
        }
        if let Some(slug) = req.slug {
            let slug = slugify(&slug);
            if slug.is_empty() {
                return Err(ContentError::invalid("slug cannot be empty"));
            }
            term.slug = slug;
        }
        if let Some(color) = req.color {
            term.color = color;
        }
        if let Some(parent_id) = req.parent_id {
            let taxonomy = self.taxonomy(&term.taxonomy_key)?;
            self.check_parent(&taxonomy, term.id, parent_id)?;
            term.parent_id = Some(parent_id);
        }

        let updated = self.store.update_term(&term).map_err(|e| {
            conflict_on_duplicate(e, format!("term slug '{}' already exists", term.slug))
        })?;
        if !updated {
            return Err(ContentError::not_found("term"));
        }
        Ok(term)
    }

    /// Refused while the term has children or is referenced by an entry
    pub fn delete_term(&self, id: Uuid) -> ContentResult<()> {
        self.term(id)?;
        if self.store.has_children(id)? {
            return Err(ContentError::Conflict("term has child terms".into()));
        }
        if self.entries.references_term(id)? {
            return Err(ContentError::Conflict(
                "term is referenced by existing entries".into(),
            ));
        }

        if !self.store.delete_term(id)? {
            return Err(ContentError::not_found("term"));
        }
        info!(event = %Event::TermDeleted, term_id = %id);
        Ok(())
    }
}
