//! # Taxonomy Module
//!
//! Classification axes and their terms. The store doubles as the term
//! resolver consulted by the validation engine.

pub mod service;
pub mod store;
pub mod types;

pub use service::{TaxonomyService, MAX_NAME_LEN};
pub use store::{InMemoryTaxonomyStore, TaxonomyStore};
pub use types::{
    CreateTaxonomyRequest, CreateTermRequest, Taxonomy, Term, UpdateTaxonomyRequest,
    UpdateTermRequest,
};
