//! Search index collaborator

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use thiserror::Error;

use super::document::SearchDocument;

/// Errors reported by a search index
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("search index unavailable: {0}")]
    Unavailable(String),

    #[error("search index rejected document: {0}")]
    Rejected(String),
}

/// External full-text index
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Insert or replace a document
    async fn upsert(&self, doc: SearchDocument) -> Result<(), SearchError>;

    /// Remove a document; removing a missing id is not an error
    async fn remove(&self, id: &str) -> Result<(), SearchError>;
}

/// In-process index, used when no external index is configured and in tests
#[derive(Debug, Default)]
pub struct InMemorySearchIndex {
    docs: RwLock<HashMap<String, SearchDocument>>,
}

impl InMemorySearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<SearchDocument> {
        self.docs.read().ok().and_then(|docs| docs.get(id).cloned())
    }

    pub fn len(&self) -> usize {
        self.docs.read().map(|docs| docs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SearchIndex for InMemorySearchIndex {
    async fn upsert(&self, doc: SearchDocument) -> Result<(), SearchError> {
        let mut docs = self
            .docs
            .write()
            .map_err(|_| SearchError::Unavailable("lock poisoned".into()))?;
        docs.insert(doc.id.clone(), doc);
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<(), SearchError> {
        let mut docs = self
            .docs
            .write()
            .map_err(|_| SearchError::Unavailable("lock poisoned".into()))?;
        docs.remove(id);
        Ok(())
    }
}
