//! Entry and comment persistence

use std::sync::RwLock;

use uuid::Uuid;

use super::comment::Comment;
use super::entry::{Entry, EntryFilter};
use crate::core::{StoreError, StoreResult};

/// Entry repository trait
pub trait EntryStore: Send + Sync {
    fn insert(&self, entry: &Entry) -> StoreResult<()>;

    fn get(&self, id: Uuid) -> StoreResult<Option<Entry>>;

    /// Replace a stored entry. Returns false if it no longer exists.
    fn update(&self, entry: &Entry) -> StoreResult<bool>;

    /// Returns false if nothing was deleted
    fn delete(&self, id: Uuid) -> StoreResult<bool>;

    /// Matching entries, newest first, sliced by `limit`/`offset`, plus
    /// the total number of matches.
    fn list(
        &self,
        filter: &EntryFilter,
        limit: usize,
        offset: usize,
    ) -> StoreResult<(Vec<Entry>, usize)>;

    /// Whether any entry's attributes mention `term_id`
    fn references_term(&self, term_id: Uuid) -> StoreResult<bool>;
}

/// Comment repository trait
pub trait CommentStore: Send + Sync {
    fn insert(&self, comment: &Comment) -> StoreResult<()>;

    fn get(&self, id: Uuid) -> StoreResult<Option<Comment>>;

    fn update(&self, comment: &Comment) -> StoreResult<bool>;

    fn delete(&self, id: Uuid) -> StoreResult<bool>;

    /// Comments on one entry, oldest first, plus the total count
    fn list_by_entry(
        &self,
        entry_id: Uuid,
        limit: usize,
        offset: usize,
    ) -> StoreResult<(Vec<Comment>, usize)>;

    /// Remove every comment on an entry, returning how many went
    fn delete_by_entry(&self, entry_id: Uuid) -> StoreResult<usize>;
}

/// In-memory entry store
#[derive(Debug, Default)]
pub struct InMemoryEntryStore {
    entries: RwLock<Vec<Entry>>,
}

impl InMemoryEntryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EntryStore for InMemoryEntryStore {
    fn insert(&self, entry: &Entry) -> StoreResult<()> {
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned("entries"))?;
        if entries.iter().any(|e| e.id == entry.id) {
            return Err(StoreError::Duplicate(entry.id.to_string()));
        }
        entries.push(entry.clone());
        Ok(())
    }

    fn get(&self, id: Uuid) -> StoreResult<Option<Entry>> {
        let entries = self.entries.read().map_err(|_| StoreError::Poisoned("entries"))?;
        Ok(entries.iter().find(|e| e.id == id).cloned())
    }

    fn update(&self, entry: &Entry) -> StoreResult<bool> {
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned("entries"))?;
        match entries.iter_mut().find(|e| e.id == entry.id) {
            Some(existing) => {
                *existing = entry.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned("entries"))?;
        let before = entries.len();
        entries.retain(|e| e.id != id);
        Ok(entries.len() != before)
    }

    fn list(
        &self,
        filter: &EntryFilter,
        limit: usize,
        offset: usize,
    ) -> StoreResult<(Vec<Entry>, usize)> {
        let entries = self.entries.read().map_err(|_| StoreError::Poisoned("entries"))?;

        let mut matching: Vec<&Entry> = entries
            .iter()
            .filter(|e| {
                filter
                    .schema_key
                    .as_deref()
                    .map_or(true, |k| k.is_empty() || e.schema_key == k)
            })
            .filter(|e| filter.draft.map_or(true, |d| e.base.draft == d))
            .collect();
        matching.sort_by(|a, b| b.base.created_at.cmp(&a.base.created_at));

        let total = matching.len();
        let page = matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();
        Ok((page, total))
    }

    fn references_term(&self, term_id: Uuid) -> StoreResult<bool> {
        let entries = self.entries.read().map_err(|_| StoreError::Poisoned("entries"))?;
        Ok(entries.iter().any(|e| e.references_term(term_id)))
    }
}

/// In-memory comment store
#[derive(Debug, Default)]
pub struct InMemoryCommentStore {
    comments: RwLock<Vec<Comment>>,
}

impl InMemoryCommentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CommentStore for InMemoryCommentStore {
    fn insert(&self, comment: &Comment) -> StoreResult<()> {
        let mut comments = self.comments.write().map_err(|_| StoreError::Poisoned("comments"))?;
        comments.push(comment.clone());
        Ok(())
    }

    fn get(&self, id: Uuid) -> StoreResult<Option<Comment>> {
        let comments = self.comments.read().map_err(|_| StoreError::Poisoned("comments"))?;
        Ok(comments.iter().find(|c| c.id == id).cloned())
    }

    fn update(&self, comment: &Comment) -> StoreResult<bool> {
        let mut comments = self.comments.write().map_err(|_| StoreError::Poisoned("comments"))?;
        match comments.iter_mut().find(|c| c.id == comment.id) {
            Some(existing) => {
                *existing = comment.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let mut comments = self.comments.write().map_err(|_| StoreError::Poisoned("comments"))?;
        let before = comments.len();
        comments.retain(|c| c.id != id);
        Ok(comments.len() != before)
    }

    fn list_by_entry(
        &self,
        entry_id: Uuid,
        limit: usize,
        offset: usize,
    ) -> StoreResult<(Vec<Comment>, usize)> {
        let comments = self.comments.read().map_err(|_| StoreError::Poisoned("comments"))?;

        let mut matching: Vec<&Comment> =
            comments.iter().filter(|c| c.entry_id == entry_id).collect();
        matching.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        let total = matching.len();
        let page = matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();
        Ok((page, total))
    }

    fn delete_by_entry(&self, entry_id: Uuid) -> StoreResult<usize> {
        let mut comments = self.comments.write().map_err(|_| StoreError::Poisoned("comments"))?;
        let before = comments.len();
        comments.retain(|c| c.entry_id != entry_id);
        Ok(before - comments.len())
    }
}
