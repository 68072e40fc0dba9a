//! Comments on entries. Flat, no threading.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::entry::{page_limit, Page};
use super::errors::{ContentError, ContentResult};
use super::store::{CommentStore, EntryStore};
use crate::auth::{AuthContext, UserPublic, UserService};
use crate::core::SystemError;
use crate::observability::Event;

pub const COMMENT_PAGE_DEFAULT: usize = 50;

/// Longest accepted comment, in characters
pub const MAX_COMMENT_LEN: usize = 5000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub entry_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(entry_id: Uuid, author_id: Uuid, content: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            entry_id,
            author_id,
            content: content.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Comment joined with its author's public profile. The author is
/// `None` when the user no longer exists.
#[derive(Debug, Clone, Serialize)]
pub struct CommentWithAuthor {
    #[serde(flatten)]
    pub comment: Comment,
    pub author: Option<UserPublic>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCommentRequest {
    pub entry_id: Uuid,
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCommentRequest {
    pub content: String,
}

fn check_content(content: &str) -> ContentResult<String> {
    let content = content.trim();
    if content.is_empty() || content.chars().count() > MAX_COMMENT_LEN {
        return Err(ContentError::invalid(format!(
            "comment must be 1-{} characters",
            MAX_COMMENT_LEN
        )));
    }
    Ok(content.to_string())
}

#[derive(Clone)]
pub struct CommentService {
    comments: Arc<dyn CommentStore>,
    entries: Arc<dyn EntryStore>,
    users: UserService,
}

impl CommentService {
    pub fn new(
        comments: Arc<dyn CommentStore>,
        entries: Arc<dyn EntryStore>,
        users: UserService,
    ) -> Self {
        Self {
            comments,
            entries,
            users,
        }
    }

    pub fn create(&self, actor: &AuthContext, req: CreateCommentRequest) -> ContentResult<Comment> {
        let content = check_content(&req.content)?;
        if self.entries.get(req.entry_id)?.is_none() {
            return Err(ContentError::not_found("entry"));
        }

        let comment = Comment::new(req.entry_id, actor.user_id, content);
        self.comments.insert(&comment)?;
        info!(
            event = %Event::CommentCreated,
            comment_id = %comment.id,
            entry_id = %comment.entry_id
        );
        Ok(comment)
    }

    /// Oldest first, each with its author
    pub fn list_by_entry(
        &self,
        entry_id: Uuid,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> ContentResult<Page<CommentWithAuthor>> {
        let limit = page_limit(limit, COMMENT_PAGE_DEFAULT);
        let offset = offset.unwrap_or(0);
        let (comments, total) = self.comments.list_by_entry(entry_id, limit, offset)?;

        let mut items = Vec::with_capacity(comments.len());
        for comment in comments {
            let author = self
                .users
                .public(comment.author_id)
                .map_err(|e| SystemError::StoreUnavailable(e.to_string()))?;
            items.push(CommentWithAuthor { comment, author });
        }

        Ok(Page {
            items,
            total,
            limit,
            offset,
        })
    }

    /// Only the author may edit
    pub fn update(
        &self,
        actor: &AuthContext,
        id: Uuid,
        req: UpdateCommentRequest,
    ) -> ContentResult<Comment> {
        let mut comment = self
            .comments
            .get(id)?
            .ok_or_else(|| ContentError::not_found("comment"))?;
        if comment.author_id != actor.user_id {
            return Err(ContentError::Forbidden(
                "only the author can edit a comment".into(),
            ));
        }

        comment.content = check_content(&req.content)?;
        comment.updated_at = Utc::now();
        if !self.comments.update(&comment)? {
            return Err(ContentError::not_found("comment"));
        }
        Ok(comment)
    }

    /// The author or an admin may delete
    pub fn delete(&self, actor: &AuthContext, id: Uuid) -> ContentResult<()> {
        let comment = self
            .comments
            .get(id)?
            .ok_or_else(|| ContentError::not_found("comment"))?;
        if !actor.can_modify(comment.author_id) {
            return Err(ContentError::Forbidden(
                "not authorized to delete this comment".into(),
            ));
        }

        self.comments.delete(id)?;
        info!(event = %Event::CommentDeleted, comment_id = %id);
        Ok(())
    }
}
