//! # Content Module
//!
//! Entries pinned to a schema version, and comments on them.

pub mod comment;
pub mod entry;
pub mod errors;
pub mod service;
pub mod store;

pub use comment::{
    Comment, CommentService, CommentWithAuthor, CreateCommentRequest, UpdateCommentRequest,
    COMMENT_PAGE_DEFAULT, MAX_COMMENT_LEN,
};
pub use entry::{
    page_limit, BaseMeta, CreateEntryRequest, Entry, EntryFilter, Page, UpdateEntryRequest,
    ENTRY_PAGE_DEFAULT, PAGE_MAX,
};
pub use errors::{ContentError, ContentResult};
pub use service::EntryService;
pub use store::{CommentStore, EntryStore, InMemoryCommentStore, InMemoryEntryStore};
