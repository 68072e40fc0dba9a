//! # Application State
//!
//! Services shared by all route handlers through the `State` extractor.

use std::sync::Arc;

use crate::auth::{
    InMemorySessionRepository, InMemoryUserRepository, SessionConfig, SessionManager, UserService,
};
use crate::config::Config;
use crate::content::{CommentService, EntryService, InMemoryCommentStore, InMemoryEntryStore};
use crate::schema::{InMemorySchemaStore, SchemaRegistry};
use crate::search::{InMemorySearchIndex, SearchSync};
use crate::taxonomy::{InMemoryTaxonomyStore, TaxonomyService};

#[derive(Clone)]
pub struct AppState {
    pub schemas: SchemaRegistry,
    pub entries: EntryService,
    pub comments: CommentService,
    pub taxonomies: TaxonomyService,
    pub users: UserService,
    pub sessions: SessionManager,
}

impl AppState {
    /// Wire every service over in-memory stores
    pub fn in_memory(config: &Config) -> Self {
        let schemas = SchemaRegistry::new(Arc::new(InMemorySchemaStore::new()));
        let entry_store = Arc::new(InMemoryEntryStore::new());
        let comment_store = Arc::new(InMemoryCommentStore::new());
        let taxonomy_store = Arc::new(InMemoryTaxonomyStore::new());

        let search = if config.search.enabled {
            SearchSync::new(
                Arc::new(InMemorySearchIndex::new()),
                config.search.retry_policy(),
            )
        } else {
            SearchSync::disabled()
        };

        let users = UserService::new(
            Arc::new(InMemoryUserRepository::new()),
            config.auth.admin_email.clone(),
        );
        let sessions = SessionManager::new(
            SessionConfig {
                ttl: chrono::Duration::hours(i64::from(config.auth.session_ttl_hours)),
            },
            Arc::new(InMemorySessionRepository::new()),
        );

        let entries = EntryService::new(
            schemas.clone(),
            entry_store.clone(),
            comment_store.clone(),
            taxonomy_store.clone(),
            search,
        )
        .with_validation_budget(config.validation_budget());

        Self {
            schemas,
            entries,
            comments: CommentService::new(comment_store, entry_store.clone(), users.clone()),
            taxonomies: TaxonomyService::new(taxonomy_store, entry_store),
            users,
            sessions,
        }
    }
}
