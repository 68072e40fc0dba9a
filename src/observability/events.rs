//! Observable lifecycle events
//!
//! Every notable state change is logged with an `event` field taken from
//! this enum so log pipelines can match on a stable name.

use std::fmt;

/// Observable events in matter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Boot & Lifecycle
    /// Startup begins
    BootStart,
    /// Configuration loaded and validated
    ConfigLoaded,
    /// Server bound and accepting requests
    Serving,

    // Schemas
    /// New schema version persisted
    SchemaCreated,
    /// Version race lost, retrying with a fresh read
    SchemaVersionRetry,
    /// All versions of a schema removed
    SchemaDeleted,

    // Validation
    /// Document rejected by the validator
    ValidationRejected,

    // Entries
    EntryCreated,
    EntryUpdated,
    EntryDeleted,

    // Taxonomies
    TaxonomyCreated,
    TaxonomyDeleted,
    TermCreated,
    TermDeleted,

    // Comments
    CommentCreated,
    CommentDeleted,

    // Users
    UserCreated,
    SessionCreated,
    SessionRevoked,

    // Search sync
    /// Sync attempt failed, will retry
    SearchSyncRetry,
    /// Entry indexed or removed from the index
    SearchSyncComplete,
    /// All sync attempts failed
    SearchSyncGaveUp,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::BootStart => "MATTER_STARTUP_BEGIN",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::Serving => "MATTER_SERVING",

            Event::SchemaCreated => "SCHEMA_CREATED",
            Event::SchemaVersionRetry => "SCHEMA_VERSION_RETRY",
            Event::SchemaDeleted => "SCHEMA_DELETED",

            Event::ValidationRejected => "VALIDATION_REJECTED",

            Event::EntryCreated => "ENTRY_CREATED",
            Event::EntryUpdated => "ENTRY_UPDATED",
            Event::EntryDeleted => "ENTRY_DELETED",

            Event::TaxonomyCreated => "TAXONOMY_CREATED",
            Event::TaxonomyDeleted => "TAXONOMY_DELETED",
            Event::TermCreated => "TERM_CREATED",
            Event::TermDeleted => "TERM_DELETED",

            Event::CommentCreated => "COMMENT_CREATED",
            Event::CommentDeleted => "COMMENT_DELETED",

            Event::UserCreated => "USER_CREATED",
            Event::SessionCreated => "SESSION_CREATED",
            Event::SessionRevoked => "SESSION_REVOKED",

            Event::SearchSyncRetry => "SEARCH_SYNC_RETRY",
            Event::SearchSyncComplete => "SEARCH_SYNC_COMPLETE",
            Event::SearchSyncGaveUp => "SEARCH_SYNC_GAVE_UP",
        }
    }

    /// Returns true if the event signals lost work
    pub fn is_failure(&self) -> bool {
        matches!(self, Event::SearchSyncGaveUp)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
