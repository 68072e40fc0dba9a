//! Search synchronisation
//!
//! Entries are projected to plain-text documents and pushed to a search
//! index in the background. Query execution belongs to the index itself.

mod document;
mod index;
mod sync;

pub use document::{extract_strings, strip_markdown, SearchDocument};
pub use index::{InMemorySearchIndex, SearchError, SearchIndex};
pub use sync::{RetryPolicy, SearchSync};
