//! Best-effort search synchronisation with bounded retries.
//!
//! Sync runs on a spawned task and never reports back to the writer.
//! Each attempt that fails is retried after a linearly growing delay
//! (1s, 2s, ...); once attempts run out the failure is logged and dropped.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use super::document::SearchDocument;
use super::index::{SearchError, SearchIndex};
use crate::content::Entry;
use crate::observability::Event;

/// Retry schedule for sync attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Delay after the first failure; the n-th failure waits n times this
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Delay before attempt `attempt + 1`, for a zero-based failed `attempt`
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * (attempt + 1)
    }
}

/// Fire-and-forget bridge from entry writes to the search index
#[derive(Clone)]
pub struct SearchSync {
    index: Option<Arc<dyn SearchIndex>>,
    policy: RetryPolicy,
}

impl SearchSync {
    pub fn new(index: Arc<dyn SearchIndex>, policy: RetryPolicy) -> Self {
        Self {
            index: Some(index),
            policy,
        }
    }

    /// A sync that drops every request
    pub fn disabled() -> Self {
        Self {
            index: None,
            policy: RetryPolicy::default(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.index.is_some()
    }

    /// Queue an upsert of `entry` without waiting for it.
    pub fn sync_entry(&self, entry: &Entry) {
        if self.index.is_none() {
            return;
        }
        let this = self.clone();
        let doc = SearchDocument::from_entry(entry);
        spawn_detached(async move {
            this.upsert_now(doc).await;
        });
    }

    /// Queue removal of an entry without waiting for it.
    pub fn delete_entry(&self, entry_id: &str) {
        if self.index.is_none() {
            return;
        }
        let this = self.clone();
        let id = entry_id.to_string();
        spawn_detached(async move {
            this.remove_now(id).await;
        });
    }

    /// Upsert with retries. Returns whether the index accepted the document.
    pub async fn upsert_now(&self, doc: SearchDocument) -> bool {
        let Some(index) = &self.index else {
            return false;
        };
        let id = doc.id.clone();
        self.with_retries("upsert", &id, || index.upsert(doc.clone())).await
    }

    /// Remove with retries. Returns whether the index confirmed removal.
    pub async fn remove_now(&self, id: String) -> bool {
        let Some(index) = &self.index else {
            return false;
        };
        self.with_retries("remove", &id, || index.remove(&id)).await
    }

    async fn with_retries<F, Fut>(&self, op: &'static str, id: &str, mut f: F) -> bool
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<(), SearchError>>,
    {
        let attempts = self.policy.max_attempts.max(1);
        for attempt in 0..attempts {
            match f().await {
                Ok(()) => {
                    debug!(event = %Event::SearchSyncComplete, op, entry_id = %id, attempt = attempt + 1);
                    return true;
                }
                Err(e) if attempt + 1 < attempts => {
                    let delay = self.policy.delay_after(attempt);
                    warn!(
                        event = %Event::SearchSyncRetry,
                        op,
                        entry_id = %id,
                        attempt = attempt + 1,
                        max_attempts = attempts,
                        "search sync failed, retrying in {delay:?}: {e}"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    error!(
                        event = %Event::SearchSyncGaveUp,
                        op,
                        entry_id = %id,
                        attempts,
                        error = %e,
                        "search sync giving up"
                    );
                }
            }
        }
        false
    }
}

fn spawn_detached<F>(fut: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(fut);
        }
        Err(_) => info!("no async runtime, search sync skipped"),
    }
}
