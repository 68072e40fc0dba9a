//! Core Error Types
//!
//! Failures raised by persistence collaborators and the system-level
//! errors they turn into once they cross a service boundary.

use thiserror::Error;

/// Result type for persistence collaborators
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for operations that can only fail for system reasons
pub type SystemResult<T> = Result<T, SystemError>;

/// Errors reported by a store implementation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write
    #[error("duplicate key: {0}")]
    Duplicate(String),

    /// The backing store could not be reached
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// An in-process lock was poisoned by a panicking writer
    #[error("lock poisoned: {0}")]
    Poisoned(&'static str),

    /// The caller's deadline passed before the store could answer
    #[error("deadline exceeded")]
    DeadlineExceeded,
}

impl StoreError {
    /// Whether this error is a uniqueness violation
    pub fn is_duplicate(&self) -> bool {
        matches!(self, StoreError::Duplicate(_))
    }
}

/// Errors that are never the caller's fault.
///
/// These must stay distinguishable from validation failures all the way to
/// the HTTP boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SystemError {
    /// Persistence layer failed or is unreachable
    #[error("persistence layer unavailable: {0}")]
    StoreUnavailable(String),

    /// Term store failed or is unreachable
    #[error("term store unavailable: {0}")]
    ResolverUnavailable(String),

    /// A deadline-bounded operation ran out of time
    #[error("operation exceeded its {budget_ms}ms budget")]
    Timeout { budget_ms: u64 },
}

impl SystemError {
    /// Machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            SystemError::StoreUnavailable(_) => "MATTER_STORE_UNAVAILABLE",
            SystemError::ResolverUnavailable(_) => "MATTER_TERM_STORE_UNAVAILABLE",
            SystemError::Timeout { .. } => "MATTER_TIMEOUT",
        }
    }

    /// HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            SystemError::StoreUnavailable(_) => 500,
            SystemError::ResolverUnavailable(_) => 503,
            SystemError::Timeout { .. } => 504,
        }
    }
}

impl From<StoreError> for SystemError {
    fn from(err: StoreError) -> Self {
        SystemError::StoreUnavailable(err.to_string())
    }
}
