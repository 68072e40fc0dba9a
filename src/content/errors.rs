//! Content error types
//!
//! Shared by entries, comments, taxonomies and terms.

use thiserror::Error;

use crate::core::{StoreError, SystemError};
use crate::schema::SchemaError;

/// Result type for content operations
pub type ContentResult<T> = Result<T, ContentError>;

/// Errors raised by the content services
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Forbidden(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    System(#[from] SystemError),
}

impl ContentError {
    pub fn not_found(what: impl Into<String>) -> Self {
        ContentError::NotFound(what.into())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        ContentError::InvalidInput(msg.into())
    }

    /// Machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            ContentError::NotFound(_) => "MATTER_NOT_FOUND",
            ContentError::Conflict(_) => "MATTER_CONFLICT",
            ContentError::InvalidInput(_) => "MATTER_INVALID_INPUT",
            ContentError::Forbidden(_) => "MATTER_FORBIDDEN",
            ContentError::Schema(e) => e.code(),
            ContentError::System(e) => e.code(),
        }
    }

    /// HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            ContentError::NotFound(_) => 404,
            ContentError::Conflict(_) => 409,
            ContentError::InvalidInput(_) => 400,
            ContentError::Forbidden(_) => 403,
            ContentError::Schema(e) => e.status_code(),
            ContentError::System(e) => e.status_code(),
        }
    }
}

impl From<StoreError> for ContentError {
    fn from(err: StoreError) -> Self {
        ContentError::System(err.into())
    }
}
