//! # Auth Errors
//!
//! Error types for the authentication module.

use thiserror::Error;

use crate::core::StoreError;

/// Result type for auth operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Authentication and authorization errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    // ==================
    // Authentication Errors
    // ==================

    /// No credentials were presented
    #[error("Authentication required")]
    AuthenticationRequired,

    /// Token unknown or expired
    #[error("Session expired or invalid")]
    SessionInvalid,

    /// Session has been revoked
    #[error("Session has been revoked")]
    SessionRevoked,

    // ==================
    // Authorization Errors
    // ==================

    /// Caller lacks the required role
    #[error("Admin role required")]
    AdminRequired,

    // ==================
    // User Errors
    // ==================

    #[error("User not found")]
    UserNotFound,

    /// Rejected social profile or profile update
    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    // ==================
    // Internal Errors
    // ==================

    /// Storage operation failed
    #[error("Storage error: {0}")]
    StorageError(String),
}

impl AuthError {
    /// Machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::AuthenticationRequired => "MATTER_AUTH_REQUIRED",
            AuthError::SessionInvalid => "MATTER_AUTH_SESSION_INVALID",
            AuthError::SessionRevoked => "MATTER_AUTH_SESSION_REVOKED",
            AuthError::AdminRequired => "MATTER_AUTH_ADMIN_REQUIRED",
            AuthError::UserNotFound => "MATTER_AUTH_USER_NOT_FOUND",
            AuthError::InvalidProfile(_) => "MATTER_AUTH_INVALID_PROFILE",
            AuthError::StorageError(_) => "MATTER_AUTH_STORAGE",
        }
    }

    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request
            AuthError::InvalidProfile(_) => 400,

            // 401 Unauthorized
            AuthError::AuthenticationRequired => 401,
            AuthError::SessionInvalid => 401,
            AuthError::SessionRevoked => 401,

            // 403 Forbidden
            AuthError::AdminRequired => 403,

            // 404 Not Found
            AuthError::UserNotFound => 404,

            // 500 Internal Server Error
            AuthError::StorageError(_) => 500,
        }
    }

    /// Returns whether this error should be logged at warn level
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        AuthError::StorageError(err.to_string())
    }
}
