//! # API Error
//!
//! Maps subsystem errors onto the JSON error envelope:
//! `{ "code": <status>, "message": ..., "error": <machine code>, "field"? }`.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::auth::AuthError;
use crate::content::ContentError;
use crate::schema::SchemaError;

/// Error returned by every handler
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Content(#[from] ContentError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Malformed body, path or query
    #[error("{0}")]
    BadRequest(String),
}

/// Error body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: u16,
    pub message: String,
    pub error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        let code = match self {
            ApiError::Auth(e) => e.status_code(),
            ApiError::Content(e) => e.status_code(),
            ApiError::Schema(e) => e.status_code(),
            ApiError::BadRequest(_) => 400,
        };
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Auth(e) => e.code(),
            ApiError::Content(e) => e.code(),
            ApiError::Schema(e) => e.code(),
            ApiError::BadRequest(_) => "MATTER_BAD_REQUEST",
        }
    }

    /// Offending field path, for validation failures
    pub fn field(&self) -> Option<&str> {
        match self {
            ApiError::Schema(e) | ApiError::Content(ContentError::Schema(e)) => e.field(),
            _ => None,
        }
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            code: self.status().as_u16(),
            message: self.to_string(),
            error: self.code(),
            field: self.field().map(str::to_string),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(code = self.code(), status = status.as_u16(), error = %self, "request failed");
        }
        (status, Json(self.body())).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SystemError;
    use crate::schema::ValidationError;

    #[test]
    fn test_validation_error_carries_field() {
        let err: ApiError =
            ContentError::from(SchemaError::from(ValidationError::missing("seo.title"))).into();
        let body = err.body();

        assert_eq!(body.code, 400);
        assert_eq!(body.error, "MATTER_SCHEMA_VALIDATION_FAILED");
        assert_eq!(body.field.as_deref(), Some("seo.title"));
    }

    #[test]
    fn test_system_errors_stay_server_side() {
        let err: ApiError =
            SchemaError::from(SystemError::ResolverUnavailable("down".into())).into();
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(err.field().is_none());

        let err: ApiError = ContentError::from(SystemError::Timeout { budget_ms: 5 }).into();
        assert_eq!(err.status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn test_auth_errors() {
        let err: ApiError = AuthError::AdminRequired.into();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
        assert_eq!(err.body().error, "MATTER_AUTH_ADMIN_REQUIRED");
    }
}
