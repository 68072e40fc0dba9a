//! Schema error types
//!
//! Error codes:
//! - MATTER_SCHEMA_VALIDATION_FAILED (400)
//! - MATTER_SCHEMA_INVALID_DEFINITION (400)
//! - MATTER_UNKNOWN_SCHEMA (404)
//! - MATTER_SCHEMA_VERSION_CONFLICT (409)
//! - system codes from [`SystemError`]

use std::fmt;

use thiserror::Error;

use crate::core::SystemError;

/// Why a document was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Required field absent or null
    MissingRequiredField,
    /// Value has the wrong JSON type
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },
    /// Value has the right JSON type but the wrong shape
    InvalidFormat { expected: &'static str },
    /// Term identifier does not parse
    InvalidReferenceFormat { value: String },
    /// Term identifier parses but no such term exists
    ReferenceNotFound { term_id: String },
    /// Term exists in another taxonomy
    WrongTaxonomy {
        term_id: String,
        expected: String,
        actual: String,
    },
}

impl ValidationErrorKind {
    /// Machine-readable reason code
    pub fn code(&self) -> &'static str {
        match self {
            ValidationErrorKind::MissingRequiredField => "MISSING_REQUIRED_FIELD",
            ValidationErrorKind::TypeMismatch { .. } => "TYPE_MISMATCH",
            ValidationErrorKind::InvalidFormat { .. } => "INVALID_FORMAT",
            ValidationErrorKind::InvalidReferenceFormat { .. } => "INVALID_REFERENCE_FORMAT",
            ValidationErrorKind::ReferenceNotFound { .. } => "REFERENCE_NOT_FOUND",
            ValidationErrorKind::WrongTaxonomy { .. } => "WRONG_TAXONOMY",
        }
    }
}

/// A field-addressed validation failure.
///
/// `field` is a path such as `seo.title` or `tags[2]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub kind: ValidationErrorKind,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, kind: ValidationErrorKind) -> Self {
        Self {
            field: field.into(),
            kind,
        }
    }

    pub fn missing(field: impl Into<String>) -> Self {
        Self::new(field, ValidationErrorKind::MissingRequiredField)
    }

    pub fn type_mismatch(
        field: impl Into<String>,
        expected: &'static str,
        actual: &'static str,
    ) -> Self {
        Self::new(field, ValidationErrorKind::TypeMismatch { expected, actual })
    }

    pub fn invalid_format(field: impl Into<String>, expected: &'static str) -> Self {
        Self::new(field, ValidationErrorKind::InvalidFormat { expected })
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ValidationErrorKind::MissingRequiredField => {
                write!(f, "field '{}' is required", self.field)
            }
            ValidationErrorKind::TypeMismatch { expected, actual } => write!(
                f,
                "field '{}': expected {}, got {}",
                self.field, expected, actual
            ),
            ValidationErrorKind::InvalidFormat { expected } => {
                write!(f, "field '{}' must be {}", self.field, expected)
            }
            ValidationErrorKind::InvalidReferenceFormat { value } => write!(
                f,
                "field '{}': '{}' is not a valid term id",
                self.field, value
            ),
            ValidationErrorKind::ReferenceNotFound { term_id } => {
                write!(f, "field '{}': term '{}' not found", self.field, term_id)
            }
            ValidationErrorKind::WrongTaxonomy {
                term_id,
                expected,
                actual,
            } => write!(
                f,
                "field '{}': term '{}' belongs to taxonomy '{}', expected '{}'",
                self.field, term_id, actual, expected
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Errors raised by the schema subsystem
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("validation failed: {0}")]
    Validation(ValidationError),

    #[error("invalid schema definition: {0}")]
    InvalidDefinition(String),

    #[error("schema '{0}' not found")]
    UnknownSchema(String),

    #[error("schema '{key}' version {version} was taken by a concurrent writer")]
    VersioningConflict { key: String, version: u32 },

    #[error(transparent)]
    System(#[from] SystemError),
}

impl SchemaError {
    /// Machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaError::Validation(_) => "MATTER_SCHEMA_VALIDATION_FAILED",
            SchemaError::InvalidDefinition(_) => "MATTER_SCHEMA_INVALID_DEFINITION",
            SchemaError::UnknownSchema(_) => "MATTER_UNKNOWN_SCHEMA",
            SchemaError::VersioningConflict { .. } => "MATTER_SCHEMA_VERSION_CONFLICT",
            SchemaError::System(e) => e.code(),
        }
    }

    /// HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            SchemaError::Validation(_) | SchemaError::InvalidDefinition(_) => 400,
            SchemaError::UnknownSchema(_) => 404,
            SchemaError::VersioningConflict { .. } => 409,
            SchemaError::System(e) => e.status_code(),
        }
    }

    /// Field path when this is a validation failure
    pub fn field(&self) -> Option<&str> {
        match self {
            SchemaError::Validation(v) => Some(&v.field),
            _ => None,
        }
    }

    /// Whether the caller's input caused this error
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}

impl From<ValidationError> for SchemaError {
    fn from(err: ValidationError) -> Self {
        SchemaError::Validation(err)
    }
}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;
