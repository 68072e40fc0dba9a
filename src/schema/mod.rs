//! Schema subsystem for matter
//!
//! Schemas are runtime-defined, immutable and versioned. The validator
//! turns a schema's field tree into a type-checker for attribute documents.
//!
//! # Design Principles
//!
//! - A stored schema version never changes
//! - Versions per key start at 1 and never skip
//! - Validation is fail-fast and deterministic
//! - Reference lookups are bounded by a deadline
//! - Term store failures are system errors, never "not found"

mod errors;
mod registry;
mod store;
mod types;
mod validator;

pub use errors::{SchemaError, SchemaResult, ValidationError, ValidationErrorKind};
pub use registry::SchemaRegistry;
pub use store::{InMemorySchemaStore, SchemaStore};
pub use types::{check_definition, FieldDef, FieldType, Schema, MAX_SCHEMA_NAME_LEN};
pub use validator::{SchemaValidator, TermResolver, DEFAULT_VALIDATION_BUDGET};
