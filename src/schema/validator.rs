//! Recursive document validation against a schema's field tree
//!
//! Validation semantics:
//! - Fields are checked in declaration order, depth-first
//! - The first violation aborts the check (fail-fast)
//! - Absent optional fields are skipped, defaults are never injected
//! - Explicit null is accepted for optional fields only
//! - Undeclared keys are ignored
//! - Taxonomy references are resolved through a [`TermResolver`]
//!
//! The validator never mutates the schema or the document. It holds no
//! state between calls, so one instance may be shared freely.

use std::time::{Duration, Instant};

use chrono::DateTime;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::errors::{SchemaResult, ValidationError, ValidationErrorKind};
use super::types::{FieldDef, FieldType, Schema};
use crate::core::{StoreError, StoreResult, SystemError};
use crate::taxonomy::Term;

/// Budget for one whole validation call
pub const DEFAULT_VALIDATION_BUDGET: Duration = Duration::from_secs(5);

/// Read-only term lookup used for taxonomy references.
///
/// `Ok(None)` means the term does not exist. `Err` means the term store
/// could not answer and is reported as a system error.
///
/// Implementations must not block past `deadline`: once it passes they
/// return `StoreError::DeadlineExceeded`, which the validator reports as a
/// timeout.
pub trait TermResolver: Send + Sync {
    fn term_by_id(&self, id: Uuid, deadline: Instant) -> StoreResult<Option<Term>>;
}

/// Schema validator that type-checks attribute documents.
pub struct SchemaValidator<'a> {
    resolver: &'a dyn TermResolver,
    budget: Duration,
}

impl<'a> SchemaValidator<'a> {
    /// Creates a validator with the default five second budget.
    pub fn new(resolver: &'a dyn TermResolver) -> Self {
        Self {
            resolver,
            budget: DEFAULT_VALIDATION_BUDGET,
        }
    }

    /// Overrides the per-call deadline.
    pub fn with_budget(mut self, budget: Duration) -> Self {
        self.budget = budget;
        self
    }

    /// Validates entry attributes against `schema`.
    ///
    /// # Errors
    ///
    /// - `SchemaError::Validation` for the first field that violates the schema
    /// - `SchemaError::System` when the term store fails or the budget runs out
    pub fn validate_entry(&self, schema: &Schema, data: &Map<String, Value>) -> SchemaResult<()> {
        let deadline = Deadline::start(self.budget);
        self.validate_fields(&schema.fields, data, "", &deadline)
    }

    /// Validates an arbitrary JSON value, which must be an object.
    pub fn validate_document(&self, schema: &Schema, document: &Value) -> SchemaResult<()> {
        let data = document
            .as_object()
            .ok_or_else(|| ValidationError::type_mismatch("$root", "object", json_type_name(document)))?;
        self.validate_entry(schema, data)
    }

    fn validate_fields(
        &self,
        fields: &[FieldDef],
        data: &Map<String, Value>,
        path_prefix: &str,
        deadline: &Deadline,
    ) -> SchemaResult<()> {
        for field in fields {
            let field_path = make_path(path_prefix, &field.key);

            match data.get(&field.key) {
                None | Some(Value::Null) => {
                    if field.required {
                        return Err(ValidationError::missing(field_path).into());
                    }
                }
                Some(value) => self.validate_value(field, value, &field_path, deadline)?,
            }
        }

        Ok(())
    }

    fn validate_value(
        &self,
        field: &FieldDef,
        value: &Value,
        field_path: &str,
        deadline: &Deadline,
    ) -> SchemaResult<()> {
        match field.field_type {
            FieldType::String => {
                if !value.is_string() {
                    return Err(type_error(field_path, field.field_type, value));
                }
            }
            FieldType::Number => {
                if !value.is_number() {
                    return Err(type_error(field_path, field.field_type, value));
                }
            }
            FieldType::Boolean => {
                if !value.is_boolean() {
                    return Err(type_error(field_path, field.field_type, value));
                }
            }
            FieldType::Date => {
                if !value.as_str().is_some_and(is_rfc3339) {
                    return Err(
                        ValidationError::invalid_format(field_path, "an RFC 3339 date-time").into(),
                    );
                }
            }
            FieldType::Object => {
                let obj = value
                    .as_object()
                    .ok_or_else(|| type_error(field_path, field.field_type, value))?;
                // An object without children accepts any shape
                if !field.children.is_empty() {
                    self.validate_fields(&field.children, obj, field_path, deadline)?;
                }
            }
            FieldType::Array => {
                let arr = value
                    .as_array()
                    .ok_or_else(|| type_error(field_path, field.field_type, value))?;

                if let Some(item_type) = &field.item_type {
                    for (i, elem) in arr.iter().enumerate() {
                        let elem_path = format!("{}[{}]", field_path, i);
                        if elem.is_null() {
                            if item_type.required {
                                return Err(ValidationError::missing(elem_path).into());
                            }
                            continue;
                        }
                        self.validate_value(item_type, elem, &elem_path, deadline)?;
                    }
                }
            }
            FieldType::TaxonomyReference => {
                self.validate_reference(field, value, field_path, deadline)?;
            }
        }

        Ok(())
    }

    fn validate_reference(
        &self,
        field: &FieldDef,
        value: &Value,
        field_path: &str,
        deadline: &Deadline,
    ) -> SchemaResult<()> {
        if !field.allow_multiple {
            let raw = value
                .as_str()
                .ok_or_else(|| ValidationError::invalid_format(field_path, "a term id string"))?;
            return self.check_term(field, raw, field_path, deadline);
        }

        let items = value
            .as_array()
            .ok_or_else(|| ValidationError::invalid_format(field_path, "a list of term ids"))?;

        for (i, item) in items.iter().enumerate() {
            let elem_path = format!("{}[{}]", field_path, i);
            let raw = item
                .as_str()
                .ok_or_else(|| ValidationError::invalid_format(elem_path.as_str(), "a term id string"))?;
            self.check_term(field, raw, &elem_path, deadline)?;
        }

        Ok(())
    }

    fn check_term(
        &self,
        field: &FieldDef,
        raw: &str,
        field_path: &str,
        deadline: &Deadline,
    ) -> SchemaResult<()> {
        let id = Uuid::parse_str(raw).map_err(|_| {
            ValidationError::new(
                field_path,
                ValidationErrorKind::InvalidReferenceFormat {
                    value: raw.to_string(),
                },
            )
        })?;

        deadline.check()?;
        let term = self
            .resolver
            .term_by_id(id, deadline.expires_at())
            .map_err(|e| match e {
                StoreError::DeadlineExceeded => deadline.timeout(),
                other => SystemError::ResolverUnavailable(other.to_string()),
            })?;
        deadline.check()?;

        let term = term.ok_or_else(|| {
            ValidationError::new(
                field_path,
                ValidationErrorKind::ReferenceNotFound {
                    term_id: raw.to_string(),
                },
            )
        })?;

        if !field.taxonomy_key.is_empty() && term.taxonomy_key != field.taxonomy_key {
            return Err(ValidationError::new(
                field_path,
                ValidationErrorKind::WrongTaxonomy {
                    term_id: raw.to_string(),
                    expected: field.taxonomy_key.clone(),
                    actual: term.taxonomy_key,
                },
            )
            .into());
        }

        Ok(())
    }
}

/// Wall-clock limit for a single validation call.
struct Deadline {
    expires_at: Instant,
    budget: Duration,
}

impl Deadline {
    fn start(budget: Duration) -> Self {
        let now = Instant::now();
        // Oversized budgets saturate to roughly a year
        let expires_at = now
            .checked_add(budget)
            .unwrap_or_else(|| now + Duration::from_secs(365 * 24 * 3600));
        Self { expires_at, budget }
    }

    fn expires_at(&self) -> Instant {
        self.expires_at
    }

    fn timeout(&self) -> SystemError {
        SystemError::Timeout {
            budget_ms: self.budget.as_millis() as u64,
        }
    }

    fn check(&self) -> Result<(), SystemError> {
        if Instant::now() >= self.expires_at {
            return Err(self.timeout());
        }
        Ok(())
    }
}

/// Returns the JSON type name for error messages.
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Strict RFC 3339: an upper-case `T` separator and `Z` or a numeric
/// offset. chrono alone also takes a space separator and lower-case letters.
fn is_rfc3339(s: &str) -> bool {
    s.as_bytes().get(10) == Some(&b'T')
        && !s.ends_with('z')
        && DateTime::parse_from_rfc3339(s).is_ok()
}

/// Creates a field path from prefix and field name.
fn make_path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", prefix, field)
    }
}

fn type_error(field_path: &str, expected: FieldType, actual: &Value) -> super::errors::SchemaError {
    ValidationError::type_mismatch(field_path, expected.type_name(), json_type_name(actual)).into()
}
