//! Field grammar and schema definitions
//!
//! Supported field types:
//! - string: UTF-8 string
//! - number: integer or floating point
//! - boolean: true / false
//! - date: RFC 3339 date-time string
//! - object: nested mapping, optionally constrained by child fields
//! - array: ordered list, optionally constrained by an item type
//! - taxonomy_reference: one or many term identifiers

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::core::{is_valid_key, MAX_KEY_LEN};

/// Longest accepted schema name
pub const MAX_SCHEMA_NAME_LEN: usize = 100;

/// Supported field types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    Number,
    #[serde(alias = "bool")]
    Boolean,
    Date,
    Object,
    Array,
    #[serde(alias = "taxonomy")]
    TaxonomyReference,
}

impl FieldType {
    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
            FieldType::Object => "object",
            FieldType::Array => "array",
            FieldType::TaxonomyReference => "taxonomy_reference",
        }
    }
}

/// One node of the field grammar.
///
/// `field_type` decides which of `children`, `item_type`, `taxonomy_key`
/// and `allow_multiple` mean anything; the validator ignores the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    pub key: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    /// Authoring hint only, never injected during validation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FieldDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<Box<FieldDef>>,
    /// Empty means any taxonomy
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub taxonomy_key: String,
    #[serde(default)]
    pub allow_multiple: bool,
}

impl FieldDef {
    /// Create an optional field of the given type
    pub fn new(key: impl Into<String>, field_type: FieldType) -> Self {
        let key = key.into();
        Self {
            label: key.clone(),
            key,
            field_type,
            required: false,
            default: None,
            children: Vec::new(),
            item_type: None,
            taxonomy_key: String::new(),
            allow_multiple: false,
        }
    }

    /// Create a required string field
    pub fn required_string(key: impl Into<String>) -> Self {
        Self::new(key, FieldType::String).required()
    }

    /// Create an optional string field
    pub fn optional_string(key: impl Into<String>) -> Self {
        Self::new(key, FieldType::String)
    }

    /// Create an object field with child fields
    pub fn object(key: impl Into<String>, children: Vec<FieldDef>) -> Self {
        Self {
            children,
            ..Self::new(key, FieldType::Object)
        }
    }

    /// Create an array field, optionally typed by `item_type`
    pub fn array(key: impl Into<String>, item_type: Option<FieldDef>) -> Self {
        Self {
            item_type: item_type.map(Box::new),
            ..Self::new(key, FieldType::Array)
        }
    }

    /// Create a single-valued reference into `taxonomy_key`
    pub fn taxonomy_reference(key: impl Into<String>, taxonomy_key: impl Into<String>) -> Self {
        Self {
            taxonomy_key: taxonomy_key.into(),
            ..Self::new(key, FieldType::TaxonomyReference)
        }
    }

    /// Mark the field as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Allow a list of term identifiers instead of one
    pub fn multiple(mut self) -> Self {
        self.allow_multiple = true;
        self
    }

    /// Set the display label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

/// One immutable version of a schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub id: Uuid,
    pub key: String,
    pub version: u32,
    pub name: String,
    pub fields: Vec<FieldDef>,
    pub created_at: DateTime<Utc>,
}

impl Schema {
    /// Create a schema row for `key` at `version`
    pub fn new(
        key: impl Into<String>,
        version: u32,
        name: impl Into<String>,
        fields: Vec<FieldDef>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            key: key.into(),
            version,
            name: name.into(),
            fields,
            created_at: Utc::now(),
        }
    }

    /// Returns the unique (key, version) pair for this schema
    pub fn version_key(&self) -> (&str, u32) {
        (&self.key, self.version)
    }
}

/// Check a schema definition before it is stored.
pub fn check_definition(key: &str, name: &str, fields: &[FieldDef]) -> Result<(), String> {
    if !is_valid_key(key) {
        return Err(format!(
            "schema key '{}' must be 1-{} characters of letters, digits, '_' or '-'",
            key, MAX_KEY_LEN
        ));
    }
    let name = name.trim();
    if name.is_empty() {
        return Err("schema name is required".into());
    }
    if name.chars().count() > MAX_SCHEMA_NAME_LEN {
        return Err(format!(
            "schema name must be at most {} characters",
            MAX_SCHEMA_NAME_LEN
        ));
    }
    check_field_list(fields, "")
}

fn check_field_list(fields: &[FieldDef], prefix: &str) -> Result<(), String> {
    let mut seen = HashSet::new();
    for field in fields {
        if field.key.trim().is_empty() {
            return Err(match prefix {
                "" => "field key is required".to_string(),
                p => format!("field key is required under '{}'", p),
            });
        }
        let path = if prefix.is_empty() {
            field.key.clone()
        } else {
            format!("{}.{}", prefix, field.key)
        };
        if !seen.insert(field.key.as_str()) {
            return Err(format!("duplicate field key '{}'", path));
        }
        check_field(field, &path)?;
    }
    Ok(())
}

fn check_field(field: &FieldDef, path: &str) -> Result<(), String> {
    match field.field_type {
        FieldType::Object => check_field_list(&field.children, path),
        FieldType::Array => match &field.item_type {
            Some(item) => check_field(item, &format!("{}[]", path)),
            None => Ok(()),
        },
        _ => Ok(()),
    }
}
