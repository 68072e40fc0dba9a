//! Taxonomy and term models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A classification axis, e.g. `tags` or `people`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taxonomy {
    pub id: Uuid,

    /// Stable key referenced by schema fields and terms
    pub key: String,

    pub name: String,

    /// Whether terms may have parents
    pub is_hierarchical: bool,

    pub created_at: DateTime<Utc>,
}

impl Taxonomy {
    pub fn new(key: impl Into<String>, name: impl Into<String>, is_hierarchical: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            key: key.into(),
            name: name.into(),
            is_hierarchical,
            created_at: Utc::now(),
        }
    }
}

/// One value within a taxonomy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub id: Uuid,

    /// Owning taxonomy
    pub taxonomy_key: String,

    pub name: String,

    /// Unique within the owning taxonomy
    pub slug: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub color: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Uuid>,

    pub created_at: DateTime<Utc>,
}

impl Term {
    pub fn new(
        taxonomy_key: impl Into<String>,
        name: impl Into<String>,
        slug: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            taxonomy_key: taxonomy_key.into(),
            name: name.into(),
            slug: slug.into(),
            color: String::new(),
            parent_id: None,
            created_at: Utc::now(),
        }
    }

    /// Set the parent term
    pub fn with_parent(mut self, parent_id: Uuid) -> Self {
        self.parent_id = Some(parent_id);
        self
    }
}

/// Taxonomy creation request
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTaxonomyRequest {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub is_hierarchical: bool,
}

/// Taxonomy update request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTaxonomyRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub is_hierarchical: Option<bool>,
}

/// Term creation request
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTermRequest {
    pub taxonomy_key: String,
    pub name: String,
    /// Derived from `name` when absent
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
}

/// Term update request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTermRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
}
