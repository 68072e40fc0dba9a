//! Entry model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::schema::Schema;

/// Default page size for entry listings
pub const ENTRY_PAGE_DEFAULT: usize = 20;

/// Largest page size for any listing
pub const PAGE_MAX: usize = 100;

/// Publishing metadata common to every entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseMeta {
    pub title: String,
    pub slug: String,
    pub draft: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A content document pinned to the schema version it was validated against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: Uuid,
    pub schema_id: Uuid,
    pub schema_key: String,
    pub schema_version: u32,
    pub author_id: Uuid,
    pub base: BaseMeta,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl Entry {
    /// Build a new entry stamped with `schema`'s identity
    pub fn new(
        schema: &Schema,
        author_id: Uuid,
        title: impl Into<String>,
        slug: impl Into<String>,
        attributes: Map<String, Value>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            schema_id: schema.id,
            schema_key: schema.key.clone(),
            schema_version: schema.version,
            author_id,
            base: BaseMeta {
                title: title.into(),
                slug: slug.into(),
                draft: false,
                created_at: now,
                updated_at: now,
            },
            body: String::new(),
            attributes,
        }
    }

    /// Whether `term_id` appears anywhere in the attribute document
    pub fn references_term(&self, term_id: Uuid) -> bool {
        let needle = term_id.to_string();
        self.attributes.values().any(|v| contains_string(v, &needle))
    }
}

fn contains_string(value: &Value, needle: &str) -> bool {
    match value {
        Value::String(s) => s.eq_ignore_ascii_case(needle),
        Value::Array(items) => items.iter().any(|v| contains_string(v, needle)),
        Value::Object(map) => map.values().any(|v| contains_string(v, needle)),
        _ => false,
    }
}

/// Entry creation request
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEntryRequest {
    pub schema_key: String,
    pub title: String,
    /// Derived from the title when absent
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

/// Entry update request. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateEntryRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub draft: Option<bool>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub attributes: Option<Map<String, Value>>,
}

/// Entry listing filter
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntryFilter {
    #[serde(default)]
    pub schema_key: Option<String>,
    #[serde(default)]
    pub draft: Option<bool>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub offset: Option<usize>,
}

/// One page of a listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

impl<T> Page<T> {
    pub fn has_more(&self) -> bool {
        self.offset + self.items.len() < self.total
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            limit: self.limit,
            offset: self.offset,
        }
    }
}

/// Resolve a requested page size: absent or zero means `default`,
/// anything above [`PAGE_MAX`] is capped.
pub fn page_limit(requested: Option<usize>, default: usize) -> usize {
    match requested {
        None | Some(0) => default,
        Some(n) => n.min(PAGE_MAX),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldDef;
    use serde_json::json;

    #[test]
    fn test_entry_is_stamped_with_schema() {
        let schema = Schema::new("post", 3, "Post", vec![FieldDef::required_string("title")]);
        let entry = Entry::new(&schema, Uuid::new_v4(), "Hello", "hello", Map::new());

        assert_eq!(entry.schema_id, schema.id);
        assert_eq!(entry.schema_key, "post");
        assert_eq!(entry.schema_version, 3);
        assert_eq!(entry.base.created_at, entry.base.updated_at);
    }

    #[test]
    fn test_references_term_searches_nested_values() {
        let schema = Schema::new("post", 1, "Post", vec![]);
        let term = Uuid::new_v4();
        let attributes = json!({"meta": {"tags": ["x", term.to_string()]}});
        let entry = Entry::new(
            &schema,
            Uuid::new_v4(),
            "t",
            "t",
            attributes.as_object().cloned().unwrap(),
        );

        assert!(entry.references_term(term));
        assert!(!entry.references_term(Uuid::new_v4()));
    }

    #[test]
    fn test_page_limit() {
        assert_eq!(page_limit(None, ENTRY_PAGE_DEFAULT), 20);
        assert_eq!(page_limit(Some(0), ENTRY_PAGE_DEFAULT), 20);
        assert_eq!(page_limit(Some(7), ENTRY_PAGE_DEFAULT), 7);
        assert_eq!(page_limit(Some(500), ENTRY_PAGE_DEFAULT), PAGE_MAX);
    }

    #[test]
    fn test_has_more() {
        let page = Page {
            items: vec![1, 2],
            total: 5,
            limit: 2,
            offset: 2,
        };
        assert!(page.has_more());
        let last = Page {
            items: vec![5],
            total: 5,
            limit: 2,
            offset: 4,
        };
        assert!(!last.has_more());
    }
}
