//! Entry lifecycle
//!
//! Entries are validated against the latest schema for their key when
//! created, then stay pinned to that exact schema version. Attribute
//! updates are re-validated against the pinned version, never the newest.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::{debug, info};
use uuid::Uuid;

use super::entry::{
    page_limit, CreateEntryRequest, Entry, EntryFilter, Page, UpdateEntryRequest,
    ENTRY_PAGE_DEFAULT,
};
use super::errors::{ContentError, ContentResult};
use super::store::{CommentStore, EntryStore};
use crate::auth::AuthContext;
use crate::core::slugify;
use crate::observability::Event;
use crate::schema::{
    Schema, SchemaError, SchemaRegistry, SchemaValidator, TermResolver, DEFAULT_VALIDATION_BUDGET,
};
use crate::search::SearchSync;

/// Entry operations over the schema registry and the entry store
#[derive(Clone)]
pub struct EntryService {
    schemas: SchemaRegistry,
    entries: Arc<dyn EntryStore>,
    comments: Arc<dyn CommentStore>,
    resolver: Arc<dyn TermResolver>,
    search: SearchSync,
    validation_budget: Duration,
}

impl EntryService {
    pub fn new(
        schemas: SchemaRegistry,
        entries: Arc<dyn EntryStore>,
        comments: Arc<dyn CommentStore>,
        resolver: Arc<dyn TermResolver>,
        search: SearchSync,
    ) -> Self {
        Self {
            schemas,
            entries,
            comments,
            resolver,
            search,
            validation_budget: DEFAULT_VALIDATION_BUDGET,
        }
    }

    /// Overrides the deadline for each validation call
    pub fn with_validation_budget(mut self, budget: Duration) -> Self {
        self.validation_budget = budget;
        self
    }

    pub fn validation_budget(&self) -> Duration {
        self.validation_budget
    }

    fn validate(&self, schema: &Schema, attributes: &Map<String, Value>) -> ContentResult<()> {
        let validator = SchemaValidator::new(self.resolver.as_ref()).with_budget(self.validation_budget);
        validator.validate_entry(schema, attributes).map_err(|e| {
            if let SchemaError::Validation(v) = &e {
                debug!(
                    event = %Event::ValidationRejected,
                    schema = %schema.key,
                    version = schema.version,
                    field = %v.field,
                    reason = v.code()
                );
            }
            ContentError::from(e)
        })
    }

    /// Validate against the latest schema for the key and store the entry.
    pub fn create(&self, actor: &AuthContext, req: CreateEntryRequest) -> ContentResult<Entry> {
        let title = req.title.trim();
        if title.is_empty() {
            return Err(ContentError::invalid("title is required"));
        }

        let schema = self.schemas.latest_schema(&req.schema_key)?;
        self.validate(&schema, &req.attributes)?;

        let slug = match req.slug.as_deref().map(slugify) {
            Some(s) if !s.is_empty() => s,
            _ => slugify(title),
        };

        let mut entry = Entry::new(&schema, actor.user_id, title, slug, req.attributes);
        entry.base.draft = req.draft;
        entry.body = req.body;
        if entry.base.slug.is_empty() {
            entry.base.slug = entry.id.to_string();
        }

        self.entries.insert(&entry)?;
        info!(
            event = %Event::EntryCreated,
            entry_id = %entry.id,
            schema = %entry.schema_key,
            version = entry.schema_version,
            "entry created"
        );

        self.search.sync_entry(&entry);
        Ok(entry)
    }

    pub fn get(&self, id: Uuid) -> ContentResult<Entry> {
        self.entries
            .get(id)?
            .ok_or_else(|| ContentError::not_found("entry"))
    }

    /// Newest first, filtered by schema key and draft flag
    pub fn list(&self, filter: &EntryFilter) -> ContentResult<Page<Entry>> {
        let limit = page_limit(filter.limit, ENTRY_PAGE_DEFAULT);
        let offset = filter.offset.unwrap_or(0);
        let (items, total) = self.entries.list(filter, limit, offset)?;
        Ok(Page {
            items,
            total,
            limit,
            offset,
        })
    }

    /// Apply a partial update. New attributes are checked against the
    /// schema version the entry was created with.
    pub fn update(
        &self,
        actor: &AuthContext,
        id: Uuid,
        req: UpdateEntryRequest,
    ) -> ContentResult<Entry> {
        let mut entry = self.get(id)?;
        if !actor.can_modify(entry.author_id) {
            return Err(ContentError::Forbidden(
                "not authorized to update this entry".into(),
            ));
        }

        if let Some(title) = req.title {
            let title = title.trim();
            if title.is_empty() {
                return Err(ContentError::invalid("title cannot be empty"));
            }
            entry.base.title = title.to_string();
        }
        if let Some(slug) = req.slug {
            let slug = slugify(&slug);
            if slug.is_empty() {
                return Err(ContentError::invalid("slug cannot be empty"));
            }
            entry.base.slug = slug;
        }
        if let Some(draft) = req.draft {
            entry.base.draft = draft;
        }
        if let Some(body) = req.body {
            entry.body = body;
        }
        if let Some(attributes) = req.attributes {
            let schema = self.schemas.schema_by_id(entry.schema_id).map_err(|e| match e {
                SchemaError::UnknownSchema(_) => ContentError::Conflict(format!(
                    "schema '{}' version {} no longer exists",
                    entry.schema_key, entry.schema_version
                )),
                other => other.into(),
            })?;
            self.validate(&schema, &attributes)?;
            entry.attributes = attributes;
        }

        entry.base.updated_at = Utc::now();
        if !self.entries.update(&entry)? {
            return Err(ContentError::not_found("entry"));
        }
        info!(event = %Event::EntryUpdated, entry_id = %entry.id, "entry updated");

        self.search.sync_entry(&entry);
        Ok(entry)
    }

    /// Delete an entry together with its comments.
    pub fn delete(&self, actor: &AuthContext, id: Uuid) -> ContentResult<()> {
        let entry = self.get(id)?;
        if !actor.can_modify(entry.author_id) {
            return Err(ContentError::Forbidden(
                "not authorized to delete this entry".into(),
            ));
        }

        if !self.entries.delete(id)? {
            return Err(ContentError::not_found("entry"));
        }
        let comments = self.comments.delete_by_entry(id)?;
        info!(event = %Event::EntryDeleted, entry_id = %id, comments, "entry deleted");

        self.search.delete_entry(&id.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::content::{Comment, InMemoryCommentStore, InMemoryEntryStore};
    use crate::schema::{FieldDef, InMemorySchemaStore};
    use crate::taxonomy::InMemoryTaxonomyStore;
    use serde_json::json;

    struct Fixture {
        service: EntryService,
        schemas: SchemaRegistry,
        comments: Arc<InMemoryCommentStore>,
    }

    fn fixture() -> Fixture {
        let schemas = SchemaRegistry::new(Arc::new(InMemorySchemaStore::new()));
        let comments = Arc::new(InMemoryCommentStore::new());
        let service = EntryService::new(
            schemas.clone(),
            Arc::new(InMemoryEntryStore::new()),
            comments.clone(),
            Arc::new(InMemoryTaxonomyStore::new()),
            SearchSync::disabled(),
        );
        Fixture {
            service,
            schemas,
            comments,
        }
    }

    fn attrs(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn create_req(schema_key: &str, title: &str, attributes: Value) -> CreateEntryRequest {
        CreateEntryRequest {
            schema_key: schema_key.into(),
            title: title.into(),
            slug: None,
            draft: false,
            body: String::new(),
            attributes: attrs(attributes),
        }
    }

    fn user() -> AuthContext {
        AuthContext::new(Uuid::new_v4(), Role::User)
    }

    #[test]
    fn test_create_stamps_latest_schema() {
        let f = fixture();
        f.schemas
            .create_schema("post", "Post", vec![FieldDef::optional_string("summary")])
            .unwrap();
        let v2 = f
            .schemas
            .create_schema("post", "Post", vec![FieldDef::required_string("summary")])
            .unwrap();

        let entry = f
            .service
            .create(&user(), create_req("post", "Hello World", json!({"summary": "s"})))
            .unwrap();
        assert_eq!(entry.schema_id, v2.id);
        assert_eq!(entry.schema_version, 2);
        assert_eq!(entry.base.slug, "hello-world");
    }

    #[test]
    fn test_create_rejects_invalid_attributes() {
        let f = fixture();
        f.schemas
            .create_schema("post", "Post", vec![FieldDef::required_string("summary")])
            .unwrap();

        let err = f
            .service
            .create(&user(), create_req("post", "Hello", json!({})))
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.code(), "MATTER_SCHEMA_VALIDATION_FAILED");
    }

    #[test]
    fn test_create_unknown_schema() {
        let f = fixture();
        let err = f
            .service
            .create(&user(), create_req("nope", "Hello", json!({})))
            .unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn test_update_validates_against_pinned_version() {
        let f = fixture();
        f.schemas
            .create_schema("post", "Post", vec![FieldDef::optional_string("summary")])
            .unwrap();
        let author = user();
        let entry = f
            .service
            .create(&author, create_req("post", "Hello", json!({})))
            .unwrap();

        // The newer version would demand `summary`, the pinned one does not
        f.schemas
            .create_schema("post", "Post", vec![FieldDef::required_string("summary")])
            .unwrap();

        let updated = f
            .service
            .update(
                &author,
                entry.id,
                UpdateEntryRequest {
                    attributes: Some(attrs(json!({"extra": 1}))),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.schema_version, 1);
        assert!(updated.base.updated_at >= entry.base.updated_at);
    }

    #[test]
    fn test_update_rejects_attributes_invalid_for_pinned_version() {
        let f = fixture();
        f.schemas
            .create_schema("post", "Post", vec![FieldDef::optional_string("summary")])
            .unwrap();
        let author = user();
        let entry = f
            .service
            .create(&author, create_req("post", "Hello", json!({})))
            .unwrap();

        let err = f
            .service
            .update(
                &author,
                entry.id,
                UpdateEntryRequest {
                    attributes: Some(attrs(json!({"summary": 5}))),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert!(f.service.get(entry.id).unwrap().attributes.is_empty());
    }

    #[test]
    fn test_only_owner_or_admin_may_modify() {
        let f = fixture();
        f.schemas.create_schema("post", "Post", vec![]).unwrap();
        let author = user();
        let entry = f
            .service
            .create(&author, create_req("post", "Hello", json!({})))
            .unwrap();

        let err = f
            .service
            .update(&user(), entry.id, UpdateEntryRequest::default())
            .unwrap_err();
        assert!(matches!(err, ContentError::Forbidden(_)));

        let admin = AuthContext::new(Uuid::new_v4(), Role::Admin);
        let updated = f
            .service
            .update(
                &admin,
                entry.id,
                UpdateEntryRequest {
                    draft: Some(true),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(updated.base.draft);
    }

    #[test]
    fn test_delete_cascades_comments() {
        let f = fixture();
        f.schemas.create_schema("post", "Post", vec![]).unwrap();
        let author = user();
        let entry = f
            .service
            .create(&author, create_req("post", "Hello", json!({})))
            .unwrap();
        f.comments
            .insert(&Comment::new(entry.id, author.user_id, "first"))
            .unwrap();

        assert!(matches!(
            f.service.delete(&user(), entry.id),
            Err(ContentError::Forbidden(_))
        ));
        f.service.delete(&author, entry.id).unwrap();

        assert!(matches!(
            f.service.get(entry.id),
            Err(ContentError::NotFound(_))
        ));
        let (_, total) = f.comments.list_by_entry(entry.id, 10, 0).unwrap();
        assert_eq!(total, 0);
    }

    #[test]
    fn test_list_pagination() {
        let f = fixture();
        f.schemas.create_schema("post", "Post", vec![]).unwrap();
        let author = user();
        for i in 0..3 {
            f.service
                .create(&author, create_req("post", &format!("Entry {}", i), json!({})))
                .unwrap();
        }

        let page = f
            .service
            .list(&EntryFilter {
                schema_key: Some("post".into()),
                limit: Some(2),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total, 3);
        assert!(page.has_more());
    }
}
