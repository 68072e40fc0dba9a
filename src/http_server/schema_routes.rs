//! Schema HTTP Routes
//!
//! Admin-only. Creating a schema under an existing key appends a version.

use axum::{
    extract::{Path, State},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};

use super::error::ApiResult;
use super::extract::{AdminCaller, ApiJson};
use super::response::ApiResponse;
use super::state::AppState;
use crate::schema::{FieldDef, Schema};

pub fn schema_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_schemas).post(create_schema))
        .route("/:key", get(get_schema).delete(delete_schema))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct CreateSchemaRequest {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

#[derive(Debug, Serialize)]
pub struct DeletedVersions {
    pub key: String,
    pub deleted: usize,
}

async fn create_schema(
    State(state): State<AppState>,
    _admin: AdminCaller,
    ApiJson(req): ApiJson<CreateSchemaRequest>,
) -> ApiResult<ApiResponse<Schema>> {
    let schema = state.schemas.create_schema(&req.key, &req.name, req.fields)?;
    Ok(ApiResponse::created(schema))
}

/// Latest version of every key
async fn list_schemas(
    State(state): State<AppState>,
    _admin: AdminCaller,
) -> ApiResult<ApiResponse<Vec<Schema>>> {
    Ok(ApiResponse::ok(state.schemas.list_latest()?))
}

async fn get_schema(
    State(state): State<AppState>,
    _admin: AdminCaller,
    Path(key): Path<String>,
) -> ApiResult<ApiResponse<Schema>> {
    Ok(ApiResponse::ok(state.schemas.latest_schema(&key)?))
}

/// Drops every version of the key
async fn delete_schema(
    State(state): State<AppState>,
    _admin: AdminCaller,
    Path(key): Path<String>,
) -> ApiResult<ApiResponse<DeletedVersions>> {
    let deleted = state.schemas.delete_all_versions(&key)?;
    Ok(ApiResponse::ok(DeletedVersions { key, deleted }))
}
