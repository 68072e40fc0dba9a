//! Taxonomy and Term HTTP Routes
//!
//! Reads are public; writes need an admin session.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Router,
};

use super::error::ApiResult;
use super::extract::{AdminCaller, ApiJson, IdPath};
use super::response::{ApiResponse, Deleted};
use super::state::AppState;
use crate::taxonomy::{
    CreateTaxonomyRequest, CreateTermRequest, Taxonomy, Term, UpdateTaxonomyRequest,
    UpdateTermRequest,
};

pub fn taxonomy_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_taxonomies).post(create_taxonomy))
        .route(
            "/:key",
            get(get_taxonomy)
                .put(update_taxonomy)
                .delete(delete_taxonomy),
        )
        .with_state(state)
}

pub fn term_routes(state: AppState) -> Router {
    Router::new()
        .route("/", post(create_term))
        .route("/taxonomy/:key", get(list_terms))
        .route("/:id", get(get_term).put(update_term).delete(delete_term))
        .with_state(state)
}

// ==================
// Taxonomies
// ==================

async fn list_taxonomies(State(state): State<AppState>) -> ApiResult<ApiResponse<Vec<Taxonomy>>> {
    Ok(ApiResponse::ok(state.taxonomies.list_taxonomies()?))
}

async fn get_taxonomy(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<ApiResponse<Taxonomy>> {
    Ok(ApiResponse::ok(state.taxonomies.taxonomy(&key)?))
}

async fn create_taxonomy(
    State(state): State<AppState>,
    _admin: AdminCaller,
    ApiJson(req): ApiJson<CreateTaxonomyRequest>,
) -> ApiResult<ApiResponse<Taxonomy>> {
    Ok(ApiResponse::created(state.taxonomies.create_taxonomy(req)?))
}

async fn update_taxonomy(
    State(state): State<AppState>,
    _admin: AdminCaller,
    Path(key): Path<String>,
    ApiJson(req): ApiJson<UpdateTaxonomyRequest>,
) -> ApiResult<ApiResponse<Taxonomy>> {
    Ok(ApiResponse::ok(state.taxonomies.update_taxonomy(&key, req)?))
}

async fn delete_taxonomy(
    State(state): State<AppState>,
    _admin: AdminCaller,
    Path(key): Path<String>,
) -> ApiResult<ApiResponse<Deleted>> {
    state.taxonomies.delete_taxonomy(&key)?;
    Ok(ApiResponse::ok(Deleted { deleted: true }))
}

// ==================
// Terms
// ==================

async fn list_terms(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<ApiResponse<Vec<Term>>> {
    Ok(ApiResponse::ok(state.taxonomies.terms_in(&key)?))
}

async fn get_term(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> ApiResult<ApiResponse<Term>> {
    Ok(ApiResponse::ok(state.taxonomies.term(id)?))
}

async fn create_term(
    State(state): State<AppState>,
    _admin: AdminCaller,
    ApiJson(req): ApiJson<CreateTermRequest>,
) -> ApiResult<ApiResponse<Term>> {
    Ok(ApiResponse::created(state.taxonomies.create_term(req)?))
}

async fn update_term(
    State(state): State<AppState>,
    _admin: AdminCaller,
    IdPath(id): IdPath,
    ApiJson(req): ApiJson<UpdateTermRequest>,
) -> ApiResult<ApiResponse<Term>> {
    Ok(ApiResponse::ok(state.taxonomies.update_term(id, req)?))
}

async fn delete_term(
    State(state): State<AppState>,
    _admin: AdminCaller,
    IdPath(id): IdPath,
) -> ApiResult<ApiResponse<Deleted>> {
    state.taxonomies.delete_term(id)?;
    Ok(ApiResponse::ok(Deleted { deleted: true }))
}
