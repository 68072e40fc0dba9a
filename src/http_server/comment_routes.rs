//! Comment HTTP Routes

use axum::{
    extract::State,
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;

use super::error::ApiResult;
use super::extract::{ApiJson, ApiQuery, Caller, IdPath};
use super::response::{ApiResponse, Deleted};
use super::state::AppState;
use crate::content::{Comment, CommentWithAuthor, CreateCommentRequest, UpdateCommentRequest};

pub fn comment_routes(state: AppState) -> Router {
    Router::new()
        .route("/", post(create_comment))
        .route("/entry/:entry_id", get(list_comments))
        .route("/:id", put(update_comment).delete(delete_comment))
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub offset: Option<usize>,
}

async fn list_comments(
    State(state): State<AppState>,
    IdPath(entry_id): IdPath,
    ApiQuery(page): ApiQuery<PageQuery>,
) -> ApiResult<ApiResponse<Vec<CommentWithAuthor>>> {
    let page = state
        .comments
        .list_by_entry(entry_id, page.limit, page.offset)?;
    Ok(ApiResponse::page(page))
}

async fn create_comment(
    State(state): State<AppState>,
    Caller(caller): Caller,
    ApiJson(req): ApiJson<CreateCommentRequest>,
) -> ApiResult<ApiResponse<Comment>> {
    Ok(ApiResponse::created(state.comments.create(&caller, req)?))
}

async fn update_comment(
    State(state): State<AppState>,
    Caller(caller): Caller,
    IdPath(id): IdPath,
    ApiJson(req): ApiJson<UpdateCommentRequest>,
) -> ApiResult<ApiResponse<Comment>> {
    Ok(ApiResponse::ok(state.comments.update(&caller, id, req)?))
}

async fn delete_comment(
    State(state): State<AppState>,
    Caller(caller): Caller,
    IdPath(id): IdPath,
) -> ApiResult<ApiResponse<Deleted>> {
    state.comments.delete(&caller, id)?;
    Ok(ApiResponse::ok(Deleted { deleted: true }))
}
