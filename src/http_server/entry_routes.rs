//! Entry HTTP Routes
//!
//! Creates and updates run the validation engine, which may block on the
//! term store. They execute on the blocking pool under a deadline so a
//! slow store cannot stall the async workers.

use std::time::Duration;

use axum::{extract::State, routing::get, Router};
use tracing::warn;

use super::error::ApiResult;
use super::extract::{ApiJson, ApiQuery, Caller, IdPath};
use super::response::{ApiResponse, Deleted};
use super::state::AppState;
use crate::content::{
    ContentError, ContentResult, CreateEntryRequest, Entry, EntryFilter, UpdateEntryRequest,
};
use crate::core::SystemError;

/// Headroom over the validation budget for the store write that follows
const WRITE_GRACE: Duration = Duration::from_millis(500);

pub fn entry_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_entries).post(create_entry))
        .route(
            "/:id",
            get(get_entry).put(update_entry).delete(delete_entry),
        )
        .with_state(state)
}

/// Run `work` on the blocking pool, answering `Timeout` once `budget` plus
/// the write grace has passed. The abandoned task is left to finish alone.
async fn run_bounded<T, F>(budget: Duration, work: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> ContentResult<T> + Send + 'static,
{
    let limit = budget.saturating_add(WRITE_GRACE);
    match tokio::time::timeout(limit, tokio::task::spawn_blocking(work)).await {
        Ok(Ok(result)) => Ok(result?),
        Ok(Err(join)) => Err(ContentError::System(SystemError::StoreUnavailable(format!(
            "entry worker failed: {}",
            join
        )))
        .into()),
        Err(_) => {
            warn!(limit_ms = limit.as_millis() as u64, "entry write abandoned at deadline");
            Err(ContentError::System(SystemError::Timeout {
                budget_ms: budget.as_millis() as u64,
            })
            .into())
        }
    }
}

async fn list_entries(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<EntryFilter>,
) -> ApiResult<ApiResponse<Vec<Entry>>> {
    Ok(ApiResponse::page(state.entries.list(&filter)?))
}

async fn get_entry(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> ApiResult<ApiResponse<Entry>> {
    Ok(ApiResponse::ok(state.entries.get(id)?))
}

async fn create_entry(
    State(state): State<AppState>,
    Caller(caller): Caller,
    ApiJson(req): ApiJson<CreateEntryRequest>,
) -> ApiResult<ApiResponse<Entry>> {
    let entries = state.entries;
    let budget = entries.validation_budget();
    let entry = run_bounded(budget, move || entries.create(&caller, req)).await?;
    Ok(ApiResponse::created(entry))
}

async fn update_entry(
    State(state): State<AppState>,
    Caller(caller): Caller,
    IdPath(id): IdPath,
    ApiJson(req): ApiJson<UpdateEntryRequest>,
) -> ApiResult<ApiResponse<Entry>> {
    let entries = state.entries;
    let budget = entries.validation_budget();
    let entry = run_bounded(budget, move || entries.update(&caller, id, req)).await?;
    Ok(ApiResponse::ok(entry))
}

async fn delete_entry(
    State(state): State<AppState>,
    Caller(caller): Caller,
    IdPath(id): IdPath,
) -> ApiResult<ApiResponse<Deleted>> {
    state.entries.delete(&caller, id)?;
    Ok(ApiResponse::ok(Deleted { deleted: true }))
}
