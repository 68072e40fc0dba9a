//! Auth HTTP Routes
//!
//! The current user's profile and session. Logging in happens through the
//! OAuth provider, outside this server.

use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use super::error::ApiResult;
use super::extract::{ApiJson, BearerToken, Caller};
use super::response::ApiResponse;
use super::state::AppState;
use crate::auth::{Role, UpdateProfileRequest, User};

/// `/users/me`
pub fn user_routes(state: AppState) -> Router {
    Router::new()
        .route("/me", get(get_me).put(update_me))
        .with_state(state)
}

/// `/auth/session` and `/auth/logout`
pub fn session_routes(state: AppState) -> Router {
    Router::new()
        .route("/session", get(get_session))
        .route("/logout", post(logout))
        .with_state(state)
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user_id: uuid::Uuid,
    pub role: Role,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub revoked: bool,
}

async fn get_me(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> ApiResult<ApiResponse<User>> {
    Ok(ApiResponse::ok(state.users.get(caller.user_id)?))
}

async fn update_me(
    State(state): State<AppState>,
    Caller(caller): Caller,
    ApiJson(req): ApiJson<UpdateProfileRequest>,
) -> ApiResult<ApiResponse<User>> {
    let user = state.users.update_profile(caller.user_id, req)?;
    info!(user_id = %user.id, "profile updated");
    Ok(ApiResponse::ok(user))
}

async fn get_session(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> ApiResult<ApiResponse<SessionResponse>> {
    let session = state.sessions.validate(&token)?;
    Ok(ApiResponse::ok(SessionResponse {
        user_id: session.user_id,
        role: session.role,
        expires_at: session.expires_at,
    }))
}

async fn logout(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> ApiResult<ApiResponse<LogoutResponse>> {
    state.sessions.revoke(&token)?;
    Ok(ApiResponse::ok(LogoutResponse { revoked: true }))
}
