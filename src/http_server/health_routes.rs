//! Health HTTP Route

use axum::{routing::get, Router};
use serde::Serialize;

use super::response::ApiResponse;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub fn health_routes() -> Router {
    Router::new().route("/health", get(health_handler))
}

async fn health_handler() -> ApiResponse<HealthResponse> {
    ApiResponse::ok(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serialization() {
        let json = serde_json::to_string(&HealthResponse {
            status: "ok",
            version: "0.1.0",
        })
        .unwrap();
        assert!(json.contains("\"status\":\"ok\""));
    }
}
