//! # HTTP Server Module
//!
//! JSON API over the content services.
//!
//! # Endpoints (under `/api/v1`)
//!
//! - `/health` - Health check (also at `/health`)
//! - `/schemas/*` - Versioned schemas (admin)
//! - `/entries/*` - Entries
//! - `/taxonomies/*`, `/terms/*` - Classification
//! - `/comments/*` - Comments on entries
//! - `/users/me`, `/auth/*` - Current user and session

pub mod auth_routes;
pub mod comment_routes;
pub mod config;
pub mod entry_routes;
pub mod error;
pub mod extract;
pub mod health_routes;
pub mod response;
pub mod schema_routes;
pub mod server;
pub mod state;
pub mod taxonomy_routes;

pub use config::HttpServerConfig;
pub use error::{ApiError, ApiResult};
pub use response::ApiResponse;
pub use server::{HttpServer, API_PREFIX};
pub use state::AppState;
