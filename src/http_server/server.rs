//! # HTTP Server
//!
//! Combines every router under `/api/v1` and serves it.

use std::io;
use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::auth_routes::{session_routes, user_routes};
use super::comment_routes::comment_routes;
use super::config::HttpServerConfig;
use super::entry_routes::entry_routes;
use super::health_routes::health_routes;
use super::schema_routes::schema_routes;
use super::state::AppState;
use super::taxonomy_routes::{taxonomy_routes, term_routes};
use crate::config::Config;
use crate::observability::Event;

/// API path prefix
pub const API_PREFIX: &str = "/api/v1";

pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    pub fn new(state: AppState, config: HttpServerConfig) -> Self {
        let router = Self::build_router(state, &config);
        Self { config, router }
    }

    /// Server over in-memory stores, configured from `config`
    pub fn with_config(config: &Config) -> Self {
        Self::new(AppState::in_memory(config), config.server.clone())
    }

    /// Build the combined router with all endpoints
    pub fn build_router(state: AppState, config: &HttpServerConfig) -> Router {
        let cors = if config.cors_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<_> = config
                .cors_origins
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        let api = Router::new()
            .merge(health_routes())
            .nest("/schemas", schema_routes(state.clone()))
            .nest("/entries", entry_routes(state.clone()))
            .nest("/taxonomies", taxonomy_routes(state.clone()))
            .nest("/terms", term_routes(state.clone()))
            .nest("/comments", comment_routes(state.clone()))
            .nest("/users", user_routes(state.clone()))
            .nest("/auth", session_routes(state));

        Router::new()
            .merge(health_routes())
            .nest(API_PREFIX, api)
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(cors),
            )
    }

    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    pub async fn start(self) -> io::Result<()> {
        let addr: SocketAddr = self.config.socket_addr().parse().map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid bind address {}: {}", self.config.socket_addr(), e),
            )
        })?;

        let listener = TcpListener::bind(addr).await?;
        info!(event = %Event::Serving, %addr, prefix = API_PREFIX, "listening");
        axum::serve(listener, self.router).await?;

        Ok(())
    }
}
