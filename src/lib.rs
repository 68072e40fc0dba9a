//! matter - a headless content platform
//!
//! Content types are defined at runtime as versioned schemas. Entries are
//! validated against the latest version when created and stay pinned to
//! that version afterwards.

pub mod auth;
pub mod cli;
pub mod config;
pub mod content;
pub mod core;
pub mod http_server;
pub mod observability;
pub mod schema;
pub mod search;
pub mod taxonomy;
