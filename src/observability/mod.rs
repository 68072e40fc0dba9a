//! Observability subsystem for matter
//!
//! Structured logging through `tracing`, plus the named lifecycle events
//! attached to each log line.
//!
//! # Usage
//!
//! ```ignore
//! use matter_core::observability::{init_logging, Event, LogFormat};
//!
//! init_logging("info", LogFormat::Json);
//! tracing::info!(event = %Event::SchemaCreated, key = "post", version = 2);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{init_logging, LogFormat};
