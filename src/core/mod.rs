//! # Core Module
//!
//! Error types and key rules shared by every subsystem.

pub mod error;
pub mod keys;

pub use error::{StoreError, StoreResult, SystemError, SystemResult};
pub use keys::{is_valid_key, slugify, MAX_KEY_LEN};
