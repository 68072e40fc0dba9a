//! CLI module for Matter
//!
//! Provides command-line interface for:
//! - serve: Start the HTTP API
//! - validate: Check one document against a schema file
//! - check-config: Load and print the effective configuration

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{check_config, check_document, run, run_command, serve, validate};
pub use errors::{CliError, CliResult};
pub use io::{read_json_file, write_error, write_response};
