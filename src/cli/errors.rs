//! CLI error types
//!
//! Each variant maps to a machine code printed on stderr and a process
//! exit status.

use std::io;

use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(String),

    /// Input file is not the expected JSON shape
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Document did not satisfy the schema
    #[error("validation failed: {0}")]
    ValidationFailed(String),

    /// Server failed to start or stopped with an error
    #[error("boot failed: {0}")]
    BootFailed(String),
}

impl CliError {
    pub fn io_error(msg: impl Into<String>) -> Self {
        CliError::Io(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        CliError::InvalidInput(msg.into())
    }

    pub fn validation_failed(msg: impl Into<String>) -> Self {
        CliError::ValidationFailed(msg.into())
    }

    pub fn boot_failed(msg: impl Into<String>) -> Self {
        CliError::BootFailed(msg.into())
    }

    pub fn code_str(&self) -> &'static str {
        match self {
            CliError::Config(_) => "MATTER_CLI_CONFIG_ERROR",
            CliError::Io(_) => "MATTER_CLI_IO_ERROR",
            CliError::InvalidInput(_) => "MATTER_CLI_INVALID_INPUT",
            CliError::ValidationFailed(_) => "MATTER_CLI_VALIDATION_FAILED",
            CliError::BootFailed(_) => "MATTER_CLI_BOOT_FAILED",
        }
    }

    /// Process exit status. A rejected document is 1 so scripts can tell
    /// it apart from usage problems (2) and runtime failures (3).
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::ValidationFailed(_) => 1,
            CliError::Config(_) | CliError::InvalidInput(_) => 2,
            CliError::Io(_) | CliError::BootFailed(_) => 3,
        }
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Io(format!("JSON output: {}", e))
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

pub type CliResult<T> = Result<T, CliError>;
