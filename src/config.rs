//! Runtime configuration
//!
//! Loaded from a JSON file, then overridden from the environment. Every
//! field has a default, so a missing file is not an error.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::http_server::HttpServerConfig;
use crate::observability::LogFormat;
use crate::search::RetryPolicy;

/// Default config file location
pub const DEFAULT_CONFIG_PATH: &str = "./matter.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("invalid config JSON: {0}")]
    Parse(String),

    #[error("invalid value for {var}: {reason}")]
    Env { var: &'static str, reason: String },

    #[error("{0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Deadline for validating one document
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    5000
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

fn default_true() -> bool {
    true
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    1000
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

impl SearchConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: Duration::from_millis(self.base_delay_ms),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// First login with this email becomes admin. Empty disables it.
    #[serde(default)]
    pub admin_email: String,

    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: u32,
}

fn default_session_ttl_hours() -> u32 {
    24 * 7
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            admin_email: String::new(),
            session_ttl_hours: default_session_ttl_hours(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: HttpServerConfig,

    #[serde(default)]
    pub validation: ValidationConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load from `path` (defaults if absent), apply environment
    /// overrides, then validate.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let mut config = Self::from_file(path)?;
        config.apply_env(|var| std::env::var(var).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse the file alone, without overrides or validation
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply overrides from `lookup` (normally the process environment)
    pub fn apply_env<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = parse_var("PORT", &port)?;
        }
        if let Some(origin) = lookup("FRONTEND_URL") {
            self.server.allow_origin(&origin);
        }
        if let Some(email) = lookup("ADMIN_EMAIL") {
            self.auth.admin_email = email.trim().to_string();
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("LOG_FORMAT") {
            self.logging.format = format
                .parse()
                .map_err(|reason| ConfigError::Env {
                    var: "LOG_FORMAT",
                    reason,
                })?;
        }
        if let Some(ms) = lookup("VALIDATION_TIMEOUT_MS") {
            self.validation.timeout_ms = parse_var("VALIDATION_TIMEOUT_MS", &ms)?;
        }
        if let Some(enabled) = lookup("SEARCH_SYNC_ENABLED") {
            self.search.enabled = parse_var("SEARCH_SYNC_ENABLED", &enabled)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::Invalid("server.host must not be empty".into()));
        }
        if self.validation.timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "validation.timeout_ms must be > 0".into(),
            ));
        }
        if self.search.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "search.max_attempts must be > 0".into(),
            ));
        }
        if self.auth.session_ttl_hours == 0 {
            return Err(ConfigError::Invalid(
                "auth.session_ttl_hours must be > 0".into(),
            ));
        }
        Ok(())
    }

    pub fn validation_budget(&self) -> Duration {
        Duration::from_millis(self.validation.timeout_ms)
    }
}

fn parse_var<T: std::str::FromStr>(var: &'static str, raw: &str) -> ConfigResult<T>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Env {
        var,
        reason: e.to_string(),
    })
}
