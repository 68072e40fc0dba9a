//! CLI argument definitions using clap
//!
//! Commands:
//! - matter serve --config <path>
//! - matter validate --schema <file> --data <file> [--terms <file>]
//! - matter check-config --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::DEFAULT_CONFIG_PATH;

/// Matter - headless content platform with versioned schemas
#[derive(Parser, Debug)]
#[command(name = "matter")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP API server
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },

    /// Validate a JSON document against a schema file and exit
    Validate {
        /// Schema definition (`{"key", "name", "fields": [...]}`)
        #[arg(long)]
        schema: PathBuf,

        /// Attribute document to check
        #[arg(long)]
        data: PathBuf,

        /// JSON array of terms that references may point at
        #[arg(long)]
        terms: Option<PathBuf>,
    },

    /// Load and validate the configuration, then print it
    CheckConfig {
        /// Path to configuration file
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
