//! CLI command implementations

use std::path::Path;

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::config::Config;
use crate::http_server::HttpServer;
use crate::observability::{init_logging, Event};
use crate::schema::{check_definition, FieldDef, Schema, SchemaResult, SchemaValidator};
use crate::taxonomy::{InMemoryTaxonomyStore, TaxonomyStore, Term};

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{read_json_file, write_error, write_response};

/// Schema file accepted by `validate`
#[derive(Debug, Deserialize)]
struct SchemaFile {
    #[serde(default = "default_schema_key")]
    key: String,
    #[serde(default = "default_schema_name")]
    name: String,
    #[serde(default)]
    fields: Vec<FieldDef>,
}

fn default_schema_key() -> String {
    "document".to_string()
}

fn default_schema_name() -> String {
    "Document".to_string()
}

/// Term as listed in a `--terms` file
#[derive(Debug, Deserialize)]
struct TermFile {
    id: Uuid,
    taxonomy_key: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    slug: String,
}

/// Parse CLI arguments and run
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve { config } => serve(&config),
        Command::Validate {
            schema,
            data,
            terms,
        } => validate(&schema, &data, terms.as_deref()),
        Command::CheckConfig { config } => check_config(&config),
    }
}

/// Load config, install logging and serve the API until stopped
pub fn serve(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    init_logging(&config.logging.level, config.logging.format);
    info!(event = %Event::BootStart, version = env!("CARGO_PKG_VERSION"));
    info!(
        event = %Event::ConfigLoaded,
        path = %config_path.display(),
        port = config.server.port,
        search_sync = config.search.enabled
    );

    let server = HttpServer::with_config(&config);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })
}

/// Build the schema and term store from files and run the validator.
///
/// The outer result reports unusable input; the inner one is the
/// validation outcome.
pub fn check_document(
    schema_path: &Path,
    data_path: &Path,
    terms_path: Option<&Path>,
) -> CliResult<(Schema, SchemaResult<()>)> {
    let file: SchemaFile = read_json_file(schema_path)?;
    check_definition(&file.key, &file.name, &file.fields).map_err(CliError::invalid_input)?;
    let schema = Schema::new(file.key, 1, file.name, file.fields);

    let document: Value = read_json_file(data_path)?;

    let terms = InMemoryTaxonomyStore::new();
    if let Some(path) = terms_path {
        let listed: Vec<TermFile> = read_json_file(path)?;
        for t in listed {
            let mut term = Term::new(t.taxonomy_key, t.name, t.slug);
            term.id = t.id;
            terms
                .insert_term(&term)
                .map_err(|e| CliError::invalid_input(format!("{}: {}", path.display(), e)))?;
        }
    }

    let outcome = SchemaValidator::new(&terms).validate_document(&schema, &document);
    Ok((schema, outcome))
}

/// Validate a document offline and print the outcome
pub fn validate(schema_path: &Path, data_path: &Path, terms_path: Option<&Path>) -> CliResult<()> {
    let (schema, outcome) = check_document(schema_path, data_path, terms_path)?;
    match outcome {
        Ok(()) => write_response(json!({
            "valid": true,
            "schema": schema.key,
        })),
        Err(e) => {
            write_error(e.code(), &e.to_string(), e.field())?;
            Err(CliError::validation_failed(e.to_string()))
        }
    }
}

/// Print the effective configuration
pub fn check_config(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    write_response(serde_json::to_value(&config)?)
}
