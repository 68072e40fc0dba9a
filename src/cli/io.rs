//! JSON I/O handling for CLI
//!
//! Input files are UTF-8 JSON; every command prints one JSON object to
//! stdout.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::errors::{CliError, CliResult};

/// Read and parse a JSON file
pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> CliResult<T> {
    let content = fs::read_to_string(path)
        .map_err(|e| CliError::io_error(format!("failed to read {}: {}", path.display(), e)))?;
    serde_json::from_str(&content)
        .map_err(|e| CliError::invalid_input(format!("{}: {}", path.display(), e)))
}

fn write_line(response: &Value) -> CliResult<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, response)?;
    writeln!(stdout)?;
    stdout.flush()?;
    Ok(())
}

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    write_line(&serde_json::json!({
        "status": "ok",
        "data": data
    }))
}

/// Write an error response to stdout
pub fn write_error(code: &str, message: &str, field: Option<&str>) -> CliResult<()> {
    let mut response = serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    });
    if let Some(field) = field {
        response["field"] = Value::String(field.to_string());
    }
    write_line(&response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_json_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"a": 1}}"#).unwrap();
        let value: Value = read_json_file(file.path()).unwrap();
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn test_read_json_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_json_file::<Value>(&dir.path().join("missing.json")).unwrap_err();
        assert_eq!(err.code_str(), "MATTER_CLI_IO_ERROR");

        let mut file = NamedTempFile::new().unwrap();
        write!(file, "[1,").unwrap();
        let err = read_json_file::<Value>(file.path()).unwrap_err();
        assert_eq!(err.code_str(), "MATTER_CLI_INVALID_INPUT");
    }
}
