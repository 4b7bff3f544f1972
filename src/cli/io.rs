//! JSON I/O handling for CLI
//!
//! - Input: a JSON array from a file, or from stdin for "-"
//! - Output: a single JSON object via stdout
//! - UTF-8 only

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use serde_json::Value;

use super::errors::{CliError, CliResult};

/// Read the input document
pub fn read_input(path: &Path) -> CliResult<Value> {
    let content = if path == Path::new("-") {
        let mut buffer = String::new();
        io::stdin().lock().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(path)
            .map_err(|e| CliError::Io(format!("Failed to read {:?}: {}", path, e)))?
    };

    if content.trim().is_empty() {
        return Err(CliError::Io("Empty input".to_string()));
    }

    let value: Value = serde_json::from_str(&content)?;
    Ok(value)
}

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "ok",
        "data": data
    });

    write_line(&response)
}

/// Write an error response to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    });

    write_line(&response)
}

fn write_line(response: &Value) -> CliResult<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, response)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_input_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("rows.json");
        fs::write(&path, r#"[{"id": 1}]"#).unwrap();

        assert_eq!(read_input(&path).unwrap(), serde_json::json!([{"id": 1}]));
    }

    #[test]
    fn test_read_input_rejects_empty_and_missing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("rows.json");
        fs::write(&path, "  \n").unwrap();

        assert_eq!(read_input(&path).unwrap_err().code_str(), "ROWSIFT_CLI_IO_ERROR");
        assert!(read_input(&temp_dir.path().join("missing.json")).is_err());
    }
}
