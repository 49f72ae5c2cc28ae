//! JSON output for CLI commands
//!
//! Each command prints exactly one JSON object on stdout. Log lines go
//! through the logger and never use these helpers.

use std::io::{self, Write};

use serde_json::Value;

use super::errors::CliResult;

fn envelope_ok(data: Value) -> Value {
    serde_json::json!({
        "status": "ok",
        "data": data
    })
}

fn envelope_error(code: &str, message: &str) -> Value {
    serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    })
}

fn write_line(value: &Value) -> CliResult<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, value)?;
    writeln!(stdout)?;
    stdout.flush()?;
    Ok(())
}

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    write_line(&envelope_ok(data))
}

/// Write an error response to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    write_line(&envelope_error(code, message))
}
