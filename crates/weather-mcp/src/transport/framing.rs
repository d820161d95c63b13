//! Message framing for newline-delimited JSON.

use serde_json::Value;

use crate::types::{McpError, McpResult};

/// The payload carried by one line, or `None` for a blank line.
pub fn payload_of(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Serialize a value to a JSON line (with trailing newline).
pub fn frame_message(value: &Value) -> McpResult<String> {
    let mut json = serde_json::to_string(value).map_err(McpError::Json)?;
    json.push('\n');
    Ok(json)
}
