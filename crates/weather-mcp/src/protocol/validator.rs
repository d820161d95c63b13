//! JSON-RPC envelope validation.
//!
//! Works on the raw `Value` rather than a typed request so that the id can be
//! recovered from envelopes that are otherwise malformed.

use serde_json::Value;

use crate::types::{McpError, RequestId, JSONRPC_VERSION};

/// A structurally valid request. `id == None` marks a notification.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub id: Option<RequestId>,
    pub method: String,
    pub params: Option<Value>,
}

impl Envelope {
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// Check envelope shape. On failure, returns the id to echo alongside the
/// error (`null` when none could be recovered).
pub fn validate_envelope(value: Value) -> Result<Envelope, (RequestId, McpError)> {
    let Value::Object(mut map) = value else {
        return Err((
            RequestId::Null,
            McpError::InvalidRequest("Request must be a JSON object".to_string()),
        ));
    };

    let id = match map.remove("id") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(RequestId::String(s)),
        Some(Value::Number(n)) => Some(RequestId::Number(n)),
        Some(other) => {
            return Err((
                RequestId::Null,
                McpError::InvalidRequest(format!(
                    "id must be a string, number or null, got {}",
                    json_type(&other)
                )),
            ))
        }
    };
    let echo = id.clone().unwrap_or(RequestId::Null);

    match map.get("jsonrpc") {
        None => {}
        Some(Value::String(v)) if v == JSONRPC_VERSION => {}
        Some(other) => {
            return Err((
                echo,
                McpError::InvalidRequest(format!(
                    "Expected jsonrpc version \"{JSONRPC_VERSION}\", got {other}"
                )),
            ))
        }
    }

    let method = match map.remove("method") {
        Some(Value::String(m)) if !m.is_empty() => m,
        Some(Value::String(_)) => {
            return Err((
                echo,
                McpError::InvalidRequest("Method name must not be empty".to_string()),
            ))
        }
        Some(other) => {
            return Err((
                echo,
                McpError::InvalidRequest(format!(
                    "method must be a string, got {}",
                    json_type(&other)
                )),
            ))
        }
        None => {
            return Err((
                echo,
                McpError::InvalidRequest("Missing method".to_string()),
            ))
        }
    };

    let params = match map.remove("params") {
        None | Some(Value::Null) => None,
        Some(obj @ Value::Object(_)) => Some(obj),
        Some(other) => {
            return Err((
                echo,
                McpError::InvalidRequest(format!(
                    "params must be an object, got {}",
                    json_type(&other)
                )),
            ))
        }
    };

    Ok(Envelope { id, method, params })
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
