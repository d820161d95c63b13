//! Error types and JSON-RPC error codes for the MCP server.
//!
//! Every protocol fault surfaces with one of the five standard JSON-RPC codes.
//! Tool-execution faults never pass through here; they travel as
//! [`ToolOutcome::Fault`](super::ToolOutcome) inside a successful response.

use serde_json::Value;

use super::message::{JsonRpcError, JsonRpcErrorObject, RequestId};

/// Standard JSON-RPC 2.0 error codes.
pub mod error_codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
}

/// All errors that can occur in the MCP server and client.
#[derive(thiserror::Error, Debug)]
pub enum McpError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// The persistent channel went away before the response arrived.
    #[error("Connection closed")]
    ConnectionClosed,

    /// Error object returned by a remote server (client side).
    #[error("Remote error {code}: {message}")]
    Remote { code: i32, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl McpError {
    pub fn code(&self) -> i32 {
        use error_codes::*;
        match self {
            McpError::ParseError(_) => PARSE_ERROR,
            McpError::InvalidRequest(_) => INVALID_REQUEST,
            McpError::MethodNotFound(_) => METHOD_NOT_FOUND,
            McpError::InvalidParams(_) => INVALID_PARAMS,
            McpError::InternalError(_) => INTERNAL_ERROR,
            McpError::Transport(_)
            | McpError::Config(_)
            | McpError::ConnectionClosed
            | McpError::Io(_) => INTERNAL_ERROR,
            McpError::Json(_) => PARSE_ERROR,
            McpError::Remote { code, .. } => *code,
        }
    }

    /// Collapse anything outside the five protocol kinds into `InternalError`,
    /// keeping only the string description of the underlying fault.
    pub fn into_protocol(self) -> McpError {
        match self {
            McpError::ParseError(_)
            | McpError::InvalidRequest(_)
            | McpError::MethodNotFound(_)
            | McpError::InvalidParams(_)
            | McpError::InternalError(_) => self,
            other => McpError::InternalError(other.to_string()),
        }
    }

    pub fn to_json_rpc_error(&self, id: RequestId) -> JsonRpcError {
        JsonRpcError::new(id, self.code(), self.to_string())
    }

    /// The full error envelope as a JSON value.
    pub fn to_response_value(&self, id: RequestId) -> Value {
        serde_json::to_value(self.to_json_rpc_error(id)).unwrap_or_default()
    }
}

impl From<JsonRpcErrorObject> for McpError {
    fn from(e: JsonRpcErrorObject) -> Self {
        McpError::Remote {
            code: e.code,
            message: e.message,
        }
    }
}

/// Collaborator errors that reach the dispatcher unhandled are internal.
impl From<weather_core::WeatherError> for McpError {
    fn from(e: weather_core::WeatherError) -> Self {
        McpError::InternalError(e.to_string())
    }
}

pub type McpResult<T> = Result<T, McpError>;
