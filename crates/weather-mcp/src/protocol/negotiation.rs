//! MCP capability negotiation during initialization.
//!
//! Negotiation is a pure function of the request: nothing is retained, so
//! repeated or concurrent `initialize` calls are independent.

use crate::types::{
    Implementation, InitializeParams, InitializeResult, ServerCapabilities, MCP_VERSION,
};

/// Outcome of one `initialize` exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NegotiatedSession {
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
}

impl NegotiatedSession {
    pub fn into_result(self) -> InitializeResult {
        InitializeResult {
            capabilities: self.capabilities,
            ..InitializeResult::for_version(self.protocol_version)
        }
    }
}

pub fn negotiate(params: InitializeParams) -> NegotiatedSession {
    let protocol_version = params
        .protocol_version
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| MCP_VERSION.to_string());

    if protocol_version != MCP_VERSION {
        tracing::debug!(
            "Client requested protocol version {protocol_version}, server was built against {MCP_VERSION}; echoing client version"
        );
    }

    let client_info = params
        .client_info
        .unwrap_or_else(|| Implementation::new("unknown", "unknown"));

    tracing::info!(
        "Initialized with client: {} v{}",
        client_info.name,
        client_info.version
    );

    NegotiatedSession {
        protocol_version,
        capabilities: ServerCapabilities::default(),
    }
}
