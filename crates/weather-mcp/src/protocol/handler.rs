//! Request dispatcher. Receives JSON-RPC payloads and routes them to handlers.
//!
//! The handler is cheap to clone and holds only shared, immutable state, so
//! every transport can dispatch each inbound envelope on its own task.

use std::sync::Arc;

use serde_json::Value;

use crate::completion;
use crate::prompts::PromptRegistry;
use crate::resources::ResourceRegistry;
use crate::tools::ToolRegistry;
use crate::types::*;

use super::negotiation::negotiate;
use super::validator::{validate_envelope, Envelope};

/// The main protocol handler that dispatches incoming JSON-RPC messages.
#[derive(Debug, Clone)]
pub struct ProtocolHandler {
    tools: Arc<ToolRegistry>,
}

impl ProtocolHandler {
    pub fn new(tools: ToolRegistry) -> Self {
        Self {
            tools: Arc::new(tools),
        }
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Dispatch one raw payload. Returns the response envelope, or `None`
    /// when the payload was a notification.
    pub async fn handle_raw(&self, payload: &str) -> Option<Value> {
        match serde_json::from_str::<Value>(payload) {
            Ok(value) => self.handle_value(value).await,
            Err(e) => {
                tracing::debug!("Unparseable payload: {e}");
                Some(McpError::ParseError(e.to_string()).to_response_value(RequestId::Null))
            }
        }
    }

    pub async fn handle_value(&self, value: Value) -> Option<Value> {
        let Envelope { id, method, params } = match validate_envelope(value) {
            Ok(envelope) => envelope,
            Err((id, e)) => {
                tracing::debug!("Rejected envelope: {e}");
                return Some(e.to_response_value(id));
            }
        };

        let call = match McpMethod::parse(&method, params) {
            Ok(call) => call,
            Err(e) => {
                if id.is_none() {
                    tracing::debug!("Dropping notification {method}: {e}");
                }
                return id.map(|id| e.to_response_value(id));
            }
        };

        tracing::debug!(
            "Dispatching {} (id: {})",
            call.name(),
            id.as_ref().map(ToString::to_string).unwrap_or_else(|| "none".to_string())
        );

        // `notifications/*` are never answered, even when they carry an id.
        let silent = call.is_notification();

        // Run on a separate task so a panicking handler surfaces as a JoinError.
        let this = self.clone();
        let outcome = match tokio::spawn(async move { this.dispatch(call).await }).await {
            Ok(result) => result,
            Err(join) => Err(McpError::InternalError(panic_description(join))),
        };

        if silent {
            return None;
        }
        let id = id?;
        Some(match outcome {
            Ok(result) => {
                serde_json::to_value(JsonRpcResponse::new(id, result)).unwrap_or_default()
            }
            Err(e) => {
                let e = e.into_protocol();
                if let McpError::InternalError(msg) = &e {
                    tracing::error!("Internal error handling {method}: {msg}");
                }
                e.to_response_value(id)
            }
        })
    }

    async fn dispatch(&self, call: McpMethod) -> McpResult<Value> {
        match call {
            McpMethod::Initialize(params) => to_value(negotiate(params).into_result()),
            McpMethod::ToolsList => to_value(ToolListResult {
                tools: self.tools.list_tools(),
            }),
            McpMethod::ToolsCall(params) => {
                to_value(self.tools.call(&params.name, params.arguments).await?)
            }
            McpMethod::ResourcesList => to_value(ResourceListResult {
                resources: ResourceRegistry::list_resources(),
            }),
            McpMethod::ResourcesRead(params) => to_value(ResourceRegistry::read(&params.uri)?),
            McpMethod::PromptsList => to_value(PromptListResult {
                prompts: PromptRegistry::list_prompts(),
            }),
            McpMethod::PromptsGet(params) => to_value(PromptRegistry::get(&params)?),
            McpMethod::Complete(params) => {
                to_value(completion::complete(&params, &self.tools.names()))
            }
            McpMethod::Notification { method, params } => {
                handle_notification(&method, params.as_ref());
                Ok(Value::Null)
            }
        }
    }
}

fn handle_notification(method: &str, params: Option<&Value>) {
    match method {
        "notifications/initialized" => tracing::info!("MCP handshake complete"),
        "notifications/cancelled" => {
            let cancelled = params
                .cloned()
                .and_then(|p| serde_json::from_value::<CancelledParams>(p).ok());
            match cancelled {
                Some(c) => tracing::info!(
                    "Request {} was cancelled{}",
                    c.request_id,
                    c.reason.map(|r| format!(": {r}")).unwrap_or_default()
                ),
                None => tracing::info!("Received cancellation notification"),
            }
        }
        "notifications/progress" => {
            let progress = params.cloned().unwrap_or(Value::Null);
            tracing::info!("Progress update: {progress}");
        }
        _ => tracing::debug!("Unhandled notification: {method}"),
    }
}

fn to_value(result: impl serde::Serialize) -> McpResult<Value> {
    serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
}

fn panic_description(err: tokio::task::JoinError) -> String {
    if err.is_cancelled() {
        return "handler was cancelled".to_string();
    }
    let payload = err.into_panic();
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("handler panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("handler panicked: {s}")
    } else {
        "handler panicked".to_string()
    }
}
