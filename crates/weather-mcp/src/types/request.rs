//! MCP request parameter types and the method catalog.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::capabilities::InitializeParams;
use super::error::{McpError, McpResult};

/// Every method the server answers, in catalog order. `notifications/*`
/// stands for the whole notification namespace.
pub const METHOD_CATALOG: &[&str] = &[
    "initialize",
    "tools/list",
    "tools/call",
    "resources/list",
    "resources/read",
    "prompts/list",
    "prompts/get",
    "completion/complete",
    "notifications/*",
];

pub const NOTIFICATION_PREFIX: &str = "notifications/";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallParams {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceReadParams {
    pub uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptGetParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

impl PromptGetParams {
    /// String argument by name; blank values count as absent.
    pub fn argument(&self, name: &str) -> Option<&str> {
        self.arguments
            .get(name)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompletionArgument {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompleteParams {
    #[serde(default)]
    pub argument: CompletionArgument,
    #[serde(default, rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelledParams {
    #[serde(default)]
    pub request_id: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// A request decoded against the method catalog, one parameter shape per
/// method.
#[derive(Debug, Clone)]
pub enum McpMethod {
    Initialize(InitializeParams),
    ToolsList,
    ToolsCall(ToolCallParams),
    ResourcesList,
    ResourcesRead(ResourceReadParams),
    PromptsList,
    PromptsGet(PromptGetParams),
    Complete(CompleteParams),
    Notification {
        method: String,
        params: Option<Value>,
    },
}

impl McpMethod {
    /// Route a method name and decode its params. Unknown methods are
    /// `MethodNotFound`; params that don't fit the method are `InvalidParams`.
    pub fn parse(method: &str, params: Option<Value>) -> McpResult<Self> {
        match method {
            "initialize" => Ok(McpMethod::Initialize(optional(params)?)),
            "tools/list" => Ok(McpMethod::ToolsList),
            "tools/call" => Ok(McpMethod::ToolsCall(required(params, "Tool call")?)),
            "resources/list" => Ok(McpMethod::ResourcesList),
            "resources/read" => Ok(McpMethod::ResourcesRead(required(params, "Resource read")?)),
            "prompts/list" => Ok(McpMethod::PromptsList),
            "prompts/get" => Ok(McpMethod::PromptsGet(required(params, "Prompt get")?)),
            "completion/complete" => Ok(McpMethod::Complete(optional(params)?)),
            m if m.starts_with(NOTIFICATION_PREFIX) => Ok(McpMethod::Notification {
                method: m.to_string(),
                params,
            }),
            other => Err(McpError::MethodNotFound(other.to_string())),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            McpMethod::Initialize(_) => "initialize",
            McpMethod::ToolsList => "tools/list",
            McpMethod::ToolsCall(_) => "tools/call",
            McpMethod::ResourcesList => "resources/list",
            McpMethod::ResourcesRead(_) => "resources/read",
            McpMethod::PromptsList => "prompts/list",
            McpMethod::PromptsGet(_) => "prompts/get",
            McpMethod::Complete(_) => "completion/complete",
            McpMethod::Notification { method, .. } => method,
        }
    }

    pub fn is_notification(&self) -> bool {
        matches!(self, McpMethod::Notification { .. })
    }
}

fn required<T: DeserializeOwned>(params: Option<Value>, what: &str) -> McpResult<T> {
    params
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| McpError::InvalidParams(e.to_string()))?
        .ok_or_else(|| McpError::InvalidParams(format!("{what} params required")))
}

fn optional<T: DeserializeOwned + Default>(params: Option<Value>) -> McpResult<T> {
    params
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| McpError::InvalidParams(e.to_string()))
        .map(Option::unwrap_or_default)
}
