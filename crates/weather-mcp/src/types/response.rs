//! MCP response types for tools, resources, prompts and completion.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::capabilities::SERVER_VERSION;
use super::request::METHOD_CATALOG;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ToolContent {
    #[serde(rename = "text")]
    Text { text: String },
}

impl ToolContent {
    pub fn as_text(&self) -> &str {
        match self {
            ToolContent::Text { text } => text,
        }
    }
}

/// Payload of a serviced `tools/call`. `isError` is always on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallResult {
    pub content: Vec<ToolContent>,
    #[serde(default, rename = "isError")]
    pub is_error: bool,
}

impl ToolCallResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
            is_error: false,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: message.into(),
            }],
            is_error: true,
        }
    }

    /// All text blocks joined with newlines.
    pub fn joined_text(&self) -> String {
        self.content
            .iter()
            .map(ToolContent::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// What a tool handler hands back: a result, or a domain fault described
/// in plain text.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutcome {
    Success(ToolCallResult),
    Fault(String),
}

impl ToolOutcome {
    pub fn text(text: impl Into<String>) -> Self {
        ToolOutcome::Success(ToolCallResult::text(text))
    }

    pub fn fault(reason: impl std::fmt::Display) -> Self {
        ToolOutcome::Fault(reason.to_string())
    }

    pub fn into_result(self, tool_name: &str) -> ToolCallResult {
        match self {
            ToolOutcome::Success(result) => result,
            ToolOutcome::Fault(reason) => {
                ToolCallResult::error(format!("Error executing tool '{tool_name}': {reason}"))
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolListResult {
    pub tools: Vec<ToolDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceContent {
    pub uri: String,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDefinition {
    pub uri: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceListResult {
    pub resources: Vec<ResourceDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadResourceResult {
    pub contents: Vec<ResourceContent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptArgument {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub arguments: Vec<PromptArgument>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptListResult {
    pub prompts: Vec<PromptDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: String,
    pub content: ToolContent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptGetResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub messages: Vec<PromptMessage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Completion {
    pub values: Vec<String>,
    pub total: usize,
    pub has_more: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompleteResult {
    pub completion: Completion,
}

/// Read-only status snapshot served outside the protocol envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    pub timestamp: String,
    pub compliant: bool,
    pub methods: Vec<String>,
    pub version: String,
}

impl HealthReport {
    pub fn snapshot() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            compliant: true,
            methods: METHOD_CATALOG.iter().map(|m| m.to_string()).collect(),
            version: SERVER_VERSION.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_error_always_serialized() {
        let ok = serde_json::to_value(ToolCallResult::text("fine")).unwrap();
        assert_eq!(
            ok,
            json!({"content": [{"type": "text", "text": "fine"}], "isError": false})
        );

        let bad = serde_json::to_value(ToolCallResult::error("nope")).unwrap();
        assert_eq!(bad["isError"], true);
    }

    #[test]
    fn test_fault_wording() {
        let result = ToolOutcome::fault("Location is required").into_result("get_weather");
        assert!(result.is_error);
        assert_eq!(
            result.joined_text(),
            "Error executing tool 'get_weather': Location is required"
        );
    }

    #[test]
    fn test_completion_wire_names() {
        let value = serde_json::to_value(CompleteResult {
            completion: Completion {
                values: vec!["London".into()],
                total: 1,
                has_more: false,
            },
        })
        .unwrap();
        assert_eq!(value["completion"]["hasMore"], false);
        assert_eq!(value["completion"]["total"], 1);
    }

    #[test]
    fn test_health_snapshot() {
        let report = HealthReport::snapshot();
        assert_eq!(report.status, "healthy");
        assert!(report.compliant);
        assert!(report.methods.iter().any(|m| m == "tools/call"));
        assert!(chrono::DateTime::parse_from_rfc3339(&report.timestamp).is_ok());
    }
}
