//! Tool registration and dispatch.
//!
//! The registry is built once at startup and shared read-only behind an
//! `Arc`. Tools keep their registration order, which is also the order of
//! `tools/list`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use jsonschema::Validator;
use serde_json::{json, Value};

use weather_core::{InsightGenerator, WeatherProvider};

use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition, ToolOutcome};

use super::{get_forecast, get_weather, get_weather_insights, get_weather_summary_advisory};

pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(30);

/// Collaborators handed to the weather tools.
#[derive(Clone)]
pub struct ToolContext {
    pub provider: Arc<dyn WeatherProvider>,
    pub insights: Arc<dyn InsightGenerator>,
}

impl std::fmt::Debug for ToolContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolContext")
            .field("provider", &self.provider.name())
            .field("insights", &self.insights.name())
            .finish()
    }
}

/// A remotely invocable tool.
///
/// `execute` receives arguments that already passed the declared schema.
/// Anticipated failures come back as [`ToolOutcome::Fault`]; an `Err` is an
/// unanticipated fault and becomes a protocol-level `InternalError`.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    fn definition(&self) -> ToolDefinition;

    async fn execute(&self, args: Value) -> McpResult<ToolOutcome>;
}

struct RegisteredTool {
    definition: ToolDefinition,
    validator: Validator,
    handler: Arc<dyn ToolHandler>,
}

impl RegisteredTool {
    /// Compiles the declared input schema once, at registration.
    fn new(handler: Arc<dyn ToolHandler>) -> McpResult<Self> {
        let definition = handler.definition();
        let validator = jsonschema::validator_for(&definition.input_schema).map_err(|e| {
            McpError::InternalError(format!(
                "Invalid input schema for tool '{}': {e}",
                definition.name
            ))
        })?;
        Ok(Self {
            definition,
            validator,
            handler,
        })
    }

    /// Unknown extra properties pass unless the schema forbids them.
    fn check_arguments(&self, args: &Value) -> McpResult<()> {
        if self.validator.is_valid(args) {
            return Ok(());
        }

        let msg = self
            .validator
            .iter_errors(args)
            .take(5)
            .map(|e| format!("arguments{}: {e}", e.instance_path))
            .collect::<Vec<_>>()
            .join("; ");
        if msg.is_empty() {
            return Err(McpError::InvalidParams("invalid arguments".to_string()));
        }
        Err(McpError::InvalidParams(msg))
    }
}

pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
    timeout: Duration,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Default)]
pub struct ToolRegistryBuilder {
    handlers: Vec<Arc<dyn ToolHandler>>,
    timeout: Option<Duration>,
}

impl ToolRegistryBuilder {
    pub fn register(mut self, handler: impl ToolHandler + 'static) -> Self {
        self.handlers.push(Arc::new(handler));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Fails when two handlers declare the same name or a schema does not
    /// compile.
    pub fn build(self) -> McpResult<ToolRegistry> {
        let mut tools: Vec<RegisteredTool> = Vec::with_capacity(self.handlers.len());
        for handler in self.handlers {
            let tool = RegisteredTool::new(handler)?;
            if tools.iter().any(|t| t.definition.name == tool.definition.name) {
                return Err(McpError::InternalError(format!(
                    "Duplicate tool name: {}",
                    tool.definition.name
                )));
            }
            tools.push(tool);
        }
        Ok(ToolRegistry {
            tools,
            timeout: self.timeout.unwrap_or(DEFAULT_TOOL_TIMEOUT),
        })
    }
}

impl ToolRegistry {
    pub fn builder() -> ToolRegistryBuilder {
        ToolRegistryBuilder::default()
    }

    /// The four weather tools, in catalog order.
    pub fn weather(ctx: ToolContext, timeout: Duration) -> McpResult<Self> {
        Self::builder()
            .register(get_weather::GetWeather::new(ctx.clone()))
            .register(get_forecast::GetForecast::new(ctx.clone()))
            .register(get_weather_insights::GetWeatherInsights::new(ctx.clone()))
            .register(get_weather_summary_advisory::GetWeatherSummaryAdvisory::new(ctx))
            .timeout(timeout)
            .build()
    }

    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition.clone()).collect()
    }

    pub fn names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.definition.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Invoke a tool by name.
    ///
    /// Unknown names and schema violations are `InvalidParams`. Domain faults
    /// and timeouts come back as `Ok` with `isError: true`.
    pub async fn call(&self, name: &str, arguments: Option<Value>) -> McpResult<ToolCallResult> {
        let tool = self
            .tools
            .iter()
            .find(|t| t.definition.name == name)
            .ok_or_else(|| McpError::InvalidParams(format!("Unknown tool: {name}")))?;

        let args = match arguments {
            None | Some(Value::Null) => json!({}),
            Some(v) => v,
        };
        tool.check_arguments(&args)?;

        let outcome = match tokio::time::timeout(self.timeout, tool.handler.execute(args)).await {
            Ok(outcome) => outcome?,
            Err(_) => ToolOutcome::fault(format!(
                "timed out after {}s",
                self.timeout.as_secs_f64()
            )),
        };

        if let ToolOutcome::Fault(reason) = &outcome {
            tracing::warn!("Tool '{name}' failed: {reason}");
        }
        Ok(outcome.into_result(name))
    }
}
