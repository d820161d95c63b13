//! The `get_weather_summary_advisory` tool: weather summary plus travel advisory.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use weather_core::{validate_location, Units};

use crate::types::{McpError, McpResult, ToolDefinition, ToolOutcome};

use super::registry::{ToolContext, ToolHandler};

#[derive(Debug, Deserialize)]
struct AdvisoryParams {
    location: String,
}

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "get_weather_summary_advisory".to_string(),
        description: "Get comprehensive weather summary and travel advisory powered by AI"
            .to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "location": {
                    "type": "string",
                    "description": "The location to get summary and advisory for"
                }
            },
            "required": ["location"]
        }),
    }
}

pub struct GetWeatherSummaryAdvisory {
    ctx: ToolContext,
}

impl GetWeatherSummaryAdvisory {
    pub fn new(ctx: ToolContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl ToolHandler for GetWeatherSummaryAdvisory {
    fn definition(&self) -> ToolDefinition {
        definition()
    }

    async fn execute(&self, args: Value) -> McpResult<ToolOutcome> {
        let params: AdvisoryParams =
            serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;

        let location = match validate_location(&params.location) {
            Ok(l) => l,
            Err(e) => return Ok(ToolOutcome::fault(e)),
        };

        let report = match self.ctx.provider.current(location, Units::Metric).await {
            Ok(r) => r,
            Err(e) => return Ok(ToolOutcome::fault(e)),
        };

        Ok(match self.ctx.insights.summary_advisory(&report).await {
            Ok(advisory) => {
                tracing::debug!("Advisory for {} by {}", advisory.location, advisory.powered_by);
                ToolOutcome::text(advisory.render())
            }
            Err(e) => ToolOutcome::fault(e),
        })
    }
}
