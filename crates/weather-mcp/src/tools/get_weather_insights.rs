//! The `get_weather_insights` tool: activity-oriented advice for current conditions.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use weather_core::{validate_location, Units};

use crate::types::{McpError, McpResult, ToolDefinition, ToolOutcome};

use super::registry::{ToolContext, ToolHandler};

#[derive(Debug, Deserialize)]
struct InsightsParams {
    location: String,
    #[serde(default)]
    activity: Option<String>,
}

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "get_weather_insights".to_string(),
        description: "Get AI-powered weather insights and recommendations".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "location": {
                    "type": "string",
                    "description": "The location to analyze"
                },
                "activity": {
                    "type": "string",
                    "description": "Planned activity (optional)"
                }
            },
            "required": ["location"]
        }),
    }
}

pub struct GetWeatherInsights {
    ctx: ToolContext,
}

impl GetWeatherInsights {
    pub fn new(ctx: ToolContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl ToolHandler for GetWeatherInsights {
    fn definition(&self) -> ToolDefinition {
        definition()
    }

    async fn execute(&self, args: Value) -> McpResult<ToolOutcome> {
        let params: InsightsParams =
            serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;

        let location = match validate_location(&params.location) {
            Ok(l) => l,
            Err(e) => return Ok(ToolOutcome::fault(e)),
        };
        let activity = params
            .activity
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .unwrap_or("general");

        let report = match self.ctx.provider.current(location, Units::Metric).await {
            Ok(r) => r,
            Err(e) => return Ok(ToolOutcome::fault(e)),
        };

        Ok(match self.ctx.insights.insights(&report, activity).await {
            Ok(text) => ToolOutcome::text(text),
            Err(e) => ToolOutcome::fault(e),
        })
    }
}
