//! The `get_weather` tool: current conditions for a location.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use weather_core::{validate_location, Units};

use crate::types::{McpError, McpResult, ToolDefinition, ToolOutcome};

use super::registry::{ToolContext, ToolHandler};

#[derive(Debug, Deserialize)]
struct GetWeatherParams {
    location: String,
    #[serde(default)]
    units: Units,
}

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "get_weather".to_string(),
        description: "Get current weather for a location".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "location": {
                    "type": "string",
                    "description": "The location to get weather for"
                },
                "units": {
                    "type": "string",
                    "enum": ["metric", "imperial"],
                    "description": "Temperature units",
                    "default": "metric"
                }
            },
            "required": ["location"]
        }),
    }
}

pub struct GetWeather {
    ctx: ToolContext,
}

impl GetWeather {
    pub fn new(ctx: ToolContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl ToolHandler for GetWeather {
    fn definition(&self) -> ToolDefinition {
        definition()
    }

    async fn execute(&self, args: Value) -> McpResult<ToolOutcome> {
        let params: GetWeatherParams =
            serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;

        let location = match validate_location(&params.location) {
            Ok(l) => l,
            Err(e) => return Ok(ToolOutcome::fault(e)),
        };

        Ok(match self.ctx.provider.current(location, params.units).await {
            Ok(report) => ToolOutcome::text(report.render()),
            Err(e) => ToolOutcome::fault(e),
        })
    }
}
