//! The `get_forecast` tool: daily forecast series for a location.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use weather_core::validate_location;

use crate::types::{McpError, McpResult, ToolDefinition, ToolOutcome};

use super::registry::{ToolContext, ToolHandler};

pub const MIN_DAYS: u32 = 1;
pub const MAX_DAYS: u32 = 7;

#[derive(Debug, Deserialize)]
struct GetForecastParams {
    location: String,
    #[serde(default = "default_days")]
    days: f64,
}

fn default_days() -> f64 {
    5.0
}

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "get_forecast".to_string(),
        description: "Get weather forecast for a location".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "location": {
                    "type": "string",
                    "description": "The location to get forecast for"
                },
                "days": {
                    "type": "integer",
                    "description": "Number of days for forecast",
                    "minimum": MIN_DAYS,
                    "maximum": MAX_DAYS,
                    "default": 5
                }
            },
            "required": ["location"]
        }),
    }
}

pub struct GetForecast {
    ctx: ToolContext,
}

impl GetForecast {
    pub fn new(ctx: ToolContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl ToolHandler for GetForecast {
    fn definition(&self) -> ToolDefinition {
        definition()
    }

    async fn execute(&self, args: Value) -> McpResult<ToolOutcome> {
        let params: GetForecastParams =
            serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;

        // Range is enforced by the schema; a float like 3.0 is a valid integer.
        let days = params.days as u32;
        if !(MIN_DAYS..=MAX_DAYS).contains(&days) {
            return Err(McpError::InvalidParams(format!(
                "days must be between {MIN_DAYS} and {MAX_DAYS}"
            )));
        }

        let location = match validate_location(&params.location) {
            Ok(l) => l,
            Err(e) => return Ok(ToolOutcome::fault(e)),
        };

        Ok(match self.ctx.provider.forecast(location, days).await {
            Ok(forecast) => ToolOutcome::text(forecast.render()),
            Err(e) => ToolOutcome::fault(e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use weather_core::{MockWeatherProvider, RuleBasedInsights};

    fn tool() -> GetForecast {
        GetForecast::new(ToolContext {
            provider: Arc::new(MockWeatherProvider::new()),
            insights: Arc::new(RuleBasedInsights::new()),
        })
    }

    #[tokio::test]
    async fn test_default_five_days() {
        let outcome = tool().execute(json!({"location": "Tokyo"})).await.unwrap();
        let ToolOutcome::Success(result) = outcome else {
            panic!("expected success");
        };
        let text = result.joined_text();
        assert!(text.starts_with("Weather forecast for Tokyo:"));
        assert_eq!(text.lines().filter(|l| l.starts_with("Day ")).count(), 5);
    }

    #[tokio::test]
    async fn test_explicit_days() {
        let outcome = tool()
            .execute(json!({"location": "Tokyo", "days": 2}))
            .await
            .unwrap();
        let ToolOutcome::Success(result) = outcome else {
            panic!("expected success");
        };
        assert_eq!(result.joined_text().lines().filter(|l| l.starts_with("Day ")).count(), 2);
    }

    #[tokio::test]
    async fn test_out_of_range_days_rejected() {
        let err = tool()
            .execute(json!({"location": "Tokyo", "days": 10}))
            .await
            .unwrap_err();
        assert_eq!(err.code(), -32602);
    }
}
