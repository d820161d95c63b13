//! The `weather_analysis` prompt: analyze conditions for a planned activity.

use crate::types::{McpError, McpResult, PromptGetParams, PromptGetResult, PromptMessage, ToolContent};

pub fn expand(params: &PromptGetParams) -> McpResult<PromptGetResult> {
    let location = params
        .argument("location")
        .ok_or_else(|| McpError::InvalidParams("Missing prompt argument: location".to_string()))?;
    let activity = params.argument("activity").unwrap_or("outdoor activities");

    let text = format!(
        "Analyze the current weather conditions in {location} for {activity}.\n\n\
         Consider the following factors:\n\
         1. Temperature and feels-like temperature\n\
         2. Precipitation probability and conditions\n\
         3. Wind speed and direction\n\
         4. Humidity levels\n\
         5. UV index and sun exposure\n\n\
         Provide recommendations for:\n\
         - Safety considerations\n\
         - Optimal timing\n\
         - Equipment or preparation needed\n\
         - Alternative suggestions if conditions are unfavorable\n\n\
         Use get_weather_insights with the activity to ground the analysis."
    );

    Ok(PromptGetResult {
        description: Some("Weather-based weather_analysis prompt".to_string()),
        messages: vec![PromptMessage {
            role: "user".to_string(),
            content: ToolContent::Text { text },
        }],
    })
}
