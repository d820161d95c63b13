//! The `outfit_recommendation` prompt: clothing advice for current conditions.

use crate::types::{McpError, McpResult, PromptGetParams, PromptGetResult, PromptMessage, ToolContent};

pub fn expand(params: &PromptGetParams) -> McpResult<PromptGetResult> {
    let location = params
        .argument("location")
        .ok_or_else(|| McpError::InvalidParams("Missing prompt argument: location".to_string()))?;

    let text = format!(
        "Based on the current weather conditions in {location}, recommend appropriate clothing and accessories.\n\n\
         Consider:\n\
         1. Temperature and wind chill\n\
         2. Precipitation and humidity\n\
         3. Sun exposure and UV levels\n\
         4. Seasonal factors\n\n\
         Provide specific recommendations for:\n\
         - Base layers and main clothing\n\
         - Outerwear requirements\n\
         - Footwear suggestions\n\
         - Accessories (hat, sunglasses, umbrella, etc.)\n\
         - Special considerations for different times of day"
    );

    Ok(PromptGetResult {
        description: Some("Weather-based outfit_recommendation prompt".to_string()),
        messages: vec![PromptMessage {
            role: "user".to_string(),
            content: ToolContent::Text { text },
        }],
    })
}
