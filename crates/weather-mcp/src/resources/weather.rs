//! Static resources describing the weather tool endpoints.

use serde_json::{json, Value};

use crate::types::ResourceDefinition;

pub const MIME_TYPE_JSON: &str = "application/json";

pub const CURRENT_URI: &str = "weather://current";
pub const FORECAST_URI: &str = "weather://forecast";

pub fn list_resources() -> Vec<ResourceDefinition> {
    vec![
        ResourceDefinition {
            uri: CURRENT_URI.to_string(),
            name: "Current Weather".to_string(),
            description: "Current weather data for any location".to_string(),
            mime_type: MIME_TYPE_JSON.to_string(),
        },
        ResourceDefinition {
            uri: FORECAST_URI.to_string(),
            name: "Weather Forecast".to_string(),
            description: "Multi-day weather forecast".to_string(),
            mime_type: MIME_TYPE_JSON.to_string(),
        },
    ]
}

pub fn current_document() -> Value {
    json!({
        "description": "Current weather endpoint",
        "endpoint": "tools/call with name 'get_weather'",
        "parameters": {
            "location": "string (required)",
            "units": "string (optional, metric or imperial, default: metric)"
        }
    })
}

pub fn forecast_document() -> Value {
    json!({
        "description": "Weather forecast endpoint",
        "endpoint": "tools/call with name 'get_forecast'",
        "parameters": {
            "location": "string (required)",
            "days": "integer (optional, 1-7, default: 5)"
        }
    })
}
