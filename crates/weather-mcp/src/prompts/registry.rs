//! Prompt registration and dispatch.

use crate::types::{
    McpError, McpResult, PromptArgument, PromptDefinition, PromptGetParams, PromptGetResult,
};

use super::{analysis, outfit};

pub struct PromptRegistry;

impl PromptRegistry {
    pub fn list_prompts() -> Vec<PromptDefinition> {
        vec![
            PromptDefinition {
                name: "weather_analysis".to_string(),
                description: Some("Analyze weather conditions for activities".to_string()),
                arguments: vec![
                    PromptArgument {
                        name: "location".to_string(),
                        description: Some("Location to analyze".to_string()),
                        required: true,
                    },
                    PromptArgument {
                        name: "activity".to_string(),
                        description: Some("Planned activity".to_string()),
                        required: false,
                    },
                ],
            },
            PromptDefinition {
                name: "outfit_recommendation".to_string(),
                description: Some("Recommend clothing based on weather".to_string()),
                arguments: vec![PromptArgument {
                    name: "location".to_string(),
                    description: Some("Location for recommendations".to_string()),
                    required: true,
                }],
            },
        ]
    }

    pub fn get(params: &PromptGetParams) -> McpResult<PromptGetResult> {
        match params.name.as_str() {
            "weather_analysis" => analysis::expand(params),
            "outfit_recommendation" => outfit::expand(params),
            other => Err(McpError::InvalidParams(format!("Unknown prompt: {other}"))),
        }
    }
}
