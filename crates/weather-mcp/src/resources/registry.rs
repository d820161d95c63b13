//! Resource registration and dispatch.

use crate::types::{McpError, McpResult, ReadResourceResult, ResourceContent, ResourceDefinition};

use super::weather::{self, CURRENT_URI, FORECAST_URI, MIME_TYPE_JSON};

pub struct ResourceRegistry;

impl ResourceRegistry {
    pub fn list_resources() -> Vec<ResourceDefinition> {
        weather::list_resources()
    }

    pub fn read(uri: &str) -> McpResult<ReadResourceResult> {
        let document = match uri {
            CURRENT_URI => weather::current_document(),
            FORECAST_URI => weather::forecast_document(),
            _ => return Err(McpError::InvalidParams(format!("Unknown resource: {uri}"))),
        };

        let text = serde_json::to_string_pretty(&document)
            .map_err(|e| McpError::InternalError(e.to_string()))?;

        Ok(ReadResourceResult {
            contents: vec![ResourceContent {
                uri: uri.to_string(),
                mime_type: MIME_TYPE_JSON.to_string(),
                text,
            }],
        })
    }
}
