//! MCP tool implementations.

pub mod get_forecast;
pub mod get_weather;
pub mod get_weather_insights;
pub mod get_weather_summary_advisory;
pub mod registry;

pub use registry::{ToolContext, ToolHandler, ToolRegistry, ToolRegistryBuilder, DEFAULT_TOOL_TIMEOUT};
