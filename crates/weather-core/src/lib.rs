//! weather-core: weather observation providers and insight generation for weather-mcp.

pub mod insight;
pub mod llm;
pub mod mock;
pub mod openweather;
pub mod provider;
pub mod types;

pub use insight::{InsightGenerator, RuleBasedInsights};
pub use llm::{CompletionInsights, CompletionSettings};
pub use mock::MockWeatherProvider;
pub use openweather::OpenWeatherProvider;
pub use provider::{derive_forecast, validate_location, WeatherProvider};
pub use types::*;
