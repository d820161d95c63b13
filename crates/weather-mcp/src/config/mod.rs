//! Configuration loading and resolution.
//!
//! Each value resolves as CLI flag > environment variable > default. Empty
//! environment values count as unset.

use std::sync::Arc;
use std::time::Duration;

use weather_core::{
    CompletionInsights, CompletionSettings, InsightGenerator, MockWeatherProvider,
    OpenWeatherProvider, RuleBasedInsights, WeatherProvider,
};

use crate::protocol::ProtocolHandler;
use crate::tools::{ToolContext, ToolRegistry, DEFAULT_TOOL_TIMEOUT};
use crate::types::{McpError, McpResult};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;

#[derive(Clone, Default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub weather_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub openai_base_url: Option<String>,
    pub openai_model: Option<String>,
    pub tool_timeout: Duration,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("weather_api_key", &self.weather_api_key.as_ref().map(|_| "<set>"))
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "<set>"))
            .field("openai_base_url", &self.openai_base_url)
            .field("openai_model", &self.openai_model)
            .field("tool_timeout", &self.tool_timeout)
            .finish()
    }
}

/// Values given on the command line; `None` defers to the environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub tool_timeout_secs: Option<u64>,
}

impl ServerConfig {
    pub fn from_env() -> McpResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> McpResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = match get("PORT").or_else(|| get("MCP_SERVER_PORT")) {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|e| McpError::Config(format!("invalid port {raw:?}: {e}")))?,
            None => DEFAULT_PORT,
        };

        let tool_timeout = match get("MCP_TOOL_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = raw.parse::<u64>().map_err(|e| {
                    McpError::Config(format!("invalid MCP_TOOL_TIMEOUT_SECS {raw:?}: {e}"))
                })?;
                timeout_from_secs(secs)?
            }
            None => DEFAULT_TOOL_TIMEOUT,
        };

        Ok(Self {
            host: get("MCP_SERVER_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            weather_api_key: get("WEATHER_API_KEY"),
            openai_api_key: get("OPENAI_API_KEY"),
            openai_base_url: get("OPENAI_BASE_URL"),
            openai_model: get("OPENAI_MODEL"),
            tool_timeout,
        })
    }

    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> McpResult<Self> {
        if let Some(host) = overrides.host {
            self.host = host;
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(secs) = overrides.tool_timeout_secs {
            self.tool_timeout = timeout_from_secs(secs)?;
        }
        Ok(self)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// OpenWeatherMap when an API key is configured, canned data otherwise.
    pub fn weather_provider(&self) -> Arc<dyn WeatherProvider> {
        match &self.weather_api_key {
            Some(key) => Arc::new(OpenWeatherProvider::new(key.clone())),
            None => {
                tracing::warn!("WEATHER_API_KEY not set; using mock weather data");
                Arc::new(MockWeatherProvider::new())
            }
        }
    }

    pub fn insight_generator(&self) -> Arc<dyn InsightGenerator> {
        match &self.openai_api_key {
            Some(key) => {
                let mut settings = CompletionSettings::new(key.clone());
                if let Some(url) = &self.openai_base_url {
                    settings.base_url = url.clone();
                }
                if let Some(model) = &self.openai_model {
                    settings.model = model.clone();
                }
                Arc::new(CompletionInsights::new(settings))
            }
            None => {
                tracing::info!("OPENAI_API_KEY not set; using rule-based insights");
                Arc::new(RuleBasedInsights::new())
            }
        }
    }

    pub fn build_handler(&self) -> McpResult<ProtocolHandler> {
        let ctx = ToolContext {
            provider: self.weather_provider(),
            insights: self.insight_generator(),
        };
        tracing::info!(
            "Tools backed by provider '{}' and insights '{}'",
            ctx.provider.name(),
            ctx.insights.name()
        );
        Ok(ProtocolHandler::new(ToolRegistry::weather(ctx, self.tool_timeout)?))
    }
}

fn timeout_from_secs(secs: u64) -> McpResult<Duration> {
    if secs == 0 {
        return Err(McpError::Config(
            "tool timeout must be at least one second".to_string(),
        ));
    }
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.bind_addr(), "0.0.0.0:8000");
        assert_eq!(config.tool_timeout, Duration::from_secs(30));
        assert!(config.weather_api_key.is_none());
        assert_eq!(config.weather_provider().name(), "mock");
        assert_eq!(config.insight_generator().name(), "rules");
    }

    #[test]
    fn test_port_precedence() {
        let config =
            ServerConfig::from_lookup(lookup(&[("PORT", "9000"), ("MCP_SERVER_PORT", "9100")]))
                .unwrap();
        assert_eq!(config.port, 9000);

        let config = ServerConfig::from_lookup(lookup(&[("MCP_SERVER_PORT", "9100")])).unwrap();
        assert_eq!(config.port, 9100);

        let config = ServerConfig::from_lookup(lookup(&[("PORT", ""), ("MCP_SERVER_PORT", "9100")]))
            .unwrap();
        assert_eq!(config.port, 9100);
    }

    #[test]
    fn test_invalid_values() {
        assert!(ServerConfig::from_lookup(lookup(&[("PORT", "eighty")])).is_err());
        assert!(ServerConfig::from_lookup(lookup(&[("MCP_TOOL_TIMEOUT_SECS", "0")])).is_err());
    }

    #[test]
    fn test_cli_overrides_env() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("MCP_SERVER_HOST", "127.0.0.1"),
            ("MCP_TOOL_TIMEOUT_SECS", "5"),
        ]))
        .unwrap()
        .with_overrides(ConfigOverrides {
            host: None,
            port: Some(7777),
            tool_timeout_secs: Some(12),
        })
        .unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:7777");
        assert_eq!(config.tool_timeout, Duration::from_secs(12));
    }

    #[test]
    fn test_keys_select_collaborators() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("WEATHER_API_KEY", "owm-key"),
            ("OPENAI_API_KEY", "sk-test"),
        ]))
        .unwrap();
        assert_eq!(config.weather_provider().name(), "openweathermap");
        assert_eq!(config.insight_generator().name(), "completions");
        assert!(!format!("{config:?}").contains("sk-test"));
    }

    #[test]
    fn test_build_handler_registers_tools() {
        let handler = ServerConfig::from_lookup(lookup(&[])).unwrap().build_handler().unwrap();
        assert_eq!(handler.tools().len(), 4);
    }
}
