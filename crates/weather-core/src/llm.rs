//! Insight generator backed by an OpenAI-compatible Chat Completions API.
//!
//! Any failure talking to the completion service (transport, status,
//! malformed body) is logged and answered with [`RuleBasedInsights`] output,
//! so callers only see errors for invalid input.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::insight::{InsightGenerator, RuleBasedInsights};
use crate::types::{Advisory, WeatherError, WeatherReport, WeatherResult};

#[derive(Debug, Clone)]
pub struct CompletionSettings {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            api_key: api_key.into(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            max_tokens: 500,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Clone)]
pub struct CompletionInsights {
    http: reqwest::Client,
    settings: CompletionSettings,
}

impl std::fmt::Debug for CompletionInsights {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionInsights")
            .field("base_url", &self.settings.base_url)
            .field("model", &self.settings.model)
            .finish()
    }
}

impl CompletionInsights {
    pub fn new(settings: CompletionSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            settings,
        }
    }

    async fn complete(&self, prompt: String) -> WeatherResult<String> {
        let url = format!(
            "{}/v1/chat/completions",
            self.settings.base_url.trim_end_matches('/')
        );

        let body = json!({
            "model": self.settings.model,
            "temperature": self.settings.temperature,
            "max_tokens": self.settings.max_tokens,
            "messages": [{ "role": "user", "content": prompt }],
        });

        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.settings.api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let parsed: ChatResponse = resp.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| WeatherError::Insight("completion returned no text".to_string()))
    }
}

fn conditions_block(report: &WeatherReport) -> String {
    format!(
        "- Temperature: {}°C\n- Conditions: {}\n- Humidity: {}%\n- Wind Speed: {} m/s",
        report.temperature, report.description, report.humidity, report.wind_speed
    )
}

pub fn insights_prompt(report: &WeatherReport, activity: &str) -> String {
    format!(
        "Based on the current weather conditions in {}:\n{}\n\n\
         Provide practical insights and recommendations for {activity}.\n\
         Consider safety, comfort, and optimal timing.\n\
         Be specific and actionable in your advice.\n\nInsights:",
        report.location,
        conditions_block(report)
    )
}

pub fn summary_prompt(report: &WeatherReport) -> String {
    format!(
        "Provide a concise, professional weather summary for {} with current conditions:\n{}\n\n\
         Create a 2-3 sentence weather summary that captures the current conditions and general comfort level.\n\n\
         Weather Summary:",
        report.location,
        conditions_block(report)
    )
}

pub fn advisory_prompt(report: &WeatherReport) -> String {
    format!(
        "Based on the current weather conditions in {}:\n{}\n\n\
         Provide specific travel and safety advisories. Include:\n\
         1. Transportation considerations\n\
         2. What to wear and bring\n\
         3. Health and safety precautions\n\
         4. Best times for outdoor activities\n\
         5. Any weather-related warnings\n\n\
         Travel Advisory:",
        report.location,
        conditions_block(report)
    )
}

#[async_trait]
impl InsightGenerator for CompletionInsights {
    fn name(&self) -> &str {
        "completions"
    }

    async fn insights(&self, report: &WeatherReport, activity: &str) -> WeatherResult<String> {
        match self.complete(insights_prompt(report, activity)).await {
            Ok(text) => Ok(text),
            Err(e) => {
                tracing::warn!("Completion service failed, using rule-based insights: {e}");
                Ok(RuleBasedInsights::compose_insights(report, activity))
            }
        }
    }

    async fn summary_advisory(&self, report: &WeatherReport) -> WeatherResult<Advisory> {
        let generated = async {
            let summary = self.complete(summary_prompt(report)).await?;
            let advisory = self.complete(advisory_prompt(report)).await?;
            Ok::<_, WeatherError>((summary, advisory))
        }
        .await;

        match generated {
            Ok((summary, advisory)) => Ok(Advisory {
                summary,
                advisory,
                location: report.location.clone(),
                powered_by: format!("Chat completions ({})", self.settings.model),
            }),
            Err(e) => {
                tracing::warn!("Completion service failed, using rule-based advisory: {e}");
                Ok(RuleBasedInsights::compose_advisory(report))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Units;

    fn report() -> WeatherReport {
        WeatherReport {
            location: "Sydney".to_string(),
            temperature: 25.1,
            description: "clear sky".to_string(),
            humidity: 58,
            wind_speed: 4.5,
            units: Units::Metric,
        }
    }

    #[test]
    fn test_prompts_carry_conditions() {
        let prompt = insights_prompt(&report(), "hiking");
        assert!(prompt.contains("Sydney"));
        assert!(prompt.contains("25.1°C"));
        assert!(prompt.contains("recommendations for hiking"));

        assert!(summary_prompt(&report()).contains("Weather Summary:"));
        assert!(advisory_prompt(&report()).contains("Travel Advisory:"));
    }

    #[test]
    fn test_chat_response_decoding() {
        let body = r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"  Go early. "}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("  Go early. "));
    }

    #[tokio::test]
    async fn test_unreachable_service_falls_back_to_rules() {
        let mut settings = CompletionSettings::new("sk-test");
        settings.base_url = "http://127.0.0.1:9".to_string();
        let generator = CompletionInsights::new(settings);

        let text = generator.insights(&report(), "general").await.unwrap();
        assert_eq!(text, RuleBasedInsights::compose_insights(&report(), "general"));

        let advisory = generator.summary_advisory(&report()).await.unwrap();
        assert!(advisory.powered_by.starts_with("Rule-based"));
    }
}
