//! OpenWeatherMap provider (`/data/2.5/weather`).

use async_trait::async_trait;
use serde::Deserialize;

use crate::provider::{validate_location, WeatherProvider};
use crate::types::{Units, WeatherError, WeatherReport, WeatherResult};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

#[derive(Debug, Deserialize)]
struct OwmResponse {
    name: String,
    main: OwmMain,
    #[serde(default)]
    weather: Vec<OwmCondition>,
    wind: OwmWind,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwmCondition {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwmWind {
    speed: f64,
}

#[derive(Clone)]
pub struct OpenWeatherProvider {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl std::fmt::Debug for OpenWeatherProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenWeatherProvider")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl OpenWeatherProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    fn name(&self) -> &str {
        "openweathermap"
    }

    async fn current(&self, location: &str, units: Units) -> WeatherResult<WeatherReport> {
        let location = validate_location(location)?;
        let url = format!("{}/weather", self.base_url.trim_end_matches('/'));

        let resp = self
            .http
            .get(&url)
            .query(&[
                ("q", location),
                ("appid", self.api_key.as_str()),
                ("units", units.as_str()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(WeatherError::Provider(format!(
                "{status} while fetching weather for '{location}'"
            )));
        }

        let body: OwmResponse = resp.json().await?;
        tracing::debug!("OpenWeatherMap answered for {}", body.name);

        Ok(WeatherReport {
            location: body.name,
            temperature: body.main.temp,
            description: body
                .weather
                .into_iter()
                .next()
                .map(|c| c.description)
                .unwrap_or_else(|| "unknown".to_string()),
            humidity: body.main.humidity,
            wind_speed: body.wind.speed,
            units,
        })
    }
}
