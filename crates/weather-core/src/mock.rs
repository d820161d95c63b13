//! Deterministic provider used when no upstream API key is configured.

use async_trait::async_trait;

use crate::provider::{round1, validate_location, WeatherProvider};
use crate::types::{Units, WeatherReport, WeatherResult};

/// Cities with canned observations (temperature in °C, wind in m/s).
pub const KNOWN_LOCATIONS: &[(&str, f64, &str, u8, f64)] = &[
    ("new york", 22.5, "partly cloudy", 65, 3.2),
    ("london", 15.8, "light rain", 78, 4.1),
    ("tokyo", 28.3, "sunny", 52, 2.8),
    ("paris", 18.7, "overcast", 71, 3.5),
    ("sydney", 25.1, "clear sky", 58, 4.5),
];

const DEFAULT_OBSERVATION: (f64, &str, u8, f64) = (20.0, "partly cloudy", 60, 3.0);

#[derive(Debug, Clone, Default)]
pub struct MockWeatherProvider;

impl MockWeatherProvider {
    pub fn new() -> Self {
        Self
    }

    /// Title-cased names of the cities with canned data.
    pub fn known_locations() -> Vec<String> {
        KNOWN_LOCATIONS
            .iter()
            .map(|(name, ..)| title_case(name))
            .collect()
    }
}

#[async_trait]
impl WeatherProvider for MockWeatherProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn current(&self, location: &str, units: Units) -> WeatherResult<WeatherReport> {
        let location = validate_location(location)?;
        let key = location.to_lowercase();

        let (temp_c, description, humidity, wind_ms) = KNOWN_LOCATIONS
            .iter()
            .find(|(name, ..)| *name == key)
            .map(|(_, t, d, h, w)| (*t, *d, *h, *w))
            .unwrap_or(DEFAULT_OBSERVATION);

        let (temperature, wind_speed) = match units {
            Units::Metric => (temp_c, wind_ms),
            Units::Imperial => (temp_c * 9.0 / 5.0 + 32.0, wind_ms * 2.237),
        };

        Ok(WeatherReport {
            location: title_case(location),
            temperature: round1(temperature),
            description: description.to_string(),
            humidity,
            wind_speed: round1(wind_speed),
            units,
        })
    }
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WeatherError;

    #[tokio::test]
    async fn test_known_city_metric() {
        let report = MockWeatherProvider::new()
            .current("london", Units::Metric)
            .await
            .unwrap();
        assert_eq!(report.location, "London");
        assert_eq!(report.temperature, 15.8);
        assert_eq!(report.description, "light rain");
        assert_eq!(report.humidity, 78);
    }

    #[tokio::test]
    async fn test_imperial_conversion() {
        let report = MockWeatherProvider::new()
            .current("New York", Units::Imperial)
            .await
            .unwrap();
        assert_eq!(report.location, "New York");
        assert_eq!(report.temperature, 72.5);
        assert_eq!(report.units, Units::Imperial);
    }

    #[tokio::test]
    async fn test_unknown_city_uses_default() {
        let report = MockWeatherProvider::new()
            .current("reykjavik", Units::Metric)
            .await
            .unwrap();
        assert_eq!(report.location, "Reykjavik");
        assert_eq!(report.temperature, 20.0);
    }

    #[tokio::test]
    async fn test_blank_location_rejected() {
        let err = MockWeatherProvider::new()
            .current("  ", Units::Metric)
            .await
            .unwrap_err();
        assert!(matches!(err, WeatherError::InvalidLocation));
    }

    #[tokio::test]
    async fn test_default_forecast_length() {
        let forecast = MockWeatherProvider::new().forecast("Paris", 3).await.unwrap();
        assert_eq!(forecast.days.len(), 3);
        assert_eq!(forecast.location, "Paris");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("new york"), "New York");
        assert_eq!(title_case("sAN   fRANCISCO"), "San Francisco");
    }
}
