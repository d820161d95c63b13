//! Core data types for weather observations, forecasts, and advisories.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Measurement system used for temperatures and wind speeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    pub fn as_str(self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }

    pub fn temperature_symbol(self) -> &'static str {
        match self {
            Units::Metric => "C",
            Units::Imperial => "F",
        }
    }

    pub fn speed_unit(self) -> &'static str {
        match self {
            Units::Metric => "m/s",
            Units::Imperial => "mph",
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Units {
    type Err = WeatherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            other => Err(WeatherError::InvalidUnits(other.to_string())),
        }
    }
}

/// Current conditions at one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub location: String,
    pub temperature: f64,
    pub description: String,
    pub humidity: u8,
    pub wind_speed: f64,
    pub units: Units,
}

impl WeatherReport {
    /// Human-readable multi-line rendering used as tool output.
    pub fn render(&self) -> String {
        format!(
            "Weather in {}:\nTemperature: {}°{}\nDescription: {}\nHumidity: {}%\nWind Speed: {} {}",
            self.location,
            self.temperature,
            self.units.temperature_symbol(),
            self.description,
            self.humidity,
            self.wind_speed,
            self.units.speed_unit()
        )
    }

    pub fn description_has(&self, needle: &str) -> bool {
        self.description.to_lowercase().contains(needle)
    }
}

/// One day of a forecast series. `day` is 1-based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub day: u32,
    pub date: NaiveDate,
    pub temperature: f64,
    pub description: String,
    pub humidity: u8,
    pub wind_speed: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub location: String,
    pub days: Vec<ForecastDay>,
    pub units: Units,
}

impl Forecast {
    pub fn render(&self) -> String {
        let mut text = format!("Weather forecast for {}:\n", self.location);
        for day in &self.days {
            text.push_str(&format!(
                "Day {} ({}): {}°{}, {}\n",
                day.day,
                day.date,
                day.temperature,
                self.units.temperature_symbol(),
                day.description
            ));
        }
        text
    }
}

/// Weather summary paired with a travel advisory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advisory {
    pub summary: String,
    pub advisory: String,
    pub location: String,
    pub powered_by: String,
}

impl Advisory {
    pub fn render(&self) -> String {
        format!(
            "Weather Summary: {}\n\nTravel Advisory: {}",
            self.summary, self.advisory
        )
    }
}

/// Errors raised by weather collaborators.
#[derive(thiserror::Error, Debug)]
pub enum WeatherError {
    #[error("Location is required")]
    InvalidLocation,

    #[error("Unsupported units: {0} (expected metric or imperial)")]
    InvalidUnits(String),

    #[error("Weather provider error: {0}")]
    Provider(String),

    #[error("Insight generation error: {0}")]
    Insight(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type WeatherResult<T> = Result<T, WeatherError>;
