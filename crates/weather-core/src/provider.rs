//! The weather provider interface.

use async_trait::async_trait;
use chrono::{Days, NaiveDate};

use crate::types::{Forecast, ForecastDay, Units, WeatherError, WeatherReport, WeatherResult};

/// Source of weather observations.
///
/// Implementations reject blank locations with [`WeatherError::InvalidLocation`]
/// and report upstream failures as [`WeatherError::Provider`] or
/// [`WeatherError::Http`].
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    async fn current(&self, location: &str, units: Units) -> WeatherResult<WeatherReport>;

    /// Daily forecast of `days` entries. The default derives the series from
    /// the current observation.
    async fn forecast(&self, location: &str, days: u32) -> WeatherResult<Forecast> {
        let base = self.current(location, Units::Metric).await?;
        Ok(derive_forecast(
            &base,
            days,
            chrono::Local::now().date_naive(),
        ))
    }
}

/// Trim a location and reject it when nothing is left.
pub fn validate_location(location: &str) -> WeatherResult<&str> {
    let trimmed = location.trim();
    if trimmed.is_empty() {
        return Err(WeatherError::InvalidLocation);
    }
    Ok(trimmed)
}

/// Build a forecast starting at `start` from a single observation.
///
/// Temperature drifts by 2 degrees per day around day 3, humidity climbs by
/// 3 points per day within 30..=90, wind picks up by 0.5 per day.
pub fn derive_forecast(base: &WeatherReport, days: u32, start: NaiveDate) -> Forecast {
    let days = (0..days)
        .map(|i| {
            let offset = i as f64;
            let humidity = (base.humidity as u32 + i * 3).clamp(30, 90) as u8;
            ForecastDay {
                day: i + 1,
                date: start
                    .checked_add_days(Days::new(u64::from(i)))
                    .unwrap_or(start),
                temperature: round1(base.temperature + (offset - 2.0) * 2.0),
                description: base.description.clone(),
                humidity,
                wind_speed: round1((base.wind_speed + offset * 0.5).max(0.0)),
            }
        })
        .collect();

    Forecast {
        location: base.location.clone(),
        days,
        units: base.units,
    }
}

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
