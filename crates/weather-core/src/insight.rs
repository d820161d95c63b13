//! Insight generation: natural-language advice derived from a weather report.

use async_trait::async_trait;

use crate::types::{Advisory, WeatherReport, WeatherResult};

/// Produces insights and summary/advisory text for a report.
///
/// Reports handed to generators are expected in metric units; the rules
/// below reason in °C and m/s.
#[async_trait]
pub trait InsightGenerator: Send + Sync {
    fn name(&self) -> &str;

    async fn insights(&self, report: &WeatherReport, activity: &str) -> WeatherResult<String>;

    async fn summary_advisory(&self, report: &WeatherReport) -> WeatherResult<Advisory>;
}

/// Rule-based generator used without a completion service, and as the
/// fallback when the completion service fails.
#[derive(Debug, Clone, Default)]
pub struct RuleBasedInsights;

impl RuleBasedInsights {
    pub fn new() -> Self {
        Self
    }

    pub fn compose_insights(report: &WeatherReport, activity: &str) -> String {
        let t = report.temperature;
        let mut insights: Vec<&str> = Vec::new();

        insights.push(if t < 0.0 {
            "Freezing conditions - dress warmly and watch for ice."
        } else if t < 10.0 {
            "Cold weather - layer up and consider warm beverages."
        } else if t < 20.0 {
            "Mild weather - light jacket recommended."
        } else if t < 30.0 {
            "Pleasant temperature - great weather for most activities."
        } else {
            "Hot weather - stay hydrated and seek shade when possible."
        });

        if report.humidity > 80 {
            insights.push("High humidity - expect to feel warmer than actual temperature.");
        } else if report.humidity < 30 {
            insights.push("Low humidity - stay hydrated and consider moisturizer.");
        }

        if report.wind_speed > 10.0 {
            insights.push("Strong winds - secure loose items and consider wind-resistant clothing.");
        } else if report.wind_speed > 5.0 {
            insights.push("Moderate winds - light windbreaker might be helpful.");
        }

        if report.description_has("rain") {
            insights.push("Rainy conditions - bring umbrella and waterproof gear.");
        } else if report.description_has("snow") {
            insights.push("Snowy conditions - wear non-slip footwear and drive carefully.");
        } else if report.description_has("cloud") {
            insights.push("Cloudy skies - good for outdoor activities without strong sun.");
        } else if report.description_has("clear") || report.description_has("sunny") {
            insights.push("Clear skies - don't forget sunscreen and sunglasses.");
        }

        match activity.to_lowercase().as_str() {
            "running" | "jogging" | "exercise" | "workout" => insights.push(if t > 25.0 {
                "For exercise: early morning or evening recommended due to heat."
            } else if t < 5.0 {
                "For exercise: warm up indoors and dress in layers."
            } else {
                "For exercise: great conditions for outdoor workouts!"
            }),
            "picnic" | "outdoor" | "park" | "hiking" => insights.push(if report.description_has("rain") {
                "For outdoor activities: consider indoor alternatives or postpone."
            } else {
                "For outdoor activities: perfect weather for spending time outside!"
            }),
            _ => {}
        }

        let mut text = format!("Weather Insights for {}:\n\n", report.location);
        text.push_str(
            &insights
                .iter()
                .map(|i| format!("- {i}"))
                .collect::<Vec<_>>()
                .join("\n"),
        );
        text.push_str(&format!(
            "\n\nOverall: The current conditions are {} with a temperature of {}°C. ",
            report.description, t
        ));
        text.push_str(if (15.0..=25.0).contains(&t) && report.humidity < 70 {
            "These are ideal conditions for most outdoor activities!"
        } else if !(5.0..=35.0).contains(&t) {
            "Weather conditions are challenging - take extra precautions."
        } else {
            "Generally pleasant conditions with minor considerations."
        });
        text
    }

    pub fn compose_advisory(report: &WeatherReport) -> Advisory {
        let t = report.temperature;
        let loc = &report.location;
        let desc = &report.description;

        let summary = if t < 0.0 {
            format!("Current conditions in {loc} are quite cold at {t}°C with {desc}. Bundle up warmly as freezing temperatures can be uncomfortable for extended outdoor exposure.")
        } else if t < 10.0 {
            format!("{loc} is experiencing cool weather at {t}°C with {desc}. A warm jacket will keep you comfortable during outdoor activities.")
        } else if t < 25.0 {
            format!("Pleasant conditions in {loc} with {t}°C and {desc}. Ideal weather for most outdoor activities with light layers recommended.")
        } else {
            format!("Warm conditions in {loc} at {t}°C with {desc}. Stay hydrated and seek shade during peak sun hours.")
        };

        let mut items: Vec<&str> = Vec::new();

        items.push(if report.description_has("rain") {
            "Transportation: Exercise caution while driving due to wet road conditions. Allow extra travel time."
        } else if report.description_has("snow") {
            "Transportation: Winter driving conditions present. Drive slowly on potentially icy roads."
        } else if report.wind_speed > 15.0 {
            "Transportation: Strong winds may affect vehicle stability. Secure loose items."
        } else {
            "Transportation: Good driving conditions with normal precautions recommended."
        });

        items.push(if t < 0.0 {
            "Clothing: Wear insulated winter clothing including hat, gloves, and warm boots."
        } else if t < 10.0 {
            "Clothing: Dress in warm layers with a jacket or coat."
        } else if t > 30.0 {
            "Clothing: Light, breathable clothing recommended. Wear sunscreen, hat, and sunglasses."
        } else {
            "Clothing: Comfortable layered clothing suitable for current temperature."
        });

        if report.humidity > 80 {
            items.push("Health: High humidity may make it feel warmer. Stay hydrated and take breaks.");
        } else if report.humidity < 30 {
            items.push("Health: Low humidity may cause dry skin and respiratory discomfort.");
        }

        if t > 30.0 {
            items.push("Safety: Hot weather advisory - limit outdoor exposure during midday hours.");
        } else if t < -10.0 {
            items.push("Safety: Extreme cold warning - watch for signs of frostbite and hypothermia.");
        }

        items.push(if report.description_has("rain") {
            "Activity Timing: Indoor activities recommended. Bring waterproof gear if going outside."
        } else if t > 25.0 {
            "Activity Timing: Best outdoor times are early morning or evening to avoid peak heat."
        } else {
            "Activity Timing: Good conditions for outdoor activities throughout the day."
        });

        Advisory {
            summary,
            advisory: items.join("\n\n"),
            location: report.location.clone(),
            powered_by: "Rule-based (configure a completion API key for AI-generated text)"
                .to_string(),
        }
    }
}

#[async_trait]
impl InsightGenerator for RuleBasedInsights {
    fn name(&self) -> &str {
        "rules"
    }

    async fn insights(&self, report: &WeatherReport, activity: &str) -> WeatherResult<String> {
        Ok(Self::compose_insights(report, activity))
    }

    async fn summary_advisory(&self, report: &WeatherReport) -> WeatherResult<Advisory> {
        Ok(Self::compose_advisory(report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Units;

    fn report(temperature: f64, description: &str, humidity: u8, wind_speed: f64) -> WeatherReport {
        WeatherReport {
            location: "Testville".to_string(),
            temperature,
            description: description.to_string(),
            humidity,
            wind_speed,
            units: Units::Metric,
        }
    }

    #[test]
    fn test_insights_rainy_picnic() {
        let text = RuleBasedInsights::compose_insights(&report(15.8, "light rain", 78, 4.1), "picnic");
        assert!(text.starts_with("Weather Insights for Testville:"));
        assert!(text.contains("Rainy conditions"));
        assert!(text.contains("consider indoor alternatives"));
        assert!(text.contains("Generally pleasant conditions"));
    }

    #[test]
    fn test_insights_ideal_conditions() {
        let text = RuleBasedInsights::compose_insights(&report(22.0, "clear sky", 50, 2.0), "general");
        assert!(text.contains("Clear skies"));
        assert!(text.contains("ideal conditions"));
    }

    #[test]
    fn test_insights_extreme_cold_exercise() {
        let text = RuleBasedInsights::compose_insights(&report(-4.0, "snow", 85, 12.0), "running");
        assert!(text.contains("Freezing conditions"));
        assert!(text.contains("Strong winds"));
        assert!(text.contains("warm up indoors"));
        assert!(text.contains("challenging"));
    }

    #[test]
    fn test_advisory_hot_day() {
        let advisory = RuleBasedInsights::compose_advisory(&report(33.0, "sunny", 20, 3.0));
        assert!(advisory.summary.starts_with("Warm conditions in Testville"));
        assert!(advisory.advisory.contains("Hot weather advisory"));
        assert!(advisory.advisory.contains("Low humidity"));
        assert_eq!(advisory.location, "Testville");
    }

    #[tokio::test]
    async fn test_trait_impl_delegates() {
        let generator = RuleBasedInsights::new();
        let r = report(12.0, "overcast", 60, 1.0);
        let text = generator.insights(&r, "general").await.unwrap();
        assert_eq!(text, RuleBasedInsights::compose_insights(&r, "general"));
        let advisory = generator.summary_advisory(&r).await.unwrap();
        assert!(advisory.render().contains("Travel Advisory:"));
    }
}
