//! `completion/complete`: argument value suggestions.
//!
//! An argument named `location` completes from the cities with canned data;
//! any other argument completes from the registered tool names.

use weather_core::MockWeatherProvider;

use crate::types::{CompleteParams, CompleteResult, Completion};

/// Upper bound on values returned in one completion.
pub const MAX_COMPLETION_VALUES: usize = 100;

pub fn complete(params: &CompleteParams, tool_names: &[String]) -> CompleteResult {
    let candidates = if params.argument.name == "location" {
        MockWeatherProvider::known_locations()
    } else {
        tool_names.to_vec()
    };
    filter(candidates, &params.argument.value)
}

/// Case-insensitive prefix filter.
pub fn filter(candidates: Vec<String>, prefix: &str) -> CompleteResult {
    let prefix = prefix.to_lowercase();
    let matching: Vec<String> = candidates
        .into_iter()
        .filter(|c| c.to_lowercase().starts_with(&prefix))
        .collect();

    let total = matching.len();
    let values: Vec<String> = matching.into_iter().take(MAX_COMPLETION_VALUES).collect();

    CompleteResult {
        completion: Completion {
            has_more: total > values.len(),
            values,
            total,
        },
    }
}
