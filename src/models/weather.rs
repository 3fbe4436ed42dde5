use serde::{Deserialize, Serialize};

/// Condition buckets used by clothing rules, derived from provider icon codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionCategory {
    Clear,
    Cloudy,
    Raining,
    Snowing,
}

impl ConditionCategory {
    /// Map a provider icon code onto a condition bucket. Codes outside the
    /// known lists map to no bucket, so condition-gated rules never fire
    /// for them.
    pub fn from_icon(icon: &str) -> Option<Self> {
        match icon {
            "clear" | "hazy" | "mostlysunny" | "partlycloudy" | "sunny" => {
                Some(ConditionCategory::Clear)
            }
            "cloudy" | "fog" | "mostlycloudy" | "partlysunny" => Some(ConditionCategory::Cloudy),
            "chancerain" | "chancesleet" | "chancetstorms" | "sleet" | "rain" | "tstorms" => {
                Some(ConditionCategory::Raining)
            }
            "chanceflurries" | "chancesnow" | "flurries" | "snow" => {
                Some(ConditionCategory::Snowing)
            }
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionCategory::Clear => "Clear",
            ConditionCategory::Cloudy => "Cloudy",
            ConditionCategory::Raining => "Raining",
            ConditionCategory::Snowing => "Snowing",
        }
    }
}

impl std::fmt::Display for ConditionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Canonical weather at a single instant, normalized from the provider
/// payload. Built once per lookup and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub city: String,
    pub time: String,
    pub temp_f: f64,
    pub feels_like_f: f64,
    pub condition: Option<ConditionCategory>,
    pub wind_mph: f64,
    pub is_daytime: bool,
}
