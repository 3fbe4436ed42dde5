use crate::config::WundergroundConfig;
use crate::error::{Result, RunGearError};
use crate::models::ZipCode;
use serde::Deserialize;

const API_BASE_URL: &str = "https://api.wunderground.com/api";

/// One-shot client for the Weather Underground API. Conditions, the hourly
/// forecast, and astronomy come back in a single request so the normalizer
/// has everything it needs for any target instant.
pub struct WundergroundClient {
    client: reqwest::Client,
    config: WundergroundConfig,
}

// Weather Underground API response structures. Most forecast numerics are
// JSON strings; they stay strings here and are parsed by the normalizer.
#[derive(Debug, Clone, Deserialize)]
pub struct WeatherPayload {
    #[serde(default)]
    pub current_observation: Option<CurrentObservation>,
    #[serde(default)]
    pub hourly_forecast: Option<Vec<HourlyForecast>>,
    #[serde(default)]
    pub sun_phase: Option<SunPhase>,
    #[serde(default)]
    pub response: Option<ResponseMeta>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CurrentObservation {
    pub display_location: DisplayLocation,
    pub observation_time: String,
    pub temp_f: f64,
    pub feelslike_f: String,
    pub icon: String,
    pub wind_mph: f64,
    pub local_tz_offset: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DisplayLocation {
    pub city: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HourlyForecast {
    #[serde(rename = "FCTTIME")]
    pub fcttime: ForecastTime,
    pub temp: ForecastValue,
    pub feelslike: ForecastValue,
    pub icon: String,
    pub wspd: ForecastValue,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastTime {
    pub epoch: String,
    pub pretty: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastValue {
    pub english: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SunPhase {
    pub sunrise: SunEvent,
    pub sunset: SunEvent,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SunEvent {
    pub hour: String,
    pub minute: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMeta {
    #[serde(default)]
    pub error: Option<ResponseError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseError {
    pub description: String,
}

impl WeatherPayload {
    fn error_description(&self) -> Option<&str> {
        self.response
            .as_ref()
            .and_then(|r| r.error.as_ref())
            .map(|e| e.description.as_str())
    }
}

impl WundergroundClient {
    pub fn new(config: WundergroundConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Fetch conditions, hourly forecast, and astronomy for a zip code.
    pub async fn fetch_by_zip(&self, zip: &ZipCode) -> Result<WeatherPayload> {
        let url = format!(
            "{}/{}/conditions/hourly/astronomy/q/{}.json",
            API_BASE_URL, self.config.api_key, zip
        );

        let response = self.client.get(&url).send().await.map_err(|e| {
            RunGearError::ProviderUnavailable(format!("Weather Underground: {}", e))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(RunGearError::ProviderUnavailable(format!(
                "Weather Underground returned {}",
                status
            )));
        }

        let payload: WeatherPayload = response.json().await.map_err(|e| {
            RunGearError::ProviderUnavailable(format!(
                "Failed to parse Weather Underground response: {}",
                e
            ))
        })?;

        // The API signals a failed location lookup by omitting the data
        // blocks and describing the problem in the response metadata.
        if payload.current_observation.is_none() || payload.hourly_forecast.is_none() {
            return Err(match payload.error_description() {
                Some(description) => RunGearError::LocationNotFound(description.to_string()),
                None => RunGearError::MalformedPayload(
                    "response missing current conditions or hourly forecast".to_string(),
                ),
            });
        }

        Ok(payload)
    }

    /// Test connection to the Weather Underground API
    pub async fn test_connection(&self, zip: &ZipCode) -> Result<bool> {
        let url = format!(
            "{}/{}/conditions/q/{}.json",
            API_BASE_URL, self.config.api_key, zip
        );

        let response = self.client.get(&url).send().await?;

        Ok(response.status().is_success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> WundergroundConfig {
        WundergroundConfig {
            api_key: "test_key".to_string(),
        }
    }

    #[test]
    fn client_creation() {
        let client = WundergroundClient::new(sample_config());
        assert_eq!(client.config.api_key, "test_key");
    }

    #[test]
    fn payload_deserializes_from_api_shape() {
        let json = r#"{
            "current_observation": {
                "display_location": {"city": "Boston"},
                "observation_time": "Last Updated on June 27, 2:45 PM EDT",
                "temp_f": 54.2,
                "feelslike_f": "51",
                "icon": "partlycloudy",
                "wind_mph": 8.1,
                "local_tz_offset": "-0400"
            },
            "hourly_forecast": [
                {
                    "FCTTIME": {"epoch": "1498586400", "pretty": "4:00 PM EDT"},
                    "temp": {"english": "56"},
                    "feelslike": {"english": "53"},
                    "icon": "clear",
                    "wspd": {"english": "7"}
                }
            ],
            "sun_phase": {
                "sunrise": {"hour": "5", "minute": "10"},
                "sunset": {"hour": "20", "minute": "25"}
            }
        }"#;

        let payload: WeatherPayload = serde_json::from_str(json).unwrap();
        let obs = payload.current_observation.unwrap();
        assert_eq!(obs.display_location.city, "Boston");
        assert_eq!(obs.feelslike_f, "51");
        let hourly = payload.hourly_forecast.unwrap();
        assert_eq!(hourly[0].fcttime.epoch, "1498586400");
        assert_eq!(hourly[0].feelslike.english, "53");
        assert_eq!(payload.sun_phase.unwrap().sunset.hour, "20");
    }

    #[test]
    fn error_payload_carries_description() {
        let json = r#"{
            "response": {
                "error": {"type": "querynotfound", "description": "No cities match your search query"}
            }
        }"#;

        let payload: WeatherPayload = serde_json::from_str(json).unwrap();
        assert!(payload.current_observation.is_none());
        assert_eq!(
            payload.error_description(),
            Some("No cities match your search query")
        );
    }
}
