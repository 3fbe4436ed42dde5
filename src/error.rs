use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunGearError {
    #[error("Zip code must be five digits.")]
    InvalidLocationInput,

    #[error("Location not found: {0}")]
    LocationNotFound(String),

    #[error("Weather provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Malformed weather data: {0}")]
    MalformedPayload(String),

    #[error("No rule with id {0}")]
    UnknownRuleId(crate::models::RuleId),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RunGearError>;
