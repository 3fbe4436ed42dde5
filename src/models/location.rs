use crate::error::{Result, RunGearError};

/// A validated five-digit US zip code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZipCode(String);

impl ZipCode {
    /// Validate before any lookup happens; the provider never sees bad input.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let re = regex_lite::Regex::new(r"^\d{5}$").unwrap();
        if re.is_match(trimmed) {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(RunGearError::InvalidLocationInput)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ZipCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
