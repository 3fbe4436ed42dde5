use crate::models::{ConditionCategory, WeatherSnapshot};
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Stable identifier for a rule within an engine's draft. Assigned from a
/// per-engine counter; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuleId(pub(crate) u64);

impl std::fmt::Display for RuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A feels-like temperature bound as the user entered it.
///
/// The raw text is kept for round-tripping through storage; the numeric
/// value is parsed once at construction. Text that does not parse leaves
/// the bound without a value, and a rule with a valueless bound never
/// matches on the thermal axis.
#[derive(Debug, Clone, PartialEq)]
pub struct FeelBound {
    text: String,
    value: Option<f64>,
}

impl FeelBound {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let value = text.trim().parse::<f64>().ok();
        Self { text, value }
    }

    pub fn from_f64(v: f64) -> Self {
        let text = if v.fract() == 0.0 {
            format!("{}", v as i64)
        } else {
            v.to_string()
        };
        Self {
            text,
            value: Some(v),
        }
    }

    pub fn empty() -> Self {
        Self {
            text: String::new(),
            value: None,
        }
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Serialize for FeelBound {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

// Stored rule sets mix numeric bounds (the shipped defaults) and string
// bounds (anything saved from a text input), so accept both on read.
impl<'de> Deserialize<'de> for FeelBound {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(n) => FeelBound::from_f64(n),
            Raw::Text(t) => FeelBound::new(t),
        })
    }
}

/// A single user-editable clothing rule.
///
/// The feels-like interval is half-open: `min_feel` is inclusive,
/// `max_feel` exclusive. Serde names match the stored interchange format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClothingRule {
    pub name: String,
    #[serde(rename = "minFeel")]
    pub min_feel: FeelBound,
    #[serde(rename = "maxFeel")]
    pub max_feel: FeelBound,
    pub day: bool,
    pub night: bool,
    pub clear: bool,
    pub cloudy: bool,
    pub raining: bool,
    pub snowing: bool,
}

impl ClothingRule {
    /// A freshly added rule: empty bounds, nothing applicable yet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            min_feel: FeelBound::empty(),
            max_feel: FeelBound::empty(),
            day: false,
            night: false,
            clear: false,
            cloudy: false,
            raining: false,
            snowing: false,
        }
    }

    pub fn allows_condition(&self, category: ConditionCategory) -> bool {
        match category {
            ConditionCategory::Clear => self.clear,
            ConditionCategory::Cloudy => self.cloudy,
            ConditionCategory::Raining => self.raining,
            ConditionCategory::Snowing => self.snowing,
        }
    }

    /// A rule with no applicable time of day or no condition flag can
    /// never be selected. Such rules are legal to store.
    pub fn is_live(&self) -> bool {
        (self.day || self.night) && (self.clear || self.cloudy || self.raining || self.snowing)
    }

    /// Whether this rule selects its clothing item for the given snapshot.
    /// All three predicates must hold: feels-like within `[min, max)`,
    /// time-of-day applicability, and the snapshot's condition flag set.
    pub fn matches(&self, weather: &WeatherSnapshot) -> bool {
        let (Some(min), Some(max)) = (self.min_feel.value(), self.max_feel.value()) else {
            return false;
        };
        if !(min <= weather.feels_like_f && weather.feels_like_f < max) {
            return false;
        }
        if !(weather.is_daytime && self.day || !weather.is_daytime && self.night) {
            return false;
        }
        match weather.condition {
            Some(category) => self.allows_condition(category),
            None => false,
        }
    }

    fn preset(
        name: &str,
        min_feel: f64,
        max_feel: f64,
        day: bool,
        night: bool,
        clear: bool,
        cloudy: bool,
        raining: bool,
        snowing: bool,
    ) -> Self {
        Self {
            name: name.to_string(),
            min_feel: FeelBound::from_f64(min_feel),
            max_feel: FeelBound::from_f64(max_feel),
            day,
            night,
            clear,
            cloudy,
            raining,
            snowing,
        }
    }

    /// The shipped rule table, restored by a reset and used when storage
    /// holds nothing usable.
    #[rustfmt::skip]
    pub fn defaults() -> Vec<ClothingRule> {
        //                  name                  min    max    day    night  clear  cloudy rain   snow
        vec![
            Self::preset("winter hat",         -50.0,  35.0, true,  true,  true,  true,  true,  true),
            Self::preset("baseball cap",        35.0, 150.0, true,  true,  false, false, true,  false),
            Self::preset("sunglasses",         -50.0, 150.0, true,  false, true,  false, false, false),
            Self::preset("gloves",             -50.0,  40.0, true,  true,  true,  true,  true,  true),
            Self::preset("heavy jacket",       -50.0,  20.0, true,  true,  true,  true,  true,  true),
            Self::preset("light jacket",        20.0,  35.0, true,  true,  true,  true,  true,  true),
            Self::preset("long-sleeve shirt",  -50.0,  45.0, true,  true,  true,  true,  true,  true),
            Self::preset("short-sleeve shirt",  45.0, 150.0, true,  true,  true,  true,  true,  true),
            Self::preset("tights",             -50.0,  35.0, true,  true,  true,  true,  true,  true),
            Self::preset("shorts",              35.0, 150.0, true,  true,  true,  true,  true,  true),
        ]
    }
}
