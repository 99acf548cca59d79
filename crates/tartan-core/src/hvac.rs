//! HVAC mode selector

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which HVAC appliance the home is set to drive
///
/// Unrecognized mode strings are kept verbatim in `Other` so they pass
/// through an evaluation unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HvacMode {
    Heater,
    Chiller,
    #[default]
    Off,
    Other(String),
}

impl HvacMode {
    /// Mode string as stored in a snapshot
    pub fn as_str(&self) -> &str {
        match self {
            HvacMode::Heater => "Heater",
            HvacMode::Chiller => "Chiller",
            HvacMode::Off => "Off",
            HvacMode::Other(s) => s,
        }
    }
}

impl From<String> for HvacMode {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Heater" => HvacMode::Heater,
            "Chiller" => HvacMode::Chiller,
            "Off" => HvacMode::Off,
            _ => HvacMode::Other(s),
        }
    }
}

impl From<&str> for HvacMode {
    fn from(s: &str) -> Self {
        HvacMode::from(s.to_string())
    }
}

impl From<HvacMode> for String {
    fn from(mode: HvacMode) -> String {
        match mode {
            HvacMode::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for HvacMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
