//! The closed set of keys a home snapshot is made of

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for key names outside the recognized set
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("unknown state key '{0}'")]
    Unknown(String),
}

/// Kind of value stored under a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// On/off or present/absent flag
    Bool,
    /// Whole-degree temperature
    Integer,
    /// Free text (HVAC mode, stored passcode)
    Text,
    /// Text that may be absent for a given cycle
    OptionalText,
}

impl ValueKind {
    /// Name of the JSON type expected for this kind
    pub fn expected(&self) -> &'static str {
        match self {
            ValueKind::Bool => "boolean",
            ValueKind::Integer => "integer",
            ValueKind::Text => "string",
            ValueKind::OptionalText => "string or null",
        }
    }
}

/// A recognized snapshot key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StateKey {
    DoorState,
    LightState,
    ProximityState,
    AlarmState,
    AlarmActive,
    HumidifierState,
    ChillerState,
    HeaterState,
    TempReading,
    TargetTemp,
    HvacMode,
    AlarmPasscode,
    GivenPasscode,
}

impl StateKey {
    /// Every recognized key, in canonical order
    pub const ALL: [StateKey; 13] = [
        StateKey::DoorState,
        StateKey::LightState,
        StateKey::ProximityState,
        StateKey::AlarmState,
        StateKey::AlarmActive,
        StateKey::HumidifierState,
        StateKey::ChillerState,
        StateKey::HeaterState,
        StateKey::TempReading,
        StateKey::TargetTemp,
        StateKey::HvacMode,
        StateKey::AlarmPasscode,
        StateKey::GivenPasscode,
    ];

    /// Canonical name used in maps and serialized snapshots
    pub fn as_str(&self) -> &'static str {
        match self {
            StateKey::DoorState => "door_state",
            StateKey::LightState => "light_state",
            StateKey::ProximityState => "proximity_state",
            StateKey::AlarmState => "alarm_state",
            StateKey::AlarmActive => "alarm_active",
            StateKey::HumidifierState => "humidifier_state",
            StateKey::ChillerState => "chiller_state",
            StateKey::HeaterState => "heater_state",
            StateKey::TempReading => "temp_reading",
            StateKey::TargetTemp => "target_temp",
            StateKey::HvacMode => "hvac_mode",
            StateKey::AlarmPasscode => "alarm_passcode",
            StateKey::GivenPasscode => "given_passcode",
        }
    }

    /// Kind of value this key holds
    pub fn kind(&self) -> ValueKind {
        match self {
            StateKey::TempReading | StateKey::TargetTemp => ValueKind::Integer,
            StateKey::HvacMode | StateKey::AlarmPasscode => ValueKind::Text,
            StateKey::GivenPasscode => ValueKind::OptionalText,
            _ => ValueKind::Bool,
        }
    }

    /// Whether values under this key must be redacted when displayed
    pub fn is_secret(&self) -> bool {
        matches!(self, StateKey::AlarmPasscode | StateKey::GivenPasscode)
    }
}

impl FromStr for StateKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StateKey::ALL
            .iter()
            .copied()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| KeyError::Unknown(s.to_string()))
    }
}

impl TryFrom<String> for StateKey {
    type Error = KeyError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<StateKey> for String {
    fn from(key: StateKey) -> String {
        key.as_str().to_string()
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
