//! Snapshot of the home at one observation instant

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

use crate::{HvacMode, StateKey};

/// Placeholder shown instead of secret values
pub const REDACTED: &str = "<redacted>";

/// Errors raised when converting a loosely-typed map into a snapshot
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SnapshotError {
    #[error("invalid value for '{key}': expected {expected}, found {found}")]
    InvalidType {
        key: StateKey,
        expected: &'static str,
        found: &'static str,
    },

    #[error("value {value} for '{key}' is out of range")]
    OutOfRange { key: StateKey, value: i64 },

    #[error("snapshot must be an object, found {found}")]
    NotAnObject { found: &'static str },
}

/// Readings and device flags of the home at one instant
///
/// Every recognized key has a field. `given_passcode` is the only transient
/// key: `None` means no passcode was offered this cycle.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StateSnapshot {
    /// Front door open
    pub door_state: bool,

    /// Lights on
    pub light_state: bool,

    /// Someone is home
    pub proximity_state: bool,

    /// Alarm armed
    pub alarm_state: bool,

    /// Alarm sounding
    pub alarm_active: bool,

    pub humidifier_state: bool,

    pub chiller_state: bool,

    pub heater_state: bool,

    /// Current temperature reading
    pub temp_reading: i32,

    /// Temperature the HVAC should hold
    pub target_temp: i32,

    pub hvac_mode: HvacMode,

    /// Stored passcode that disarms the alarm
    pub alarm_passcode: String,

    /// Passcode offered during this cycle, if any
    pub given_passcode: Option<String>,
}

impl StateSnapshot {
    /// Build a snapshot from a name → value map
    ///
    /// Unrecognized names are ignored and missing keys keep their default.
    /// A value of the wrong type is rejected.
    pub fn from_map(map: &Map<String, Value>) -> Result<Self, SnapshotError> {
        let mut snapshot = Self::default();
        for (name, value) in map {
            let Ok(key) = name.parse::<StateKey>() else {
                continue;
            };
            snapshot.set(key, value)?;
        }
        Ok(snapshot)
    }

    /// Build a snapshot from a JSON object
    pub fn from_value(value: &Value) -> Result<Self, SnapshotError> {
        match value {
            Value::Object(map) => Self::from_map(map),
            Value::Null => Ok(Self::default()),
            other => Err(SnapshotError::NotAnObject {
                found: json_type(other),
            }),
        }
    }

    /// Map with every recognized key present
    pub fn to_map(&self) -> Map<String, Value> {
        StateKey::ALL
            .iter()
            .map(|key| (key.as_str().to_string(), self.get(*key)))
            .collect()
    }

    /// Read one key as a JSON value
    pub fn get(&self, key: StateKey) -> Value {
        match key {
            StateKey::DoorState => Value::Bool(self.door_state),
            StateKey::LightState => Value::Bool(self.light_state),
            StateKey::ProximityState => Value::Bool(self.proximity_state),
            StateKey::AlarmState => Value::Bool(self.alarm_state),
            StateKey::AlarmActive => Value::Bool(self.alarm_active),
            StateKey::HumidifierState => Value::Bool(self.humidifier_state),
            StateKey::ChillerState => Value::Bool(self.chiller_state),
            StateKey::HeaterState => Value::Bool(self.heater_state),
            StateKey::TempReading => Value::from(self.temp_reading),
            StateKey::TargetTemp => Value::from(self.target_temp),
            StateKey::HvacMode => Value::String(self.hvac_mode.to_string()),
            StateKey::AlarmPasscode => Value::String(self.alarm_passcode.clone()),
            StateKey::GivenPasscode => self
                .given_passcode
                .clone()
                .map(Value::String)
                .unwrap_or(Value::Null),
        }
    }

    /// Write one key from a JSON value, checking its type
    pub fn set(&mut self, key: StateKey, value: &Value) -> Result<(), SnapshotError> {
        match key {
            StateKey::DoorState => self.door_state = expect_bool(key, value)?,
            StateKey::LightState => self.light_state = expect_bool(key, value)?,
            StateKey::ProximityState => self.proximity_state = expect_bool(key, value)?,
            StateKey::AlarmState => self.alarm_state = expect_bool(key, value)?,
            StateKey::AlarmActive => self.alarm_active = expect_bool(key, value)?,
            StateKey::HumidifierState => self.humidifier_state = expect_bool(key, value)?,
            StateKey::ChillerState => self.chiller_state = expect_bool(key, value)?,
            StateKey::HeaterState => self.heater_state = expect_bool(key, value)?,
            StateKey::TempReading => self.temp_reading = expect_int(key, value)?,
            StateKey::TargetTemp => self.target_temp = expect_int(key, value)?,
            StateKey::HvacMode => self.hvac_mode = HvacMode::from(expect_str(key, value)?),
            StateKey::AlarmPasscode => self.alarm_passcode = expect_str(key, value)?,
            StateKey::GivenPasscode => {
                self.given_passcode = match value {
                    Value::Null => None,
                    other => Some(expect_str(key, other)?),
                }
            }
        }
        Ok(())
    }

    /// Keys whose value differs in `next`, in canonical key order
    pub fn changes(&self, next: &StateSnapshot) -> Vec<StateChange> {
        StateKey::ALL
            .iter()
            .filter_map(|key| {
                let old = self.get(*key);
                let new = next.get(*key);
                (old != new).then_some(StateChange { key: *key, old, new })
            })
            .collect()
    }
}

/// A single key that changed between two snapshots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateChange {
    pub key: StateKey,
    pub old: Value,
    pub new: Value,
}

impl StateChange {
    /// Copy with secret values replaced by [`REDACTED`]
    pub fn redacted(&self) -> Self {
        if !self.key.is_secret() {
            return self.clone();
        }
        let mask = |v: &Value| match v {
            Value::Null => Value::Null,
            _ => Value::String(REDACTED.to_string()),
        };
        Self {
            key: self.key,
            old: mask(&self.old),
            new: mask(&self.new),
        }
    }
}

impl fmt::Display for StateChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shown = self.redacted();
        write!(f, "{}: {} -> {}", shown.key, shown.old, shown.new)
    }
}

fn expect_bool(key: StateKey, value: &Value) -> Result<bool, SnapshotError> {
    value.as_bool().ok_or_else(|| invalid(key, value))
}

fn expect_int(key: StateKey, value: &Value) -> Result<i32, SnapshotError> {
    let n = value.as_i64().ok_or_else(|| invalid(key, value))?;
    i32::try_from(n).map_err(|_| SnapshotError::OutOfRange { key, value: n })
}

fn expect_str(key: StateKey, value: &Value) -> Result<String, SnapshotError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| invalid(key, value))
}

fn invalid(key: StateKey, value: &Value) -> SnapshotError {
    SnapshotError::InvalidType {
        key,
        expected: key.kind().expected(),
        found: json_type(value),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
