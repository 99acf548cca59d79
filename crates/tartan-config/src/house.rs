//! House configuration
//!
//! Parses `tartan.yaml`:
//!
//! ```yaml
//! house:
//!   name: Tartan Home
//!   alarm_passcode: !secret alarm_passcode
//!   target_temp: 22
//!   hvac_mode: Heater
//! evaluator:
//!   hvac_dispatch: false
//! ```

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::fmt;
use std::ops::RangeInclusive;
use std::path::Path;
use tartan_core::{HvacMode, StateSnapshot};
use tartan_evaluator::EvaluatorConfig;
use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::loader::load_yaml;

/// Main configuration file in the config directory
pub const CONFIG_FILE: &str = "tartan.yaml";

/// Target temperatures the house accepts
pub const TARGET_TEMP_RANGE: RangeInclusive<i32> = -50..=60;

/// The `house:` section
#[derive(Clone, Serialize, Deserialize)]
pub struct HouseConfig {
    /// Display name of the house
    #[serde(default = "default_name")]
    pub name: String,

    /// Stored passcode that disarms the alarm
    pub alarm_passcode: String,

    /// Temperature the HVAC should hold
    #[serde(default = "default_target_temp")]
    pub target_temp: i32,

    /// HVAC mode the house starts in
    #[serde(default = "default_hvac_mode")]
    pub hvac_mode: HvacMode,
}

fn default_name() -> String {
    "Tartan Home".to_string()
}

fn default_target_temp() -> i32 {
    22
}

fn default_hvac_mode() -> HvacMode {
    HvacMode::Heater
}

impl fmt::Debug for HouseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HouseConfig")
            .field("name", &self.name)
            .field("alarm_passcode", &tartan_core::REDACTED)
            .field("target_temp", &self.target_temp)
            .field("hvac_mode", &self.hvac_mode)
            .finish()
    }
}

/// The `evaluator:` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvaluatorSection {
    /// Drive the chiller from the HVAC mode
    #[serde(default)]
    pub hvac_dispatch: bool,
}

impl From<&EvaluatorSection> for EvaluatorConfig {
    fn from(section: &EvaluatorSection) -> Self {
        EvaluatorConfig {
            hvac_dispatch: section.hvac_dispatch,
        }
    }
}

/// Complete `tartan.yaml`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TartanConfig {
    pub house: HouseConfig,

    #[serde(default)]
    pub evaluator: EvaluatorSection,
}

impl TartanConfig {
    /// Load and validate `tartan.yaml` from a config directory
    pub fn load(config_dir: impl AsRef<Path>) -> ConfigResult<Self> {
        let config_dir = config_dir.as_ref();
        let yaml = load_yaml(config_dir, CONFIG_FILE)?;

        let config = Self::from_yaml(&yaml)?;
        config.validate()?;
        debug!(house = %config.house.name, "Loaded house configuration");
        Ok(config)
    }

    /// Parse configuration from an already tag-processed YAML value
    pub fn from_yaml(yaml: &Value) -> ConfigResult<Self> {
        if !yaml.is_mapping() {
            return Err(ConfigError::InvalidValue {
                key: "root".to_string(),
                reason: "configuration must be a mapping".to_string(),
            });
        }

        let section = yaml.get("house").ok_or_else(|| ConfigError::ValidationFailed {
            message: "missing 'house' section".to_string(),
        })?;
        if !section.is_mapping() {
            return Err(ConfigError::InvalidValue {
                key: "house".to_string(),
                reason: "section must be a mapping".to_string(),
            });
        }

        serde_yaml::from_value(yaml.clone()).map_err(|e| ConfigError::InvalidValue {
            key: CONFIG_FILE.to_string(),
            reason: e.to_string(),
        })
    }

    /// Check values serde cannot check
    pub fn validate(&self) -> ConfigResult<()> {
        if self.house.alarm_passcode.is_empty() {
            return Err(ConfigError::ValidationFailed {
                message: "house.alarm_passcode must not be empty".to_string(),
            });
        }

        if !TARGET_TEMP_RANGE.contains(&self.house.target_temp) {
            return Err(ConfigError::InvalidValue {
                key: "house.target_temp".to_string(),
                reason: format!(
                    "{} is outside {}..={}",
                    self.house.target_temp,
                    TARGET_TEMP_RANGE.start(),
                    TARGET_TEMP_RANGE.end()
                ),
            });
        }

        Ok(())
    }

    /// Snapshot holding the configured passcode, target and mode
    pub fn seed_snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            target_temp: self.house.target_temp,
            hvac_mode: self.house.hvac_mode.clone(),
            alarm_passcode: self.house.alarm_passcode.clone(),
            ..Default::default()
        }
    }

    /// Evaluator settings from the `evaluator:` section
    pub fn evaluator_config(&self) -> EvaluatorConfig {
        EvaluatorConfig::from(&self.evaluator)
    }
}
