//! YAML configuration loading for the Tartan home
//!
//! This crate loads `tartan.yaml` (the house configuration) and snapshot
//! files, with support for the custom tags:
//!
//! - `!include path` - Include another YAML file
//! - `!secret key` - Substitute from secrets.yaml
//! - `!env_var VAR` - Environment variable substitution
//!
//! # Example
//!
//! ```ignore
//! use tartan_config::{load_snapshot, TartanConfig, YamlLoader};
//!
//! // Load and validate the house configuration
//! let config = TartanConfig::load("/etc/tartan")?;
//! let seed = config.seed_snapshot();
//!
//! // Load a snapshot file with the same tag handling
//! let mut loader = YamlLoader::new("/etc/tartan")?;
//! let state = load_snapshot(&mut loader, "state.yaml", &seed)?;
//! ```

mod error;
mod house;
mod loader;
mod secrets;
mod snapshot;

pub use error::{ConfigError, ConfigResult};
pub use house::{
    EvaluatorSection, HouseConfig, TartanConfig, CONFIG_FILE, TARGET_TEMP_RANGE,
};
pub use loader::{load_yaml, load_yaml_string, YamlLoader};
pub use secrets::{Secrets, SECRETS_FILE};
pub use snapshot::{load_snapshot, overlay_snapshot};

// Re-export serde_yaml::Value for convenience
pub use serde_yaml::Value;
