//! Snapshot files
//!
//! A snapshot file is a YAML (or JSON) mapping from key names to values. It
//! is laid over a seed snapshot, usually the one built from the house
//! configuration, so a file only needs the readings that changed.

use serde_yaml::Value;
use std::path::Path;
use tartan_core::StateSnapshot;
use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::loader::YamlLoader;

/// Load a snapshot file and lay it over `seed`
pub fn load_snapshot(
    loader: &mut YamlLoader,
    path: impl AsRef<Path>,
    seed: &StateSnapshot,
) -> ConfigResult<StateSnapshot> {
    let path = path.as_ref();
    let yaml = loader.load_file(path)?;
    overlay_snapshot(seed, &yaml, path)
}

/// Lay the keys of a tag-processed YAML mapping over `seed`
///
/// Unrecognized keys are ignored; recognized keys must carry the right type.
pub fn overlay_snapshot(
    seed: &StateSnapshot,
    yaml: &Value,
    source_path: &Path,
) -> ConfigResult<StateSnapshot> {
    let mut merged = seed.to_map();

    match yaml {
        Value::Null => {}
        Value::Mapping(_) => {
            let json = serde_json::to_value(yaml).map_err(|e| ConfigError::InvalidValue {
                key: source_path.display().to_string(),
                reason: e.to_string(),
            })?;
            if let serde_json::Value::Object(map) = json {
                debug!(keys = map.len(), path = ?source_path, "Overlaying snapshot file");
                merged.extend(map);
            }
        }
        _ => {
            return Err(ConfigError::InvalidValue {
                key: source_path.display().to_string(),
                reason: "snapshot file must be a mapping".to_string(),
            })
        }
    }

    StateSnapshot::from_map(&merged).map_err(|source| ConfigError::Snapshot {
        path: source_path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::Secrets;
    use std::fs;
    use tartan_core::{HvacMode, SnapshotError, StateKey};
    use tempfile::TempDir;

    fn seed() -> StateSnapshot {
        StateSnapshot {
            target_temp: 22,
            hvac_mode: HvacMode::Heater,
            alarm_passcode: "passcode".to_string(),
            ..Default::default()
        }
    }

    fn overlay(yaml: &str) -> ConfigResult<StateSnapshot> {
        let value: Value = serde_yaml::from_str(yaml).unwrap();
        overlay_snapshot(&seed(), &value, Path::new("state.yaml"))
    }

    #[test]
    fn test_overlay_keeps_seed_values() {
        let snapshot = overlay("proximity_state: true\ntemp_reading: 18\n").unwrap();
        assert!(snapshot.proximity_state);
        assert_eq!(snapshot.temp_reading, 18);
        assert_eq!(snapshot.target_temp, 22);
        assert_eq!(snapshot.alarm_passcode, "passcode");
    }

    #[test]
    fn test_overlay_replaces_seed_values() {
        let snapshot = overlay("target_temp: 25\nhvac_mode: Chiller\n").unwrap();
        assert_eq!(snapshot.target_temp, 25);
        assert_eq!(snapshot.hvac_mode, HvacMode::Chiller);
    }

    #[test]
    fn test_empty_file_is_the_seed() {
        assert_eq!(overlay("").unwrap(), seed());
    }

    #[test]
    fn test_wrong_type_is_rejected() {
        let result = overlay("light_state: maybe\n");
        assert!(matches!(
            result,
            Err(ConfigError::Snapshot {
                source: SnapshotError::InvalidType { key: StateKey::LightState, .. },
                ..
            })
        ));
    }

    #[test]
    fn test_sequence_is_rejected() {
        let result = overlay("- light_state\n");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_load_snapshot_with_secret_passcode() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("state.yaml"),
            "proximity_state: true\ngiven_passcode: !secret attempt\n",
        )
        .unwrap();

        let mut loader =
            YamlLoader::with_secrets(dir.path(), Secrets::from_pairs([("attempt", "passcode")]));
        let snapshot = load_snapshot(&mut loader, "state.yaml", &seed()).unwrap();
        assert_eq!(snapshot.given_passcode.as_deref(), Some("passcode"));
    }
}
