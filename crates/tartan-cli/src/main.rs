//! Tartan command line driver
//!
//! Runs one observation cycle of the home: loads the house configuration and
//! a snapshot file, evaluates the next state and prints the trace, the keys
//! that changed and the new snapshot.

mod report;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fmt;
use std::path::{Path, PathBuf};
use tartan_config::{load_snapshot, TartanConfig, YamlLoader};
use tartan_core::{StateKey, TraceLog, REDACTED};
use tartan_evaluator::{Rule, RuleDecision, StateEvaluator};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::report::Report;

#[derive(Debug, Parser)]
#[command(name = "tartan", version, about = "Evaluate the next state of the Tartan home")]
struct Cli {
    /// Log at debug level regardless of RUST_LOG
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate one cycle from a snapshot file
    Evaluate {
        /// Directory holding tartan.yaml and secrets.yaml
        #[arg(short, long, default_value = ".")]
        config: PathBuf,

        /// Snapshot file (YAML or JSON) laid over the configured defaults
        #[arg(short, long)]
        state: PathBuf,

        /// Passcode offered during this cycle
        #[arg(long)]
        passcode: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Load and validate the house configuration
    CheckConfig {
        /// Directory holding tartan.yaml and secrets.yaml
        #[arg(short, long, default_value = ".")]
        config: PathBuf,
    },

    /// List the recognized snapshot keys
    Keys,
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Evaluate {
                config,
                state,
                passcode,
                format,
            } => f
                .debug_struct("Evaluate")
                .field("config", config)
                .field("state", state)
                .field("passcode", &passcode.as_ref().map(|_| REDACTED))
                .field("format", format)
                .finish(),
            Command::CheckConfig { config } => {
                f.debug_struct("CheckConfig").field("config", config).finish()
            }
            Command::Keys => f.write_str("Keys"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;
    debug!(?cli, "Parsed arguments");

    match cli.command {
        Command::Evaluate {
            config,
            state,
            passcode,
            format,
        } => evaluate(&config, &state, passcode, format),
        Command::CheckConfig { config } => check_config(&config),
        Command::Keys => {
            list_keys();
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn evaluate(config_dir: &Path, state: &Path, passcode: Option<String>, format: Format) -> Result<()> {
    let report = run_cycle(config_dir, state, passcode)?;

    match format {
        Format::Text => print!("{}", report),
        Format::Json => println!(
            "{}",
            serde_json::to_string_pretty(&report).context("serializing report")?
        ),
    }
    Ok(())
}

fn run_cycle(config_dir: &Path, state: &Path, passcode: Option<String>) -> Result<Report> {
    let config = TartanConfig::load(config_dir)
        .with_context(|| format!("loading configuration from {}", config_dir.display()))?;

    let mut loader = YamlLoader::new(config_dir)
        .with_context(|| format!("reading secrets from {}", config_dir.display()))?;
    let state_path = absolute(state)?;
    let mut old = load_snapshot(&mut loader, &state_path, &config.seed_snapshot())
        .with_context(|| format!("loading snapshot {}", state_path.display()))?;

    if passcode.is_some() {
        old.given_passcode = passcode;
    }

    let evaluator = StateEvaluator::with_config(config.evaluator_config());
    let mut log = TraceLog::new();
    let evaluation = evaluator.evaluate_detailed(&old, &mut log);
    let disarmed = matches!(
        evaluation.decision(Rule::AlarmDisarm),
        Some(RuleDecision::AlarmDisarm(decision)) if decision.is_disarmed()
    );

    let report = Report::new(&old, evaluation, log);
    info!(
        house = %config.house.name,
        changes = report.changes.len(),
        disarmed,
        "Evaluation complete"
    );
    Ok(report)
}

fn check_config(config_dir: &Path) -> Result<()> {
    let config = TartanConfig::load(config_dir)
        .with_context(|| format!("loading configuration from {}", config_dir.display()))?;

    println!(
        "Configuration OK: {} (target {}, mode {}, hvac dispatch {})",
        config.house.name,
        config.house.target_temp,
        config.house.hvac_mode,
        if config.evaluator.hvac_dispatch { "on" } else { "off" }
    );
    Ok(())
}

fn list_keys() {
    for key in StateKey::ALL {
        let secret = if key.is_secret() { " (secret)" } else { "" };
        println!("{:<18} {}{}", key.as_str(), key.kind().expected(), secret);
    }
}

/// Snapshot paths on the command line are relative to the working directory,
/// not to the config directory the loader resolves against.
fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("reading current directory")?;
    Ok(cwd.join(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use serde_json::Value;
    use std::fs;
    use tempfile::TempDir;

    fn house(dir: &Path) {
        fs::write(dir.join("secrets.yaml"), "alarm_passcode: passcode\n").unwrap();
        fs::write(
            dir.join("tartan.yaml"),
            "house:\n  alarm_passcode: !secret alarm_passcode\n  target_temp: 25\n",
        )
        .unwrap();
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_evaluate() {
        let cli = Cli::try_parse_from([
            "tartan",
            "evaluate",
            "--config",
            "/etc/tartan",
            "--state",
            "state.yaml",
            "--passcode",
            "1234",
            "--format",
            "json",
        ])
        .unwrap();

        match cli.command {
            Command::Evaluate {
                config,
                state,
                passcode,
                format,
            } => {
                assert_eq!(config, PathBuf::from("/etc/tartan"));
                assert_eq!(state, PathBuf::from("state.yaml"));
                assert_eq!(passcode.as_deref(), Some("1234"));
                assert_eq!(format, Format::Json);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_debug_hides_offered_passcode() {
        let cli = Cli::try_parse_from([
            "tartan",
            "-v",
            "evaluate",
            "--state",
            "state.yaml",
            "--passcode",
            "hunter2",
        ])
        .unwrap();

        let shown = format!("{:?}", cli);
        assert!(!shown.contains("hunter2"));
        assert!(shown.contains(REDACTED));
        assert!(shown.contains("state.yaml"));
    }

    #[test]
    fn test_evaluate_requires_state() {
        assert!(Cli::try_parse_from(["tartan", "evaluate"]).is_err());
    }

    #[test]
    fn test_absolute_keeps_absolute_paths() {
        let path = Path::new("/tmp/state.yaml");
        assert_eq!(absolute(path).unwrap(), path);
        assert!(absolute(Path::new("state.yaml")).unwrap().is_absolute());
    }

    #[test]
    fn test_run_cycle_disarms_with_passcode() {
        let dir = TempDir::new().unwrap();
        house(dir.path());
        let state = dir.path().join("state.yaml");
        fs::write(
            &state,
            "proximity_state: true\nalarm_state: true\nalarm_active: true\ntemp_reading: 20\n",
        )
        .unwrap();

        let report = run_cycle(dir.path(), &state, Some("passcode".to_string())).unwrap();
        assert_eq!(report.state["alarm_state"], Value::Bool(false));
        assert_eq!(report.state["heater_state"], Value::Bool(true));
        assert_eq!(report.state["given_passcode"], Value::Null);
        assert!(report.log.iter().any(|l| l.contains("Alarm disarmed")));
        assert!(matches!(
            report.decisions.get(1),
            Some(RuleDecision::AlarmDisarm(decision)) if decision.is_disarmed()
        ));
    }

    #[test]
    fn test_run_cycle_vacant_house() {
        let dir = TempDir::new().unwrap();
        house(dir.path());
        let state = dir.path().join("state.yaml");
        fs::write(&state, "light_state: true\ndoor_state: true\ntemp_reading: 30\n").unwrap();

        let report = run_cycle(dir.path(), &state, None).unwrap();
        assert_eq!(report.state["light_state"], Value::Bool(false));
        assert_eq!(report.state["door_state"], Value::Bool(false));
        assert_eq!(report.state["heater_state"], Value::Bool(false));
    }

    #[test]
    fn test_run_cycle_rejects_bad_snapshot() {
        let dir = TempDir::new().unwrap();
        house(dir.path());
        let state = dir.path().join("state.yaml");
        fs::write(&state, "temp_reading: warm\n").unwrap();

        let err = run_cycle(dir.path(), &state, None).unwrap_err();
        assert!(format!("{:#}", err).contains("temp_reading"));
    }
}
