//! Output of one evaluation cycle

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use tartan_core::{StateChange, StateKey, StateSnapshot, TraceLog, REDACTED};
use tartan_evaluator::{Evaluation, RuleDecision};

/// What `tartan evaluate` prints. Secret values never leave this struct.
#[derive(Debug, Serialize)]
pub struct Report {
    pub state: Map<String, Value>,
    pub changes: Vec<StateChange>,
    pub decisions: Vec<RuleDecision>,
    pub log: Vec<String>,
}

impl Report {
    pub fn new(old: &StateSnapshot, evaluation: Evaluation, log: TraceLog) -> Self {
        Self {
            state: redacted_map(&evaluation.state),
            changes: old
                .changes(&evaluation.state)
                .iter()
                .map(StateChange::redacted)
                .collect(),
            decisions: evaluation.decisions,
            log: log.into_entries(),
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Log:")?;
        for entry in &self.log {
            writeln!(f, "  {}", entry)?;
        }

        writeln!(f, "Changes:")?;
        if self.changes.is_empty() {
            writeln!(f, "  (none)")?;
        }
        for change in &self.changes {
            writeln!(f, "  {}", change)?;
        }

        writeln!(f, "State:")?;
        for key in StateKey::ALL {
            if let Some(value) = self.state.get(key.as_str()) {
                writeln!(f, "  {:<18} {}", key.as_str(), value)?;
            }
        }
        Ok(())
    }
}

fn redacted_map(snapshot: &StateSnapshot) -> Map<String, Value> {
    let mut map = snapshot.to_map();
    for key in StateKey::ALL.iter().filter(|k| k.is_secret()) {
        if let Some(value) = map.get_mut(key.as_str()) {
            if !value.is_null() {
                *value = Value::String(REDACTED.to_string());
            }
        }
    }
    map
}
