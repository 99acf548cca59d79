//! State evaluation logic
//!
//! The evaluator takes the snapshot observed during one cycle and derives the
//! next snapshot by applying the rule groups in [`Rule::ORDER`]. Every rule
//! reads the old snapshot only and writes into a copy, so the caller's
//! snapshot is never touched and rule order only affects the trace.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tartan_core::{HvacMode, LogSink, SnapshotError, StateSnapshot};
use tracing::{debug, info, trace, warn};

use crate::rule::{
    AlarmDecision, ClimateDecision, DispatchDecision, OccupancyDecision, RefusalReason, Rule,
    RuleDecision,
};

/// Evaluator settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluatorConfig {
    /// Drive the chiller from the HVAC mode after the heater rule
    #[serde(default)]
    pub hvac_dispatch: bool,
}

/// Result of one evaluation: the next snapshot plus what each rule decided
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub state: StateSnapshot,
    pub decisions: Vec<RuleDecision>,
}

impl Evaluation {
    /// Decision recorded for a rule, if the rule ran
    pub fn decision(&self, rule: Rule) -> Option<&RuleDecision> {
        self.decisions.iter().find(|d| d.rule() == rule)
    }
}

/// State evaluator
///
/// A pure function of the old snapshot: no I/O, no state kept between calls.
/// The only side effect is appending one line per rule to the log sink.
#[derive(Debug, Clone, Default)]
pub struct StateEvaluator {
    config: EvaluatorConfig,
}

impl StateEvaluator {
    /// Create an evaluator with the default rule set
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an evaluator with explicit settings
    pub fn with_config(config: EvaluatorConfig) -> Self {
        Self { config }
    }

    /// Current settings
    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Evaluate the next state
    ///
    /// Returns a new snapshot; `old_state` is left as it was.
    pub fn evaluate_state(&self, old_state: &StateSnapshot, log: &mut dyn LogSink) -> StateSnapshot {
        self.evaluate_detailed(old_state, log).state
    }

    /// Evaluate the next state, also returning each rule's decision
    pub fn evaluate_detailed(&self, old_state: &StateSnapshot, log: &mut dyn LogSink) -> Evaluation {
        let mut next = old_state.clone();
        let mut decisions = Vec::with_capacity(Rule::ORDER.len());

        for rule in self.active_rules() {
            let decision = self.apply(rule, old_state, &mut next);
            debug!(rule = rule.name(), decision = %decision, "Rule applied");
            log.append(&decision.to_string());
            decisions.push(decision);
        }

        Evaluation {
            state: next,
            decisions,
        }
    }

    /// Evaluate a loosely-typed name → value map
    ///
    /// The map is validated into a [`StateSnapshot`] first; the returned map
    /// contains every recognized key.
    pub fn evaluate_map(
        &self,
        old_state: &Map<String, Value>,
        log: &mut dyn LogSink,
    ) -> Result<Map<String, Value>, SnapshotError> {
        let snapshot = StateSnapshot::from_map(old_state)?;
        Ok(self.evaluate_state(&snapshot, log).to_map())
    }

    fn active_rules(&self) -> impl Iterator<Item = Rule> + '_ {
        Rule::ORDER
            .into_iter()
            .filter(move |rule| *rule != Rule::HvacDispatch || self.config.hvac_dispatch)
    }

    fn apply(&self, rule: Rule, old: &StateSnapshot, next: &mut StateSnapshot) -> RuleDecision {
        match rule {
            Rule::Occupancy => RuleDecision::Occupancy(self.eval_occupancy(old, next)),
            Rule::AlarmDisarm => RuleDecision::AlarmDisarm(self.eval_alarm(old, next)),
            Rule::Climate => RuleDecision::Climate(self.eval_climate(old, next)),
            Rule::HvacDispatch => RuleDecision::HvacDispatch(self.eval_dispatch(old, next)),
        }
    }

    /// Vacancy forces the light off and the door closed. An occupied house
    /// keeps whatever was requested; this rule never turns anything on.
    fn eval_occupancy(&self, old: &StateSnapshot, next: &mut StateSnapshot) -> OccupancyDecision {
        trace!(
            proximity = old.proximity_state,
            light = old.light_state,
            door = old.door_state,
            "Evaluating occupancy"
        );

        if old.proximity_state {
            return OccupancyDecision::Occupied {
                light: old.light_state,
                door: old.door_state,
            };
        }

        next.light_state = false;
        next.door_state = false;
        OccupancyDecision::Vacant {
            light_was_on: old.light_state,
            door_was_open: old.door_state,
        }
    }

    /// Disarm only when the house is occupied, the alarm is sounding and the
    /// offered passcode matches exactly. Any offered passcode is consumed.
    fn eval_alarm(&self, old: &StateSnapshot, next: &mut StateSnapshot) -> AlarmDecision {
        next.given_passcode = None;

        let Some(given) = old.given_passcode.as_deref() else {
            trace!("No passcode offered");
            return AlarmDecision::NoAttempt {
                armed: old.alarm_state,
                active: old.alarm_active,
            };
        };

        let refusal = if !old.proximity_state {
            Some(RefusalReason::VacantHouse)
        } else if !old.alarm_active {
            Some(RefusalReason::AlarmInactive)
        } else if !passcode_matches(given, &old.alarm_passcode) {
            Some(RefusalReason::BadPasscode)
        } else {
            None
        };

        match refusal {
            None => {
                info!("Alarm disarmed");
                next.alarm_state = false;
                next.alarm_active = false;
                AlarmDecision::Disarmed
            }
            Some(reason) => {
                if reason == RefusalReason::BadPasscode {
                    warn!("Alarm disarm attempted with incorrect passcode");
                } else {
                    debug!(%reason, "Alarm disarm refused");
                }
                next.alarm_state = true;
                AlarmDecision::Refused {
                    reason,
                    active: old.alarm_active,
                }
            }
        }
    }

    /// Heater runs exactly when the reading is below the target.
    fn eval_climate(&self, old: &StateSnapshot, next: &mut StateSnapshot) -> ClimateDecision {
        let heater_on = old.temp_reading < old.target_temp;
        trace!(
            reading = old.temp_reading,
            target = old.target_temp,
            heater_on,
            "Evaluating heater threshold"
        );

        next.heater_state = heater_on;
        ClimateDecision {
            heater_on,
            reading: old.temp_reading,
            target: old.target_temp,
        }
    }

    /// Chiller runs only in chiller mode above the target. The heater
    /// decision is left alone, so both can never be on at once.
    fn eval_dispatch(&self, old: &StateSnapshot, next: &mut StateSnapshot) -> DispatchDecision {
        let chiller_on = old.hvac_mode == HvacMode::Chiller && old.temp_reading > old.target_temp;
        trace!(mode = %old.hvac_mode, chiller_on, "Evaluating HVAC dispatch");

        next.chiller_state = chiller_on;
        DispatchDecision {
            mode: old.hvac_mode.clone(),
            chiller_on,
            reading: old.temp_reading,
            target: old.target_temp,
        }
    }
}

/// Exact byte-for-byte passcode match; an empty offer never matches.
///
/// Plain equality, not a constant-time comparison, against a plaintext
/// passcode. Only suitable for the simulated home.
fn passcode_matches(given: &str, stored: &str) -> bool {
    !given.is_empty() && given.as_bytes() == stored.as_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tartan_core::TraceLog;

    fn base_state() -> StateSnapshot {
        StateSnapshot {
            temp_reading: 25,
            target_temp: 25,
            hvac_mode: HvacMode::Heater,
            alarm_passcode: "passcode".to_string(),
            ..Default::default()
        }
    }

    fn disarm_attempt(given: &str) -> StateSnapshot {
        StateSnapshot {
            proximity_state: true,
            alarm_active: true,
            alarm_state: false,
            given_passcode: Some(given.to_string()),
            ..base_state()
        }
    }

    #[test]
    fn test_vacant_house_closes_light_and_door() {
        let evaluator = StateEvaluator::new();
        let old = StateSnapshot {
            light_state: true,
            door_state: true,
            ..base_state()
        };

        let mut log = TraceLog::new();
        let new = evaluator.evaluate_state(&old, &mut log);

        assert!(!new.light_state);
        assert!(!new.door_state);
        assert!(!new.proximity_state);
        // input untouched
        assert!(old.light_state);
        assert!(old.door_state);
        assert!(log.entries()[0].starts_with("House is vacant"));
    }

    #[test]
    fn test_occupied_house_keeps_requests() {
        let evaluator = StateEvaluator::new();
        for (light, door) in [(false, false), (true, false), (false, true), (true, true)] {
            let old = StateSnapshot {
                proximity_state: true,
                light_state: light,
                door_state: door,
                ..base_state()
            };
            let new = evaluator.evaluate_state(&old, &mut TraceLog::new());
            assert_eq!(new.light_state, light);
            assert_eq!(new.door_state, door);
        }
    }

    #[test]
    fn test_correct_passcode_disarms() {
        let evaluator = StateEvaluator::new();
        let eval = evaluator.evaluate_detailed(&disarm_attempt("passcode"), &mut TraceLog::new());

        assert!(!eval.state.alarm_state);
        assert!(!eval.state.alarm_active);
        assert_eq!(
            eval.decision(Rule::AlarmDisarm),
            Some(&RuleDecision::AlarmDisarm(AlarmDecision::Disarmed))
        );
    }

    #[test]
    fn test_refusal_reasons_in_order() {
        let evaluator = StateEvaluator::new();
        let cases = [
            (
                StateSnapshot {
                    proximity_state: false,
                    alarm_active: false,
                    ..disarm_attempt("wrong")
                },
                RefusalReason::VacantHouse,
            ),
            (
                StateSnapshot {
                    alarm_active: false,
                    ..disarm_attempt("wrong")
                },
                RefusalReason::AlarmInactive,
            ),
            (disarm_attempt("wrong"), RefusalReason::BadPasscode),
        ];

        for (old, expected) in cases {
            let eval = evaluator.evaluate_detailed(&old, &mut TraceLog::new());
            assert!(eval.state.alarm_state);
            assert_eq!(eval.state.alarm_active, old.alarm_active);
            assert_eq!(
                eval.decision(Rule::AlarmDisarm),
                Some(&RuleDecision::AlarmDisarm(AlarmDecision::Refused {
                    reason: expected,
                    active: old.alarm_active,
                }))
            );
        }
    }

    #[test]
    fn test_no_passcode_leaves_alarm_alone() {
        let evaluator = StateEvaluator::new();
        for (armed, active) in [(false, false), (true, false), (true, true), (false, true)] {
            let old = StateSnapshot {
                proximity_state: true,
                alarm_state: armed,
                alarm_active: active,
                ..base_state()
            };
            let new = evaluator.evaluate_state(&old, &mut TraceLog::new());
            assert_eq!(new.alarm_state, armed);
            assert_eq!(new.alarm_active, active);
        }
    }

    #[test]
    fn test_offered_passcode_is_consumed() {
        let evaluator = StateEvaluator::new();
        let old = disarm_attempt("nope");
        let new = evaluator.evaluate_state(&old, &mut TraceLog::new());
        assert_eq!(new.given_passcode, None);
        assert_eq!(old.given_passcode.as_deref(), Some("nope"));
    }

    #[test]
    fn test_empty_passcode_never_matches() {
        assert!(!passcode_matches("", ""));
        assert!(!passcode_matches("", "passcode"));
        assert!(passcode_matches("passcode", "passcode"));
        assert!(!passcode_matches("passcod", "passcode"));
        assert!(!passcode_matches("passcode ", "passcode"));
    }

    #[test]
    fn test_heater_threshold() {
        let evaluator = StateEvaluator::new();
        let cases = [(20, 25, true), (25, 20, false), (25, 25, false), (-5, -4, true)];
        for (reading, target, expected) in cases {
            let old = StateSnapshot {
                temp_reading: reading,
                target_temp: target,
                ..base_state()
            };
            let new = evaluator.evaluate_state(&old, &mut TraceLog::new());
            assert_eq!(new.heater_state, expected, "reading {reading} target {target}");
        }
    }

    #[test]
    fn test_dispatch_disabled_by_default() {
        let evaluator = StateEvaluator::new();
        let old = StateSnapshot {
            hvac_mode: HvacMode::Chiller,
            temp_reading: 30,
            target_temp: 20,
            chiller_state: false,
            ..base_state()
        };

        let eval = evaluator.evaluate_detailed(&old, &mut TraceLog::new());
        assert!(!eval.state.chiller_state);
        assert_eq!(eval.decisions.len(), 3);
        assert!(eval.decision(Rule::HvacDispatch).is_none());
    }

    #[test]
    fn test_dispatch_drives_chiller_in_chiller_mode() {
        let evaluator = StateEvaluator::with_config(EvaluatorConfig { hvac_dispatch: true });
        let hot = StateSnapshot {
            hvac_mode: HvacMode::Chiller,
            temp_reading: 30,
            target_temp: 20,
            ..base_state()
        };

        let new = evaluator.evaluate_state(&hot, &mut TraceLog::new());
        assert!(new.chiller_state);
        assert!(!new.heater_state);

        let heater_mode = StateSnapshot {
            hvac_mode: HvacMode::Heater,
            chiller_state: true,
            ..hot
        };
        let new = evaluator.evaluate_state(&heater_mode, &mut TraceLog::new());
        assert!(!new.chiller_state);
    }

    #[test]
    fn test_one_log_line_per_rule_in_order() {
        let evaluator = StateEvaluator::with_config(EvaluatorConfig { hvac_dispatch: true });
        let mut log = TraceLog::new();
        evaluator.evaluate_state(&disarm_attempt("passcode"), &mut log);

        let entries = log.entries();
        assert_eq!(entries.len(), 4);
        assert!(entries[0].starts_with("House is occupied"));
        assert!(entries[1].starts_with("Alarm disarmed"));
        assert!(entries[2].starts_with("Heater off"));
        assert!(entries[3].starts_with("HVAC mode Heater"));
    }

    #[test]
    fn test_log_never_contains_passcodes() {
        let evaluator = StateEvaluator::new();
        let mut log = String::new();
        evaluator.evaluate_state(&disarm_attempt("hunter2"), &mut log);
        evaluator.evaluate_state(&disarm_attempt("passcode"), &mut log);
        assert!(!log.contains("hunter2"));
        assert!(!log.contains("passcode\n"));
        assert!(!log.contains("\"passcode\""));
    }

    #[test]
    fn test_evaluate_map() {
        let evaluator = StateEvaluator::new();
        let old = match serde_json::json!({
            "proximity_state": false,
            "light_state": true,
            "temp_reading": 18,
            "target_temp": 21,
            "unrelated": [1, 2, 3]
        }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };

        let new = evaluator.evaluate_map(&old, &mut TraceLog::new()).unwrap();
        assert_eq!(new["light_state"], Value::Bool(false));
        assert_eq!(new["heater_state"], Value::Bool(true));
        assert!(!new.contains_key("unrelated"));
    }

    #[test]
    fn test_evaluate_map_rejects_bad_types() {
        let evaluator = StateEvaluator::new();
        let mut old = Map::new();
        old.insert("proximity_state".to_string(), Value::from("yes"));
        assert!(evaluator.evaluate_map(&old, &mut TraceLog::new()).is_err());
    }
}
