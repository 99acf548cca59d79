//! State Evaluator
//!
//! This crate derives the next state of the Tartan home from the current one.
//! Evaluation is a single synchronous pass over a fixed rule set:
//!
//! ```text
//! OLD SNAPSHOT → OCCUPANCY → ALARM DISARM → CLIMATE → (HVAC DISPATCH) → NEW SNAPSHOT
//! ```
//!
//! - **Occupancy**: a vacant house gets its light turned off and door closed
//! - **Alarm disarm**: an exact passcode disarms a sounding alarm, occupied house only
//! - **Climate**: the heater runs while the reading is below the target
//! - **HVAC dispatch**: opt-in chiller control by HVAC mode
//!
//! Each rule appends one line to the caller's [`LogSink`](tartan_core::LogSink).
//!
//! # Key Types
//!
//! - [`StateEvaluator`] - Applies the rules
//! - [`Evaluation`] - Next snapshot plus per-rule decisions
//! - [`RuleDecision`] - What a single rule decided

pub mod eval;
pub mod rule;

pub use eval::{Evaluation, EvaluatorConfig, StateEvaluator};
pub use rule::{
    AlarmDecision, ClimateDecision, DispatchDecision, OccupancyDecision, RefusalReason, Rule,
    RuleDecision,
};
