//! Rule and decision types
//!
//! Every rule the evaluator applies produces a typed decision. The decision's
//! `Display` output is the line appended to the trace log.

use serde::{Deserialize, Serialize};
use std::fmt;
use tartan_core::HvacMode;

/// A rule group, in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    /// Vacancy turns the light off and closes the door
    Occupancy,

    /// Offered passcode may disarm a sounding alarm
    AlarmDisarm,

    /// Heater follows the temperature threshold
    Climate,

    /// Chiller follows the HVAC mode (opt-in)
    HvacDispatch,
}

impl Rule {
    /// All rules in the order they are applied
    pub const ORDER: [Rule; 4] = [
        Rule::Occupancy,
        Rule::AlarmDisarm,
        Rule::Climate,
        Rule::HvacDispatch,
    ];

    /// Short rule name used in diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            Rule::Occupancy => "occupancy",
            Rule::AlarmDisarm => "alarm_disarm",
            Rule::Climate => "climate",
            Rule::HvacDispatch => "hvac_dispatch",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of the occupancy rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "occupancy", rename_all = "snake_case")]
pub enum OccupancyDecision {
    /// Nobody home: light and door were forced off
    Vacant {
        light_was_on: bool,
        door_was_open: bool,
    },

    /// Someone home: light and door kept as requested
    Occupied { light: bool, door: bool },
}

impl fmt::Display for OccupancyDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OccupancyDecision::Vacant {
                light_was_on,
                door_was_open,
            } => write!(
                f,
                "House is vacant: light turned off and door closed (light was {}, door was {})",
                on_off(*light_was_on),
                open_closed(*door_was_open)
            ),
            OccupancyDecision::Occupied { light, door } => write!(
                f,
                "House is occupied: light stays {}, door stays {}",
                on_off(*light),
                open_closed(*door)
            ),
        }
    }
}

/// Why an offered passcode did not disarm the alarm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefusalReason {
    /// Disarming is only allowed from inside an occupied house
    VacantHouse,

    /// There is nothing to disarm unless the alarm is sounding
    AlarmInactive,

    /// Offered passcode is not an exact match
    BadPasscode,
}

impl fmt::Display for RefusalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RefusalReason::VacantHouse => "house is vacant",
            RefusalReason::AlarmInactive => "alarm is not active",
            RefusalReason::BadPasscode => "incorrect passcode",
        })
    }
}

/// Outcome of the alarm disarm rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "alarm", rename_all = "snake_case")]
pub enum AlarmDecision {
    /// No passcode offered; alarm flags carried over
    NoAttempt { armed: bool, active: bool },

    /// Correct passcode in an occupied house with a sounding alarm
    Disarmed,

    /// Passcode offered but the alarm stays armed
    Refused { reason: RefusalReason, active: bool },
}

impl AlarmDecision {
    /// Check if this decision disarmed the alarm
    pub fn is_disarmed(&self) -> bool {
        matches!(self, AlarmDecision::Disarmed)
    }
}

impl fmt::Display for AlarmDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlarmDecision::NoAttempt { armed, active } => write!(
                f,
                "No passcode offered: alarm stays {} and {}",
                if *armed { "armed" } else { "disarmed" },
                if *active { "active" } else { "inactive" }
            ),
            AlarmDecision::Disarmed => {
                f.write_str("Alarm disarmed: correct passcode entered in occupied house")
            }
            AlarmDecision::Refused { reason, active } => write!(
                f,
                "Alarm remains armed: {} (alarm {})",
                reason,
                if *active { "still active" } else { "inactive" }
            ),
        }
    }
}

/// Outcome of the heater threshold rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClimateDecision {
    pub heater_on: bool,
    pub reading: i32,
    pub target: i32,
}

impl fmt::Display for ClimateDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.heater_on {
            write!(
                f,
                "Heater on: temperature {} is below target {}",
                self.reading, self.target
            )
        } else {
            write!(
                f,
                "Heater off: temperature {} is at or above target {}",
                self.reading, self.target
            )
        }
    }
}

/// Outcome of the HVAC mode dispatch rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchDecision {
    pub mode: HvacMode,
    pub chiller_on: bool,
    pub reading: i32,
    pub target: i32,
}

impl fmt::Display for DispatchDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HVAC mode {}: chiller {} (temperature {}, target {})",
            self.mode,
            on_off(self.chiller_on),
            self.reading,
            self.target
        )
    }
}

/// Decision produced by any rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", content = "decision", rename_all = "snake_case")]
pub enum RuleDecision {
    Occupancy(OccupancyDecision),
    AlarmDisarm(AlarmDecision),
    Climate(ClimateDecision),
    HvacDispatch(DispatchDecision),
}

impl RuleDecision {
    /// The rule that produced this decision
    pub fn rule(&self) -> Rule {
        match self {
            RuleDecision::Occupancy(_) => Rule::Occupancy,
            RuleDecision::AlarmDisarm(_) => Rule::AlarmDisarm,
            RuleDecision::Climate(_) => Rule::Climate,
            RuleDecision::HvacDispatch(_) => Rule::HvacDispatch,
        }
    }
}

impl fmt::Display for RuleDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleDecision::Occupancy(d) => fmt::Display::fmt(d, f),
            RuleDecision::AlarmDisarm(d) => fmt::Display::fmt(d, f),
            RuleDecision::Climate(d) => fmt::Display::fmt(d, f),
            RuleDecision::HvacDispatch(d) => fmt::Display::fmt(d, f),
        }
    }
}

fn on_off(on: bool) -> &'static str {
    if on {
        "on"
    } else {
        "off"
    }
}

fn open_closed(open: bool) -> &'static str {
    if open {
        "open"
    } else {
        "closed"
    }
}
