//! Analyze grandmaster clock-class reporting.
//!
//! Validates the sequence of clock-class codes a grandmaster announces
//! against the legal state-transition graph, counting samples per state and
//! transitions between states along the way.

use rust_decimal::Decimal;
use serde_json::{Map, Value};

use super::engine::{Check, Verdict};
use super::stats::{decimal_number, timestamp_value};
use crate::config::Config;
use crate::error::ConfigError;
use crate::parser::sources::pmc::ClockClassSample;

/// Grandmaster clock states, keyed by wire clock-class code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockState {
    Freerun,
    Locked,
    HoldoverInSpec,
    HoldoverOutSpec1,
    HoldoverOutSpec2,
    HoldoverOutSpec3,
}

impl ClockState {
    pub const ALL: [ClockState; 6] = [
        ClockState::Freerun,
        ClockState::Locked,
        ClockState::HoldoverInSpec,
        ClockState::HoldoverOutSpec1,
        ClockState::HoldoverOutSpec2,
        ClockState::HoldoverOutSpec3,
    ];

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            248 => Some(ClockState::Freerun),
            6 => Some(ClockState::Locked),
            7 => Some(ClockState::HoldoverInSpec),
            140 => Some(ClockState::HoldoverOutSpec1),
            150 => Some(ClockState::HoldoverOutSpec2),
            160 => Some(ClockState::HoldoverOutSpec3),
            _ => None,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            ClockState::Freerun => 248,
            ClockState::Locked => 6,
            ClockState::HoldoverInSpec => 7,
            ClockState::HoldoverOutSpec1 => 140,
            ClockState::HoldoverOutSpec2 => 150,
            ClockState::HoldoverOutSpec3 => 160,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ClockState::Freerun => "FREERUN",
            ClockState::Locked => "LOCKED",
            ClockState::HoldoverInSpec => "HOLDOVER_IN_SPEC",
            ClockState::HoldoverOutSpec1 => "HOLDOVER_OUT_SPEC1",
            ClockState::HoldoverOutSpec2 => "HOLDOVER_OUT_SPEC2",
            ClockState::HoldoverOutSpec3 => "HOLDOVER_OUT_SPEC3",
        }
    }

    fn index(self) -> usize {
        match self {
            ClockState::Freerun => 0,
            ClockState::Locked => 1,
            ClockState::HoldoverInSpec => 2,
            ClockState::HoldoverOutSpec1 => 3,
            ClockState::HoldoverOutSpec2 => 4,
            ClockState::HoldoverOutSpec3 => 5,
        }
    }

    /// Legal next states, self-transitions included.
    pub fn may_transition_to(self, next: ClockState) -> bool {
        match self {
            ClockState::Freerun => {
                matches!(next, ClockState::Freerun | ClockState::Locked)
            }
            ClockState::Locked => {
                matches!(next, ClockState::Locked | ClockState::HoldoverInSpec)
            }
            ClockState::HoldoverInSpec => matches!(
                next,
                ClockState::Locked
                    | ClockState::HoldoverInSpec
                    | ClockState::HoldoverOutSpec1
                    | ClockState::HoldoverOutSpec2
                    | ClockState::HoldoverOutSpec3
            ),
            ClockState::HoldoverOutSpec1
            | ClockState::HoldoverOutSpec2
            | ClockState::HoldoverOutSpec3 => matches!(
                next,
                ClockState::Locked
                    | ClockState::HoldoverOutSpec1
                    | ClockState::HoldoverOutSpec2
                    | ClockState::HoldoverOutSpec3
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct StateCounters {
    samples: u64,
    transitions: [u64; 6],
}

/// Clock-class state machine compliance over grandmaster samples.
pub struct ClockStateCheck {
    duration_min: Decimal,
    transition_count: u64,
    counters: [StateCounters; 6],
}

impl ClockStateCheck {
    pub const ID: &'static str = "phc/gm-settings";
    pub const PARSER: &'static str = "phc/gm-settings";

    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            duration_min: config.parameter("min-test-duration/s")?,
            transition_count: 0,
            counters: [StateCounters::default(); 6],
        })
    }

    fn class_counts(&self) -> Map<String, Value> {
        let mut map = Map::new();
        for state in ClockState::ALL {
            let counters = &self.counters[state.index()];
            let mut transitions = Map::new();
            for next in ClockState::ALL {
                transitions.insert(
                    next.name().to_string(),
                    Value::from(counters.transitions[next.index()]),
                );
            }
            let mut entry = Map::new();
            entry.insert("count".to_string(), Value::from(counters.samples));
            entry.insert("transitions".to_string(), Value::Object(transitions));
            map.insert(state.name().to_string(), Value::Object(entry));
        }
        map
    }
}

impl Check for ClockStateCheck {
    type Record = ClockClassSample;

    fn id(&self) -> &'static str {
        Self::ID
    }

    fn parser_id(&self) -> &'static str {
        Self::PARSER
    }

    fn test(&mut self, data: &[ClockClassSample]) -> Verdict {
        let (Some(first), Some(last)) = (data.first(), data.last()) else {
            return Verdict::failing("no data");
        };
        if last.timestamp - first.timestamp < self.duration_min {
            return Verdict::failing("short test duration");
        }
        // assumes one sample per second
        if Decimal::from(data.len() - 1) < self.duration_min {
            return Verdict::failing("short test samples");
        }

        let mut state: Option<ClockState> = None;
        let mut illegal = false;
        for row in data {
            let next = ClockState::from_code(row.clock_class);
            match state {
                // the first recognized class seeds the walk
                None if next.is_some() => state = next,
                current => {
                    if current.map(ClockState::code) != Some(row.clock_class) {
                        self.transition_count += 1;
                    }
                    let Some(next) = next else {
                        return Verdict::failing(format!(
                            "wrong clock class {}",
                            row.clock_class
                        ));
                    };
                    if let Some(current) = current {
                        if !current.may_transition_to(next) {
                            // keep walking so the full histogram is reported
                            illegal = true;
                        }
                        self.counters[current.index()].transitions[next.index()] += 1;
                        state = Some(next);
                        self.counters[next.index()].samples += 1;
                    }
                }
            }
        }
        if illegal {
            return Verdict::failing("illegal state transition");
        }
        Verdict::passing()
    }

    fn explain(&mut self, data: &[ClockClassSample]) -> Map<String, Value> {
        let (Some(first), Some(last)) = (data.first(), data.last()) else {
            return Map::new();
        };
        let mut map = Map::new();
        map.insert("timestamp".to_string(), timestamp_value(first.timestamp));
        map.insert(
            "duration".to_string(),
            decimal_number(last.timestamp - first.timestamp),
        );
        map.insert(
            "clock_class_count".to_string(),
            Value::Object(self.class_counts()),
        );
        map.insert(
            "total_transitions".to_string(),
            Value::from(self.transition_count),
        );
        map
    }
}
