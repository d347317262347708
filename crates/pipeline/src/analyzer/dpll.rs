//! Analyze DPLL phase-offset time error.

use rust_decimal::Decimal;
use serde_json::{Map, Value};

use super::engine::{Check, Verdict};
use super::window::{ErrorSample, TimeErrorWindow};
use crate::config::Config;
use crate::error::ConfigError;
use crate::parser::sources::dpll::PhaseOffsetSample;

impl ErrorSample for PhaseOffsetSample {
    fn timestamp(&self) -> Decimal {
        self.timestamp
    }

    fn error(&self) -> Decimal {
        self.phaseoffset
    }
}

/// Time-error compliance over DPLL phase-offset samples.
pub struct PhaseOffsetCheck {
    window: TimeErrorWindow,
}

impl PhaseOffsetCheck {
    pub const ID: &'static str = "ppsdpll/phase-offset-time-error";
    pub const PARSER: &'static str = "dpll/phase-offset";

    // phase state 3 is locked with holdover acquired
    const LOCKED: [i64; 1] = [3];

    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            window: TimeErrorWindow::from_config(config)?,
        })
    }
}

impl Check for PhaseOffsetCheck {
    type Record = PhaseOffsetSample;

    fn id(&self) -> &'static str {
        Self::ID
    }

    fn parser_id(&self) -> &'static str {
        Self::PARSER
    }

    fn prepare(&mut self, rows: Vec<PhaseOffsetSample>) -> Vec<PhaseOffsetSample> {
        self.window.trim_transient(rows)
    }

    fn test(&mut self, data: &[PhaseOffsetSample]) -> Verdict {
        self.window
            .test(data, |row| Self::LOCKED.contains(&row.phasestate))
    }

    fn explain(&mut self, data: &[PhaseOffsetSample]) -> Map<String, Value> {
        self.window.explain(data, "phaseoffset")
    }
}
