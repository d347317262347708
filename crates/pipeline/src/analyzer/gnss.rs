//! Analyze GNSS time error.

use rust_decimal::Decimal;
use serde_json::{Map, Value};

use super::engine::{Check, Verdict};
use super::window::{ErrorSample, TimeErrorWindow};
use crate::config::Config;
use crate::error::ConfigError;
use crate::parser::sources::gnss::TimeErrorSample;

impl ErrorSample for TimeErrorSample {
    fn timestamp(&self) -> Decimal {
        self.timestamp
    }

    fn error(&self) -> Decimal {
        Decimal::from(self.terror)
    }
}

/// Time-error compliance over GNSS receiver samples.
pub struct TimeErrorCheck {
    window: TimeErrorWindow,
}

impl TimeErrorCheck {
    pub const ID: &'static str = "gnss/time-error";
    pub const PARSER: &'static str = "gnss/time-error";

    // 'state' values are assumed to be u-blox gpsFix values
    // 0 = no fix
    // 1 = dead reckoning only
    // 2 = 2D-Fix
    // 3 = 3D-Fix
    // 4 = GPS + dead reckoning combined
    // 5 = time only fix
    const LOCKED: [i64; 3] = [3, 4, 5];

    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            window: TimeErrorWindow::from_config(config)?,
        })
    }
}

impl Check for TimeErrorCheck {
    type Record = TimeErrorSample;

    fn id(&self) -> &'static str {
        Self::ID
    }

    fn parser_id(&self) -> &'static str {
        Self::PARSER
    }

    fn prepare(&mut self, rows: Vec<TimeErrorSample>) -> Vec<TimeErrorSample> {
        self.window.trim_transient(rows)
    }

    fn test(&mut self, data: &[TimeErrorSample]) -> Verdict {
        self.window.test(data, |row| Self::LOCKED.contains(&row.state))
    }

    fn explain(&mut self, data: &[TimeErrorSample]) -> Map<String, Value> {
        self.window.explain(data, "terror")
    }
}
