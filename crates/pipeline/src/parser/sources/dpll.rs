//! Parse dpll log messages.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::parser::traits::{LineParser, Record};
use crate::parser::{fields_exact, parse_int};
use crate::timestamp::{parse_decimal, parse_timestamp};

/// One DPLL phase-offset sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseOffsetSample {
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub timestamp: Decimal,
    pub eecstate: i64,
    pub phasestate: i64,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub phaseoffset: Decimal,
}

impl Record for PhaseOffsetSample {
    fn timestamp(&self) -> Decimal {
        self.timestamp
    }

    fn with_timestamp(mut self, timestamp: Decimal) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Parse phase offset from a dpll CSV sample.
pub struct PhaseOffsetParser;

impl PhaseOffsetParser {
    pub const ID: &'static str = "dpll/phase-offset";
}

impl LineParser for PhaseOffsetParser {
    type Record = PhaseOffsetSample;

    fn id(&self) -> &'static str {
        Self::ID
    }

    fn parse_line(&self, line: &str) -> Result<Option<PhaseOffsetSample>, ParseError> {
        // DPLL samples come from a fixed format CSV capture
        let fields = fields_exact(line, 4)?;
        Ok(Some(PhaseOffsetSample {
            timestamp: parse_timestamp(fields[0])?,
            eecstate: parse_int(fields[1])?,
            phasestate: parse_int(fields[2])?,
            phaseoffset: parse_decimal(fields[3])?,
        }))
    }
}

/// One DPLL time-error sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeErrorSample {
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub timestamp: Decimal,
    pub eecstate: i64,
    pub state: i64,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub terror: Decimal,
}

impl Record for TimeErrorSample {
    fn timestamp(&self) -> Decimal {
        self.timestamp
    }

    fn with_timestamp(mut self, timestamp: Decimal) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Parse time error from a dpll CSV sample.
pub struct TimeErrorParser;

impl TimeErrorParser {
    pub const ID: &'static str = "dpll/time-error";
}

impl LineParser for TimeErrorParser {
    type Record = TimeErrorSample;

    fn id(&self) -> &'static str {
        Self::ID
    }

    fn parse_line(&self, line: &str) -> Result<Option<TimeErrorSample>, ParseError> {
        let fields = fields_exact(line, 4)?;
        Ok(Some(TimeErrorSample {
            timestamp: parse_timestamp(fields[0])?,
            eecstate: parse_int(fields[1])?,
            state: parse_int(fields[2])?,
            terror: parse_decimal(fields[3])?,
        }))
    }
}
