//! Parse GNSS log messages.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::parser::traits::{LineParser, Record};
use crate::parser::{fields_exact, parse_int};
use crate::timestamp::parse_timestamp;

/// One GNSS receiver time-error sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeErrorSample {
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub timestamp: Decimal,
    /// u-blox gpsFix value.
    pub state: i64,
    pub terror: i64,
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

/// Parse time error from a GNSS CSV sample.
pub struct TimeErrorParser;

impl TimeErrorParser {
    pub const ID: &'static str = "gnss/time-error";
}

impl LineParser for TimeErrorParser {
    type Record = TimeErrorSample;

    fn id(&self) -> &'static str {
        Self::ID
    }

    fn parse_line(&self, line: &str) -> Result<Option<TimeErrorSample>, ParseError> {
        // GNSS samples come from a fixed format CSV capture
        let fields = fields_exact(line, 3)?;
        Ok(Some(TimeErrorSample {
            timestamp: parse_timestamp(fields[0])?,
            state: parse_int(fields[1])?,
            terror: parse_int(fields[2])?,
        }))
    }
}
