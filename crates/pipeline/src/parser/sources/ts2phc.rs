//! Parse ts2phc log messages.

use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::parser::traits::{LineParser, Record};
use crate::timestamp::parse_decimal;

/// One ts2phc master-offset sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeErrorSample {
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub timestamp: Decimal,
    pub interface: String,
    pub terror: i64,
    pub state: String,
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

/// Parse time error from ts2phc log messages.
///
/// Only timestamp-bracketed `master offset` lines from daemon instance 0
/// are accepted; everything else in the log is discarded as unrelated
/// noise rather than failed.
pub struct TimeErrorParser {
    regexp: Regex,
}

impl TimeErrorParser {
    pub const ID: &'static str = "ts2phc/time-error";

    pub fn new() -> Self {
        Self::for_interface(None)
    }

    /// Restrict parsing to lines for `interface` when given.
    pub fn for_interface(interface: Option<&str>) -> Self {
        let interface = match interface {
            Some(name) => regex::escape(name),
            None => r"\S+".to_string(),
        };
        let pattern = format!(
            r"^ts2phc\[([1-9][0-9]*\.[0-9]{{3}})\]:\s\[ts2phc\.0\..*\]\s({interface})\smaster offset\s+(-?[0-9]+)\s(\S+)\s.*$"
        );
        Self {
            regexp: Regex::new(&pattern).expect("hard-coded pattern"),
        }
    }
}

impl Default for TimeErrorParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LineParser for TimeErrorParser {
    type Record = TimeErrorSample;

    fn id(&self) -> &'static str {
        Self::ID
    }

    fn parse_line(&self, line: &str) -> Result<Option<TimeErrorSample>, ParseError> {
        let Some(caps) = self.regexp.captures(line) else {
            return Ok(None);
        };
        let terror = caps[3]
            .parse()
            .map_err(|_| ParseError::InvalidNumber(caps[3].to_string()))?;
        Ok(Some(TimeErrorSample {
            timestamp: parse_decimal(&caps[1])?,
            interface: caps[2].to_string(),
            terror,
            state: caps[4].to_string(),
        }))
    }
}
