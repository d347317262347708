//! Parse PMC log messages.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::parser::traits::{LineParser, Record};
use crate::parser::{fields_at_least, parse_int};
use crate::timestamp::parse_timestamp;

/// One grandmaster clock-class sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClockClassSample {
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub timestamp: Decimal,
    pub clock_class: i64,
}

impl Record for ClockClassSample {
    fn timestamp(&self) -> Decimal {
        self.timestamp
    }

    fn with_timestamp(mut self, timestamp: Decimal) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Parse clock class samples.
pub struct ClockClassParser;

impl ClockClassParser {
    pub const ID: &'static str = "phc/gm-settings";
}

impl LineParser for ClockClassParser {
    type Record = ClockClassSample;

    fn id(&self) -> &'static str {
        Self::ID
    }

    fn parse_line(&self, line: &str) -> Result<Option<ClockClassSample>, ParseError> {
        // PMC samples come from a CSV capture; trailing fields are ignored
        let fields = fields_at_least(line, 2)?;
        Ok(Some(ClockClassSample {
            timestamp: parse_timestamp(fields[0])?,
            clock_class: parse_int(fields[1])?,
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::{Datelike, NaiveDate, Utc};

    use super::*;

    fn epoch(year: i32, month: u32, day: u32, h: u32, m: u32, s: u32) -> i64 {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
            .and_utc()
            .timestamp()
    }

    #[test]
    fn test_accepts_relative_timestamps_and_trailing_fields() {
        for (line, class) in [
            ("681011.839,248,foo", 248),
            ("681011.839,150,foo", 150),
            ("681011.839,160,foo", 160),
        ] {
            let parsed = ClockClassParser.parse_line(line).unwrap().unwrap();
            assert_eq!(parsed.timestamp, Decimal::from_str("681011.839").unwrap());
            assert_eq!(parsed.clock_class, class);
        }
    }

    #[test]
    fn test_accepts_absolute_timestamps() {
        let year = Utc::now().year();
        let secs = epoch(year, 6, 16, 17, 1, 11);
        for (frac, offset, class) in [
            ("131", "Z", 6),
            ("131282", "-00:00", 7),
            ("131282269", "+00:00", 140),
        ] {
            let line = format!("{year}-06-16T17:01:11.{frac}{offset},{class},foo");
            let parsed = ClockClassParser.parse_line(&line).unwrap().unwrap();
            assert_eq!(
                parsed.timestamp,
                Decimal::from_str(&format!("{secs}.{frac}")).unwrap(),
                "line {line:?}"
            );
            assert_eq!(parsed.clock_class, class);
        }
    }

    #[test]
    fn test_rejects_malformed_lines() {
        let year = Utc::now().year();
        let rejects = [
            "foo bar baz".to_string(),
            "1876878.28".to_string(),
            "quux,3,3".to_string(),
            "1876878.28,quux,3".to_string(),
            format!("{year}-06-16T17:01Z,5,-3"),
            format!("{year}-06-16T17:01:00Z,5,-3"),
            format!("{year}-06-16T17:01:00.123+01:00,5,-3"),
        ];
        for line in &rejects {
            assert!(ClockClassParser.parse_line(line).is_err(), "accepted {line:?}");
        }
    }

    #[test]
    fn test_parses_file_of_samples() {
        use crate::parser::traits::LineParser;

        let input = "847914.839,248\n847915.839,6\n847916.839,7\n";
        let records: Vec<_> = ClockClassParser
            .parse(input.as_bytes())
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        let classes: Vec<_> = records.iter().map(|r| r.clock_class).collect();
        assert_eq!(classes, vec![248, 6, 7]);
    }
}
