//! Timestamp normalization.
//!
//! Log sources stamp samples either with an elapsed decimal number of
//! seconds or with an absolute ISO 8601 UTC date-time. Both normalize to a
//! single decimal seconds value; downstream code cannot tell the two
//! origins apart except by magnitude.

use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, Datelike, NaiveDateTime, Utc};
use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::error::ParseError;

/// ISO 8601 date-time at seconds resolution with a mandatory decimal
/// fraction and a Zulu or numeric offset.
static ABSOLUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2})\.(\d+)(Z|[+-]\d{2}:\d{2})$")
        .expect("hard-coded pattern")
});

/// Normalize `value` into decimal seconds.
///
/// Absolute UTC date-times close to the present become epoch seconds with
/// the fractional digits carried over verbatim; anything else must parse as
/// a plain decimal. A non-UTC offset is a hard error.
pub fn parse_timestamp(value: &str) -> Result<Decimal, ParseError> {
    let value = value.trim();
    match parse_timestamp_abs(value)? {
        Some(timestamp) => Ok(timestamp),
        None => parse_decimal(value),
    }
}

fn parse_timestamp_abs(value: &str) -> Result<Option<Decimal>, ParseError> {
    let Some(caps) = ABSOLUTE.captures(value) else {
        return Ok(None);
    };
    if !matches!(&caps[3], "Z" | "+00:00" | "-00:00") {
        return Err(ParseError::NonUtcOffset(value.to_string()));
    }
    let naive = NaiveDateTime::parse_from_str(&caps[1], "%Y-%m-%dT%H:%M:%S")
        .map_err(|_| ParseError::InvalidTimestamp(value.to_string()))?;
    // a date-time far from the present is not treated as absolute
    if (naive.year() - Utc::now().year()).abs() > 1 {
        return Ok(None);
    }
    let seconds = naive.and_utc().timestamp();
    // fraction digits are appended verbatim, not recomputed
    Decimal::from_str(&format!("{seconds}.{}", &caps[2]))
        .map(Some)
        .map_err(|_| ParseError::InvalidTimestamp(value.to_string()))
}

/// Parse a plain decimal field.
pub fn parse_decimal(value: &str) -> Result<Decimal, ParseError> {
    let value = value.trim();
    Decimal::from_str(value).map_err(|_| ParseError::InvalidNumber(value.to_string()))
}

/// Render an epoch-seconds decimal as an ISO 8601 UTC string if it denotes
/// a date-time within one year of now; `None` otherwise.
pub fn to_iso_recent(timestamp: Decimal) -> Option<String> {
    let seconds = timestamp.trunc().to_i64()?;
    let datetime = DateTime::from_timestamp(seconds, 0)?;
    if (datetime.year() - Utc::now().year()).abs() > 1 {
        return None;
    }
    let base = datetime.format("%Y-%m-%dT%H:%M:%S");
    let fraction = timestamp.fract();
    if fraction.is_zero() {
        Some(format!("{base}Z"))
    } else {
        let digits = fraction.to_string();
        let digits = digits.trim_start_matches("0.");
        Some(format!("{base}.{digits}Z"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn this_year() -> i32 {
        Utc::now().year()
    }

    fn epoch(year: i32, month: u32, day: u32, h: u32, m: u32, s: u32) -> i64 {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
            .and_utc()
            .timestamp()
    }

    #[test]
    fn test_parse_relative_decimal() {
        assert_eq!(
            parse_timestamp("681011.839").unwrap(),
            Decimal::from_str("681011.839").unwrap()
        );
        assert_eq!(parse_timestamp(" 5 ").unwrap(), Decimal::from(5));
    }

    #[test]
    fn test_parse_absolute_zulu() {
        let year = this_year();
        let value = format!("{year}-06-16T17:01:11.131Z");
        let expected = format!("{}.131", epoch(year, 6, 16, 17, 1, 11));
        assert_eq!(
            parse_timestamp(&value).unwrap(),
            Decimal::from_str(&expected).unwrap()
        );
    }

    #[test]
    fn test_parse_absolute_numeric_utc_offsets() {
        let year = this_year();
        let secs = epoch(year, 6, 16, 17, 1, 11);
        for (offset, frac) in [("-00:00", "131282"), ("+00:00", "131282269")] {
            let value = format!("{year}-06-16T17:01:11.{frac}{offset}");
            let expected = format!("{secs}.{frac}");
            assert_eq!(
                parse_timestamp(&value).unwrap(),
                Decimal::from_str(&expected).unwrap(),
                "offset {offset}"
            );
        }
    }

    #[test]
    fn test_fraction_digits_kept_verbatim() {
        let year = this_year();
        let value = format!("{year}-01-02T03:04:05.000100Z");
        let parsed = parse_timestamp(&value).unwrap();
        assert_eq!(parsed.scale(), 6);
    }

    #[test]
    fn test_reject_non_utc_offset() {
        let year = this_year();
        let value = format!("{year}-06-16T17:01:00.123+01:00");
        assert!(matches!(
            parse_timestamp(&value),
            Err(ParseError::NonUtcOffset(_))
        ));
    }

    #[test]
    fn test_reject_missing_fraction() {
        let year = this_year();
        assert!(parse_timestamp(&format!("{year}-06-16T17:01Z")).is_err());
        assert!(parse_timestamp(&format!("{year}-06-16T17:01:00Z")).is_err());
    }

    #[test]
    fn test_reject_comma_fraction() {
        let year = this_year();
        assert!(parse_timestamp(&format!("{year}-06-16T17:01:00,123+00:00")).is_err());
    }

    #[test]
    fn test_reject_garbage() {
        assert!(matches!(
            parse_timestamp("quux"),
            Err(ParseError::InvalidNumber(_))
        ));
    }

    #[test]
    fn test_old_absolute_falls_through_to_error() {
        // far from the present: not absolute, and not a plain decimal either
        assert!(parse_timestamp("1993-06-16T17:01:11.131Z").is_err());
    }

    #[test]
    fn test_to_iso_recent_for_recent_epoch() {
        let year = this_year();
        let secs = epoch(year, 6, 16, 17, 1, 11);
        let timestamp = Decimal::from_str(&format!("{secs}.131")).unwrap();
        assert_eq!(
            to_iso_recent(timestamp).unwrap(),
            format!("{year}-06-16T17:01:11.131Z")
        );
    }

    #[test]
    fn test_to_iso_recent_rejects_small_relative_values() {
        assert_eq!(to_iso_recent(Decimal::from(1)), None);
        assert_eq!(to_iso_recent(Decimal::from_str("681011.839").unwrap()), None);
    }
}
