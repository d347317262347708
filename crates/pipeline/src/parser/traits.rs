//! Parser and record contracts.

use std::io::BufRead;

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::stream::{CanonicalStream, RecordStream};
use crate::error::ParseError;

/// A canonical record parsed from one accepted log line.
///
/// Each source has a fixed record shape whose field order is public and
/// stable across re-serialization; a `timestamp` field is always present.
pub trait Record: Clone + PartialEq + Serialize + DeserializeOwned {
    /// Seconds, either relative to test start or since the UTC epoch.
    fn timestamp(&self) -> Decimal;

    /// The same record with `timestamp` replaced.
    fn with_timestamp(self, timestamp: Decimal) -> Self;
}

/// Line-to-record contract implemented once per log source.
pub trait LineParser {
    type Record: Record;

    /// Stable source identifier, e.g. `gnss/time-error`.
    fn id(&self) -> &'static str;

    /// Parse one log line.
    ///
    /// Returns `Ok(Some(record))` for an accepted line, `Ok(None)` for a
    /// line that does not belong to this source, and an error for a line
    /// that belongs to this source but is malformed.
    fn parse_line(&self, line: &str) -> Result<Option<Self::Record>, ParseError>;

    /// Reconstruct a record from one line of canonical serialized data.
    ///
    /// Canonical lines carry already-normalized values; numeric fields are
    /// restored exactly rather than re-derived from log text.
    fn canonical_line(&self, line: &str) -> Result<Self::Record, ParseError> {
        Ok(serde_json::from_str(line)?)
    }

    /// Lazily parse accepted records out of `reader`.
    ///
    /// The stream is consumed by iteration; re-parsing requires a fresh
    /// invocation on fresh input.
    fn parse<R: BufRead>(&self, reader: R) -> RecordStream<'_, Self, R>
    where
        Self: Sized,
    {
        RecordStream::new(self, reader, false)
    }

    /// Like [`LineParser::parse`], presenting every timestamp relative to
    /// the first accepted record's timestamp (which itself becomes zero).
    fn parse_relative<R: BufRead>(&self, reader: R) -> RecordStream<'_, Self, R>
    where
        Self: Sized,
    {
        RecordStream::new(self, reader, true)
    }

    /// Lazily reconstruct records from canonical lines in `reader`.
    fn canonical<R: BufRead>(&self, reader: R) -> CanonicalStream<'_, Self, R>
    where
        Self: Sized,
    {
        CanonicalStream::new(self, reader)
    }
}
