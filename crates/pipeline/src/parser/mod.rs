//! Log line parsing and canonical records.
//!
//! Converts line-oriented daemon output into strongly-typed canonical
//! records, one record shape per source.
//!
//! # Architecture
//!
//! - `traits.rs`: parser and record contracts
//! - `stream.rs`: lazy record iterators over line input
//! - `sources/`: individual source parser implementations
//! - `demux.rs`: separation of interleaved sources from one structured stream
//!
//! Parsers distinguish two kinds of bad input: lines that do not belong to
//! a source are discarded silently (expected noise in mixed logs), while
//! lines that match a source's shape but carry malformed fields fail hard.

pub mod demux;
pub mod sources;
pub mod stream;
pub mod traits;

pub use demux::{muxed, AnyRecord, Registry};
pub use traits::{LineParser, Record};

use crate::error::ParseError;

/// Split a CSV line, requiring exactly `expected` fields.
pub(crate) fn fields_exact(line: &str, expected: usize) -> Result<Vec<&str>, ParseError> {
    let fields: Vec<&str> = line.trim_end().split(',').collect();
    if fields.len() != expected {
        return Err(ParseError::FieldCount {
            expected,
            got: fields.len(),
        });
    }
    Ok(fields)
}

/// Split a CSV line, requiring at least `expected` fields.
///
/// Extra trailing fields are carried through for the caller to ignore.
pub(crate) fn fields_at_least(line: &str, expected: usize) -> Result<Vec<&str>, ParseError> {
    let fields: Vec<&str> = line.trim_end().split(',').collect();
    if fields.len() < expected {
        return Err(ParseError::FieldCount {
            expected,
            got: fields.len(),
        });
    }
    Ok(fields)
}

pub(crate) fn parse_int(field: &str) -> Result<i64, ParseError> {
    let field = field.trim();
    field
        .parse()
        .map_err(|_| ParseError::InvalidNumber(field.to_string()))
}
