//! Lazy record streams over line-oriented input.

use std::io::{BufRead, Lines};

use rust_decimal::Decimal;

use super::traits::{LineParser, Record};
use crate::error::ParseError;

/// Iterator yielding one canonical record per accepted line.
pub struct RecordStream<'p, P, R> {
    parser: &'p P,
    lines: Lines<R>,
    relative: bool,
    tzero: Option<Decimal>,
}

impl<'p, P: LineParser, R: BufRead> RecordStream<'p, P, R> {
    pub(super) fn new(parser: &'p P, reader: R, relative: bool) -> Self {
        Self {
            parser,
            lines: reader.lines(),
            relative,
            tzero: None,
        }
    }
}

impl<P: LineParser, R: BufRead> Iterator for RecordStream<'_, P, R> {
    type Item = Result<P::Record, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(err) => return Some(Err(err.into())),
            };
            match self.parser.parse_line(&line) {
                Ok(None) => continue,
                Ok(Some(record)) => {
                    if self.relative {
                        let timestamp = record.timestamp();
                        let tzero = *self.tzero.get_or_insert(timestamp);
                        return Some(Ok(record.with_timestamp(timestamp - tzero)));
                    }
                    return Some(Ok(record));
                }
                Err(err) => return Some(Err(err)),
            }
        }
    }
}

/// Iterator reconstructing one record per canonical line.
pub struct CanonicalStream<'p, P, R> {
    parser: &'p P,
    lines: Lines<R>,
}

impl<'p, P: LineParser, R: BufRead> CanonicalStream<'p, P, R> {
    pub(super) fn new(parser: &'p P, reader: R) -> Self {
        Self {
            parser,
            lines: reader.lines(),
        }
    }
}

impl<P: LineParser, R: BufRead> Iterator for CanonicalStream<'_, P, R> {
    type Item = Result<P::Record, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.lines.next()? {
            Ok(line) => Some(self.parser.canonical_line(&line)),
            Err(err) => Some(Err(err.into())),
        }
    }
}
