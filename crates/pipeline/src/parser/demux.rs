//! Demultiplex log messages from a single multiplexed source.
//!
//! Each input line is a self-describing JSON object with an `id` naming the
//! originating source and a `data` payload in that source's canonical
//! record shape. Sources stay in their own order; there is no re-ordering
//! within a source.

use std::collections::HashMap;
use std::io::{BufRead, Lines};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

use super::sources::{dpll, gnss, pmc, ts2phc};
use crate::error::ParseError;

/// A canonical record from any registered source.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnyRecord {
    DpllPhaseOffset(dpll::PhaseOffsetSample),
    DpllTimeError(dpll::TimeErrorSample),
    GnssTimeError(gnss::TimeErrorSample),
    Ts2phcTimeError(ts2phc::TimeErrorSample),
    ClockClass(pmc::ClockClassSample),
}

type Rebuild = fn(Value) -> Result<AnyRecord, ParseError>;

/// Source identifier to record-reconstruction mapping.
pub struct Registry {
    parsers: HashMap<&'static str, Rebuild>,
}

impl Registry {
    pub fn contains(&self, id: &str) -> bool {
        self.parsers.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.parsers.keys().copied()
    }
}

impl Default for Registry {
    fn default() -> Self {
        let mut parsers: HashMap<&'static str, Rebuild> = HashMap::new();
        parsers.insert(dpll::PhaseOffsetParser::ID, |data| {
            Ok(AnyRecord::DpllPhaseOffset(serde_json::from_value(data)?))
        });
        parsers.insert(dpll::TimeErrorParser::ID, |data| {
            Ok(AnyRecord::DpllTimeError(serde_json::from_value(data)?))
        });
        parsers.insert(gnss::TimeErrorParser::ID, |data| {
            Ok(AnyRecord::GnssTimeError(serde_json::from_value(data)?))
        });
        parsers.insert(ts2phc::TimeErrorParser::ID, |data| {
            Ok(AnyRecord::Ts2phcTimeError(serde_json::from_value(data)?))
        });
        parsers.insert(pmc::ClockClassParser::ID, |data| {
            Ok(AnyRecord::ClockClass(serde_json::from_value(data)?))
        });
        Self { parsers }
    }
}

#[derive(Deserialize)]
struct MuxLine {
    id: String,
    data: Value,
}

/// Lazily yield `(id, record)` pairs for registered sources in `reader`.
///
/// Lines whose `id` has no registered parser are discarded; a malformed
/// payload under a registered `id` is a hard failure.
pub fn muxed<R: BufRead>(reader: R, registry: &Registry) -> MuxStream<'_, R> {
    MuxStream {
        lines: reader.lines(),
        registry,
    }
}

/// Iterator produced by [`muxed`].
pub struct MuxStream<'r, R> {
    lines: Lines<R>,
    registry: &'r Registry,
}

impl<R: BufRead> Iterator for MuxStream<'_, R> {
    type Item = Result<(String, AnyRecord), ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(err) => return Some(Err(err.into())),
            };
            let mux: MuxLine = match serde_json::from_str(&line) {
                Ok(mux) => mux,
                Err(err) => return Some(Err(err.into())),
            };
            let Some(rebuild) = self.registry.parsers.get(mux.id.as_str()) else {
                trace!(id = %mux.id, "discarding record for unregistered source");
                continue;
            };
            return Some(rebuild(mux.data).map(|record| (mux.id, record)));
        }
    }
}
