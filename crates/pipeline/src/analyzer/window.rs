//! Windowed time-error compliance test shared by per-source analyzers.

use rust_decimal::Decimal;
use serde_json::{Map, Value};

use super::engine::Verdict;
use super::stats::{decimal_number, statistics, timestamp_value};
use crate::config::Config;
use crate::error::ConfigError;

/// Row access needed by the windowed test.
pub trait ErrorSample {
    /// Seconds, relative or absolute.
    fn timestamp(&self) -> Decimal;

    /// Signed error magnitude in nanoseconds.
    fn error(&self) -> Decimal;
}

/// Transient trimming plus lock, accuracy and duration checks over one
/// window of samples.
pub struct TimeErrorWindow {
    /// Exclusive upper bound on absolute time error for any sample.
    unacceptable: Decimal,
    /// Samples in the initial transient period are ignored.
    transient: Decimal,
    /// Minimum test duration for a valid test.
    duration_min: Decimal,
}

impl TimeErrorWindow {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        // required system time output accuracy
        let accuracy = config.requirement("time-error-in-locked-mode/ns")?;
        // limit on inaccuracy at observation point
        let limit = config.parameter("time-error-limit/%")?;
        Ok(Self {
            unacceptable: accuracy * limit / Decimal::from(100),
            transient: config.parameter("transient-period/s")?,
            duration_min: config.parameter("min-test-duration/s")?,
        })
    }

    /// Drop leading rows whose timestamp falls inside the transient period.
    ///
    /// An empty buffer passes through unchanged.
    pub fn trim_transient<T: ErrorSample>(&self, mut rows: Vec<T>) -> Vec<T> {
        if let Some(first) = rows.first() {
            let tstart = first.timestamp() + self.transient;
            let idx = rows
                .iter()
                .position(|row| tstart <= row.timestamp())
                .unwrap_or(rows.len());
            rows.drain(..idx);
        }
        rows
    }

    /// Run the checks in fixed order; the first failure wins.
    pub fn test<T: ErrorSample>(&self, data: &[T], locked: impl Fn(&T) -> bool) -> Verdict {
        let (Some(first), Some(last)) = (data.first(), data.last()) else {
            return Verdict::failing("no data");
        };
        if !data.iter().all(|row| locked(row)) {
            return Verdict::failing("loss of lock");
        }
        let worst = data
            .iter()
            .map(|row| row.error().abs())
            .max()
            .unwrap_or_default();
        if self.unacceptable <= worst {
            return Verdict::failing("unacceptable time error");
        }
        if last.timestamp() - first.timestamp() < self.duration_min {
            return Verdict::failing("short test duration");
        }
        // assumes one sample per second
        if Decimal::from(data.len() - 1) < self.duration_min {
            return Verdict::failing("short test samples");
        }
        Verdict::passing()
    }

    /// Analysis mapping: window start, duration, and error statistics under
    /// `column`. Empty data yields an empty mapping.
    pub fn explain<T: ErrorSample>(&self, data: &[T], column: &str) -> Map<String, Value> {
        let (Some(first), Some(last)) = (data.first(), data.last()) else {
            return Map::new();
        };
        let errors: Vec<Decimal> = data.iter().map(ErrorSample::error).collect();
        let mut map = Map::new();
        map.insert("timestamp".to_string(), timestamp_value(first.timestamp()));
        map.insert(
            "duration".to_string(),
            decimal_number(last.timestamp() - first.timestamp()),
        );
        if let Some(stats) = statistics("ns", &errors) {
            map.insert(column.to_string(), Value::Object(stats.to_map()));
        }
        map
    }
}
