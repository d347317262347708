//! Analyze ts2phc time error.

use rust_decimal::Decimal;
use serde_json::{Map, Value};

use super::engine::{Check, Verdict};
use super::window::{ErrorSample, TimeErrorWindow};
use crate::config::Config;
use crate::error::ConfigError;
use crate::parser::sources::ts2phc::TimeErrorSample;

impl ErrorSample for TimeErrorSample {
    fn timestamp(&self) -> Decimal {
        self.timestamp
    }

    fn error(&self) -> Decimal {
        Decimal::from(self.terror)
    }
}

/// Time-error compliance over ts2phc master-offset samples.
pub struct TimeErrorCheck {
    window: TimeErrorWindow,
}

impl TimeErrorCheck {
    pub const ID: &'static str = "ts2phc/time-error";
    pub const PARSER: &'static str = "ts2phc/time-error";

    // servo state s2 is locked
    const LOCKED: [&'static str; 1] = ["s2"];

    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            window: TimeErrorWindow::from_config(config)?,
        })
    }
}

impl Check for TimeErrorCheck {
    type Record = TimeErrorSample;

    fn id(&self) -> &'static str {
        Self::ID
    }

    fn parser_id(&self) -> &'static str {
        Self::PARSER
    }

    fn prepare(&mut self, rows: Vec<TimeErrorSample>) -> Vec<TimeErrorSample> {
        self.window.trim_transient(rows)
    }

    fn test(&mut self, data: &[TimeErrorSample]) -> Verdict {
        self.window
            .test(data, |row| Self::LOCKED.contains(&row.state.as_str()))
    }

    fn explain(&mut self, data: &[TimeErrorSample]) -> Map<String, Value> {
        self.window.explain(data, "terror")
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde_json::json;

    use super::*;
    use crate::analyzer::Analyzer;

    fn config(limit: i64, transient: i64, duration: i64) -> Config {
        let parameters = HashMap::from([
            ("time-error-limit/%".to_string(), Decimal::from(limit)),
            ("transient-period/s".to_string(), Decimal::from(transient)),
            ("min-test-duration/s".to_string(), Decimal::from(duration)),
        ]);
        Config::new(Some("G.8272/PRTC-A"), Some(parameters))
    }

    fn sample(timestamp: i64, terror: i64, state: &str) -> TimeErrorSample {
        TimeErrorSample {
            timestamp: Decimal::from(timestamp),
            interface: "ens7f1".to_string(),
            terror,
            state: state.to_string(),
        }
    }

    #[test]
    fn test_no_data() {
        let check = TimeErrorCheck::new(&config(100, 1, 1)).unwrap();
        let mut analyzer = Analyzer::new(check);
        assert!(!analyzer.result());
        assert_eq!(analyzer.reason(), Some("no data".to_string()));
        assert!(analyzer.analysis().is_empty());
    }

    #[test]
    fn test_loss_of_lock_on_s1() {
        let check = TimeErrorCheck::new(&config(100, 1, 4)).unwrap();
        let mut analyzer = Analyzer::new(check);
        analyzer
            .collect([
                sample(0, 0, "s2"),
                sample(1, 0, "s1"),
                sample(2, 0, "s2"),
                sample(3, 0, "s2"),
                sample(4, 0, "s2"),
                sample(5, 0, "s2"),
            ])
            .unwrap();
        assert!(!analyzer.result());
        assert_eq!(analyzer.reason(), Some("loss of lock".to_string()));
    }

    #[test]
    fn test_passes_when_locked_throughout() {
        let check = TimeErrorCheck::new(&config(100, 1, 4)).unwrap();
        let mut analyzer = Analyzer::new(check);
        analyzer
            .collect((0..6).map(|t| sample(t, -3, "s2")))
            .unwrap();
        assert!(analyzer.result());
        assert_eq!(analyzer.reason(), None);
        assert_eq!(analyzer.analysis()["terror"]["mean"], json!(-3));
    }
}
