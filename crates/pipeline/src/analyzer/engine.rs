//! Generic analyzer engine: collection lifecycle, caching, verdicts.

use serde_json::{Map, Value};

use crate::error::CollectionClosed;

/// Outcome of a compliance test.
///
/// A failed test is an ordinary first-class result reported next to the
/// analysis, not an error; hard failures use the types in [`crate::error`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub passed: bool,
    pub reason: Option<String>,
}

impl Verdict {
    pub fn passing() -> Self {
        Self {
            passed: true,
            reason: None,
        }
    }

    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            passed: false,
            reason: Some(reason.into()),
        }
    }
}

/// A source-specific compliance check driven by [`Analyzer`].
pub trait Check {
    type Record;

    /// Analyzer identifier, e.g. `gnss/time-error`.
    fn id(&self) -> &'static str;

    /// Identifier of the parser producing this check's records.
    fn parser_id(&self) -> &'static str;

    /// Prepare collected rows for test and analysis.
    fn prepare(&mut self, rows: Vec<Self::Record>) -> Vec<Self::Record> {
        rows
    }

    /// Test the prepared view.
    fn test(&mut self, data: &[Self::Record]) -> Verdict;

    /// Produce the structured analysis of the prepared view.
    fn explain(&mut self, data: &[Self::Record]) -> Map<String, Value>;
}

/// Drives a [`Check`] through collect, close and cached evaluation.
///
/// Lifecycle: records are collected in arrival order until the first read
/// of [`Analyzer::result`], [`Analyzer::reason`] or [`Analyzer::analysis`]
/// closes collection and materializes one immutable prepared view. Verdict
/// and analysis are each computed once from that view and cached; any
/// collect attempt after closing fails.
pub struct Analyzer<C: Check> {
    check: C,
    rows: Option<Vec<C::Record>>,
    view: Option<Vec<C::Record>>,
    verdict: Option<Verdict>,
    report: Option<Map<String, Value>>,
}

impl<C: Check> Analyzer<C> {
    pub fn new(check: C) -> Self {
        Self {
            check,
            rows: Some(Vec::new()),
            view: None,
            verdict: None,
            report: None,
        }
    }

    pub fn id(&self) -> &'static str {
        self.check.id()
    }

    pub fn parser_id(&self) -> &'static str {
        self.check.parser_id()
    }

    /// Collect records, preserving arrival order.
    pub fn collect<I>(&mut self, records: I) -> Result<(), CollectionClosed>
    where
        I: IntoIterator<Item = C::Record>,
    {
        match self.rows.as_mut() {
            Some(rows) => {
                rows.extend(records);
                Ok(())
            }
            None => Err(CollectionClosed),
        }
    }

    /// Close collection, materializing the prepared view. Idempotent.
    pub fn close(&mut self) {
        if self.view.is_none() {
            let rows = self.rows.take().unwrap_or_default();
            self.view = Some(self.check.prepare(rows));
        }
        self.rows = None;
    }

    fn ensure_verdict(&mut self) {
        self.close();
        if self.verdict.is_none() {
            let data = self.view.as_deref().unwrap_or(&[]);
            let verdict = self.check.test(data);
            self.verdict = Some(verdict);
        }
    }

    /// True if the collected data passes this analyzer's test.
    pub fn result(&mut self) -> bool {
        self.ensure_verdict();
        self.verdict.as_ref().map(|v| v.passed).unwrap_or_default()
    }

    /// The failure reason, if the test failed.
    pub fn reason(&mut self) -> Option<String> {
        self.ensure_verdict();
        self.verdict.as_ref().and_then(|v| v.reason.clone())
    }

    /// The structured analysis of the collected data.
    ///
    /// The verdict is always computed first so checks that accumulate
    /// state during `test` report the same analysis for either access
    /// order.
    pub fn analysis(&mut self) -> &Map<String, Value> {
        self.ensure_verdict();
        if self.report.is_none() {
            let data = self.view.as_deref().unwrap_or(&[]);
            let report = self.check.explain(data);
            self.report = Some(report);
        }
        self.report.get_or_insert_with(Map::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Counts invocations so caching is observable.
    struct Probe {
        prepared: usize,
        tested: usize,
        explained: usize,
    }

    impl Probe {
        fn new() -> Self {
            Self {
                prepared: 0,
                tested: 0,
                explained: 0,
            }
        }
    }

    impl Check for Probe {
        type Record = i64;

        fn id(&self) -> &'static str {
            "probe"
        }

        fn parser_id(&self) -> &'static str {
            "probe"
        }

        fn prepare(&mut self, mut rows: Vec<i64>) -> Vec<i64> {
            self.prepared += 1;
            // drop the first row so preparation is observable downstream
            if !rows.is_empty() {
                rows.remove(0);
            }
            rows
        }

        fn test(&mut self, data: &[i64]) -> Verdict {
            self.tested += 1;
            if data.is_empty() {
                Verdict::failing("no data")
            } else {
                Verdict::passing()
            }
        }

        fn explain(&mut self, data: &[i64]) -> Map<String, Value> {
            self.explained += 1;
            let mut map = Map::new();
            map.insert("rows".to_string(), Value::from(data.len()));
            map
        }
    }

    #[test]
    fn test_empty_collection() {
        let mut analyzer = Analyzer::new(Probe::new());
        assert!(!analyzer.result());
        assert_eq!(analyzer.reason(), Some("no data".to_string()));
        assert_eq!(analyzer.analysis()["rows"], Value::from(0));
    }

    #[test]
    fn test_collect_then_evaluate() {
        let mut analyzer = Analyzer::new(Probe::new());
        analyzer.collect([1, 2, 3]).unwrap();
        analyzer.collect([4]).unwrap();
        assert!(analyzer.result());
        // prepare dropped one of four rows
        assert_eq!(analyzer.analysis()["rows"], Value::from(3));
    }

    #[test]
    fn test_collect_after_close_fails() {
        let mut analyzer = Analyzer::new(Probe::new());
        analyzer.collect([1]).unwrap();
        let _ = analyzer.result();
        assert_eq!(analyzer.collect([2]), Err(CollectionClosed));
        assert_eq!(analyzer.collect([3]), Err(CollectionClosed));
    }

    #[test]
    fn test_repeated_reads_hit_the_cache() {
        let mut analyzer = Analyzer::new(Probe::new());
        analyzer.collect([1, 2]).unwrap();
        let first = analyzer.result();
        let again = analyzer.result();
        assert_eq!(first, again);
        let _ = analyzer.reason();
        let _ = analyzer.analysis();
        let _ = analyzer.analysis();
        assert_eq!(analyzer.check.prepared, 1);
        assert_eq!(analyzer.check.tested, 1);
        assert_eq!(analyzer.check.explained, 1);
    }

    #[test]
    fn test_analysis_first_still_runs_test_once() {
        let mut analyzer = Analyzer::new(Probe::new());
        analyzer.collect([1, 2]).unwrap();
        let rows = analyzer.analysis()["rows"].clone();
        assert_eq!(rows, Value::from(1));
        assert!(analyzer.result());
        assert_eq!(analyzer.check.tested, 1);
    }
}
