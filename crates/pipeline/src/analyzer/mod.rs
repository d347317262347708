//! Compliance analyzers over canonical records.
//!
//! - `engine.rs`: generic collect/close/test lifecycle and caching
//! - `stats.rs`: column statistics and exact JSON numbers
//! - `window.rs`: the windowed time-error test
//! - `gnss.rs`, `ts2phc.rs`, `dpll.rs`: per-source time-error analyzers
//! - `pmc.rs`: the clock-class state machine analyzer

pub mod dpll;
pub mod engine;
pub mod gnss;
pub mod pmc;
pub mod stats;
pub mod ts2phc;
pub mod window;

pub use engine::{Analyzer, Check, Verdict};
