//! Time-synchronization log compliance pipeline.
//!
//! Validates the behavior recorded in synchronization daemon logs (DPLL,
//! GNSS, ts2phc, PMC grandmaster settings) against telecom timing
//! requirements such as the ITU-T G.8272 PRTC classes.
//!
//! Data flow: raw log lines are parsed per source into canonical,
//! timestamp-bearing records; an analyzer collects the records in log
//! order, closes into one immutable prepared view, and produces a cached
//! pass/fail verdict with a human-readable reason plus a structured
//! numeric analysis.

pub mod analyzer;
pub mod config;
pub mod error;
pub mod parser;
pub mod timestamp;

pub use config::Config;
pub use error::{CollectionClosed, ConfigError, ParseError};
