//! Error types shared across the pipeline.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Rejection of a line that is recognizable as belonging to a source but is
/// malformed. Lines that do not belong to a source at all are discarded by
/// the parsers and never reported through this type.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("wrong field count: expected {expected}, got {got}")]
    FieldCount { expected: usize, got: usize },

    #[error("invalid number {0:?}")]
    InvalidNumber(String),

    #[error("invalid timestamp {0:?}")]
    InvalidTimestamp(String),

    #[error("non-UTC offset in timestamp {0:?}")]
    NonUtcOffset(String),

    #[error("invalid canonical record: {0}")]
    Canonical(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Identity of the document a configuration was loaded from, if any.
///
/// Renders as an empty string for in-process configuration, or as a
/// ` in config file <path>` suffix for lookup error messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigSource(Option<PathBuf>);

impl ConfigSource {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self(Some(path.into()))
    }

    pub fn none() -> Self {
        Self(None)
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(path) => write!(f, " in config file {}", path.display()),
            None => Ok(()),
        }
    }
}

/// Failure to resolve a requirement or parameter.
///
/// Lookups never default silently; a missing value aborts the run so a
/// compliance verdict cannot be produced against unintended limits.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no requirements specified{0}")]
    NoRequirements(ConfigSource),

    #[error("unknown requirements {standard:?}{origin}")]
    UnknownStandard { origin: ConfigSource, standard: String },

    #[error("unknown requirement {key:?} for {standard:?}{origin}")]
    UnknownRequirement {
        origin: ConfigSource,
        standard: String,
        key: String,
    },

    #[error("no parameters specified{0}")]
    NoParameters(ConfigSource),

    #[error("unknown parameter {key:?}{origin}")]
    UnknownParameter { origin: ConfigSource, key: String },

    #[error("parameter {key:?} is not a number{origin}")]
    BadParameter { origin: ConfigSource, key: String },

    #[error("cannot read config file {path}: {err}")]
    Read { path: PathBuf, err: std::io::Error },

    #[error("cannot parse config file {path}: {err}")]
    Parse { path: PathBuf, err: toml::de::Error },
}

/// Collection has been closed while collecting data.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("data collection is closed")]
pub struct CollectionClosed;
