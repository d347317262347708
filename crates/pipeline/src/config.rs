//! Analyzer configuration and timing-standard requirements resolution.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;

use crate::error::{ConfigError, ConfigSource};

/// Fixed engineering limits specified in ITU-T G.8272/Y.1367 and the RAN
/// workload profile, keyed by standard name then requirement name.
///
/// Built once at startup and read-only thereafter.
pub static REQUIREMENTS: LazyLock<HashMap<&'static str, HashMap<&'static str, Decimal>>> =
    LazyLock::new(|| {
        HashMap::from([
            (
                "G.8272/PRTC-A",
                HashMap::from([("time-error-in-locked-mode/ns", Decimal::from(100))]),
            ),
            (
                "G.8272/PRTC-B",
                HashMap::from([("time-error-in-locked-mode/ns", Decimal::from(40))]),
            ),
            (
                "workload/RAN",
                HashMap::from([("time-error-in-locked-mode/ns", Decimal::from(100))]),
            ),
        ])
    });

/// Analyzer configuration.
///
/// Two independent dimensions: `requirements` selects a standard in
/// [`REQUIREMENTS`], `parameters` carries user-supplied tuning values.
/// Either may be absent; lookups against an absent dimension fail with a
/// descriptive error. Immutable once constructed.
#[derive(Debug, Clone, Default)]
pub struct Config {
    source: ConfigSource,
    requirements: Option<String>,
    parameters: Option<HashMap<String, Decimal>>,
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    requirements: Option<String>,
    parameters: Option<HashMap<String, toml::Value>>,
}

impl Config {
    pub fn new(
        requirements: Option<&str>,
        parameters: Option<HashMap<String, Decimal>>,
    ) -> Self {
        Self {
            source: ConfigSource::none(),
            requirements: requirements.map(str::to_string),
            parameters,
        }
    }

    /// Load configuration from a TOML document.
    ///
    /// The top-level `requirements` key and the `[parameters]` table are
    /// both optional. Lookup failures against a file-loaded configuration
    /// name this file in their error message.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!("loading analyzer configuration from {}", path.display());
        let contents = fs::read_to_string(path).map_err(|err| ConfigError::Read {
            path: path.to_path_buf(),
            err,
        })?;
        let file: ConfigFile = toml::from_str(&contents).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            err,
        })?;
        let source = ConfigSource::file(path);
        let parameters = file
            .parameters
            .map(|raw| convert_parameters(raw, &source))
            .transpose()?;
        Ok(Self {
            source,
            requirements: file.requirements,
            parameters,
        })
    }

    /// Resolve a fixed requirement of the selected standard.
    pub fn requirement(&self, key: &str) -> Result<Decimal, ConfigError> {
        let standard = self
            .requirements
            .as_deref()
            .ok_or_else(|| ConfigError::NoRequirements(self.source.clone()))?;
        let table = REQUIREMENTS
            .get(standard)
            .ok_or_else(|| ConfigError::UnknownStandard {
                origin: self.source.clone(),
                standard: standard.to_string(),
            })?;
        table
            .get(key)
            .copied()
            .ok_or_else(|| ConfigError::UnknownRequirement {
                origin: self.source.clone(),
                standard: standard.to_string(),
                key: key.to_string(),
            })
    }

    /// Resolve a user-supplied tuning parameter.
    pub fn parameter(&self, key: &str) -> Result<Decimal, ConfigError> {
        let parameters = self
            .parameters
            .as_ref()
            .ok_or_else(|| ConfigError::NoParameters(self.source.clone()))?;
        parameters
            .get(key)
            .copied()
            .ok_or_else(|| ConfigError::UnknownParameter {
                origin: self.source.clone(),
                key: key.to_string(),
            })
    }
}

fn convert_parameters(
    raw: HashMap<String, toml::Value>,
    source: &ConfigSource,
) -> Result<HashMap<String, Decimal>, ConfigError> {
    let mut parameters = HashMap::new();
    for (key, value) in raw {
        let value = match value {
            toml::Value::Integer(n) => Decimal::from(n),
            toml::Value::Float(f) => {
                Decimal::from_f64(f).ok_or_else(|| ConfigError::BadParameter {
                    origin: source.clone(),
                    key: key.clone(),
                })?
            }
            _ => {
                return Err(ConfigError::BadParameter {
                    origin: source.clone(),
                    key,
                })
            }
        };
        parameters.insert(key, value);
    }
    Ok(parameters)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parameters() -> HashMap<String, Decimal> {
        HashMap::from([
            ("time-error-limit/%".to_string(), Decimal::from(100)),
            ("min-test-duration/s".to_string(), Decimal::from(120)),
        ])
    }

    #[test]
    fn test_requirement_lookup_per_standard() {
        for (standard, accuracy) in [
            ("G.8272/PRTC-A", 100),
            ("G.8272/PRTC-B", 40),
            ("workload/RAN", 100),
        ] {
            let config = Config::new(Some(standard), None);
            assert_eq!(
                config.requirement("time-error-in-locked-mode/ns").unwrap(),
                Decimal::from(accuracy)
            );
        }
    }

    #[test]
    fn test_requirement_without_standard() {
        let config = Config::new(None, Some(parameters()));
        let err = config
            .requirement("time-error-in-locked-mode/ns")
            .unwrap_err();
        assert_eq!(err.to_string(), "no requirements specified");
    }

    #[test]
    fn test_requirement_unknown_standard() {
        let config = Config::new(Some("G.8262/EEC-1"), None);
        let err = config
            .requirement("time-error-in-locked-mode/ns")
            .unwrap_err();
        assert!(err.to_string().contains("G.8262/EEC-1"));
    }

    #[test]
    fn test_requirement_unknown_key() {
        let config = Config::new(Some("G.8272/PRTC-A"), None);
        let err = config.requirement("frequency-error/ppb").unwrap_err();
        assert!(err.to_string().contains("frequency-error/ppb"));
        assert!(err.to_string().contains("G.8272/PRTC-A"));
    }

    #[test]
    fn test_parameter_lookup() {
        let config = Config::new(None, Some(parameters()));
        assert_eq!(
            config.parameter("min-test-duration/s").unwrap(),
            Decimal::from(120)
        );
    }

    #[test]
    fn test_parameter_without_parameters() {
        let config = Config::new(Some("G.8272/PRTC-A"), None);
        let err = config.parameter("min-test-duration/s").unwrap_err();
        assert_eq!(err.to_string(), "no parameters specified");
    }

    #[test]
    fn test_parameter_unknown_key() {
        let config = Config::new(None, Some(parameters()));
        let err = config.parameter("transient-period/s").unwrap_err();
        assert!(err.to_string().contains("transient-period/s"));
    }

    #[test]
    fn test_from_file_names_file_in_lookup_errors() {
        let path = std::env::temp_dir().join("config-lookup-errors.toml");
        fs::write(
            &path,
            "requirements = \"G.8272/PRTC-A\"\n\n[parameters]\n\"time-error-limit/%\" = 100\n",
        )
        .unwrap();
        let config = Config::from_file(&path).unwrap();
        assert_eq!(
            config.requirement("time-error-in-locked-mode/ns").unwrap(),
            Decimal::from(100)
        );
        assert_eq!(
            config.parameter("time-error-limit/%").unwrap(),
            Decimal::from(100)
        );
        let err = config.parameter("transient-period/s").unwrap_err();
        assert!(err.to_string().contains("in config file"));
        assert!(err.to_string().contains("config-lookup-errors.toml"));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_from_file_allows_missing_sections() {
        let path = std::env::temp_dir().join("config-empty-sections.toml");
        fs::write(&path, "").unwrap();
        let config = Config::from_file(&path).unwrap();
        assert!(config.requirement("time-error-in-locked-mode/ns").is_err());
        assert!(config.parameter("time-error-limit/%").is_err());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_from_file_fractional_parameters() {
        let path = std::env::temp_dir().join("config-fractional.toml");
        fs::write(&path, "[parameters]\n\"time-error-limit/%\" = 12.5\n").unwrap();
        let config = Config::from_file(&path).unwrap();
        assert_eq!(
            config.parameter("time-error-limit/%").unwrap(),
            Decimal::new(125, 1)
        );
        let _ = fs::remove_file(&path);
    }
}
