//! Pipeline configuration loaded from TOML.
//!
//! Every field is optional in the file. Command-line flags override file
//! values; see [`Overrides`].

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Environment variable naming a config file when `--config` is absent.
pub const CONFIG_ENV: &str = "ACCIDENT_RISK_CONFIG";

/// Errors that can occur while loading the config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The file is not valid TOML for [`PipelineConfig`].
    #[error("Invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Settings for the bundled regression model.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Ridge penalty strength.
    pub l2: f64,
    /// Share of counties held out for evaluation.
    pub test_fraction: f64,
    /// Seed for the train/test shuffle.
    pub seed: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            l2: 1.0,
            test_fraction: 0.2,
            seed: 42,
        }
    }
}

/// Top-level pipeline configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Year scored separately from the all-years set.
    pub focus_year: i32,
    /// Caption lines before the population extract's label line.
    pub population_skip_rows: usize,
    /// Size of the riskiest/safest rankings.
    pub top_n: usize,
    pub model: ModelConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            focus_year: 2020,
            population_skip_rows: 5,
            top_n: 20,
            model: ModelConfig::default(),
        }
    }
}

/// Values given on the command line, applied over the file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub focus_year: Option<i32>,
    pub population_skip_rows: Option<usize>,
    pub top_n: Option<usize>,
    pub l2: Option<f64>,
    pub test_fraction: Option<f64>,
    pub seed: Option<u64>,
}

impl PipelineConfig {
    /// Parses a config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`toml::de::Error`] if the text is not valid config TOML.
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Loads the config from `path`, or defaults when `path` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            log::debug!("No config file given, using defaults");
            return Ok(Self::default());
        };

        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Returns a copy with every `Some` override applied.
    #[must_use]
    pub fn with_overrides(&self, overrides: &Overrides) -> Self {
        Self {
            focus_year: overrides.focus_year.unwrap_or(self.focus_year),
            population_skip_rows: overrides
                .population_skip_rows
                .unwrap_or(self.population_skip_rows),
            top_n: overrides.top_n.unwrap_or(self.top_n),
            model: ModelConfig {
                l2: overrides.l2.unwrap_or(self.model.l2),
                test_fraction: overrides.test_fraction.unwrap_or(self.model.test_fraction),
                seed: overrides.seed.unwrap_or(self.model.seed),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(PipelineConfig::from_toml("").unwrap(), PipelineConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = PipelineConfig::from_toml("focus_year = 2021\n[model]\nseed = 7\n").unwrap();
        assert_eq!(config.focus_year, 2021);
        assert_eq!(config.top_n, 20);
        assert_eq!(config.model.seed, 7);
        assert!((config.model.l2 - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unknown_types_are_rejected() {
        assert!(PipelineConfig::from_toml("top_n = \"many\"").is_err());
    }

    #[test]
    fn overrides_win_over_file() {
        let config = PipelineConfig::default().with_overrides(&Overrides {
            top_n: Some(5),
            seed: Some(1),
            ..Overrides::default()
        });
        assert_eq!(config.top_n, 5);
        assert_eq!(config.model.seed, 1);
        assert_eq!(config.focus_year, 2020);
    }

    #[test]
    fn unreadable_file_names_the_path() {
        let path = Path::new("no/such/accident_risk.toml");
        let err = PipelineConfig::load(Some(path)).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("no/such/accident_risk.toml"));
    }

    #[test]
    fn missing_path_uses_defaults() {
        assert_eq!(PipelineConfig::load(None).unwrap(), PipelineConfig::default());
    }
}
