//! Engine configuration loaded from TOML, plus `key=value` pass-through
//! overrides applied on top of the file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Weights combining the per-feature scores into a hypothesis total.
///
/// Field order matches the engine's feature schema: see
/// [`crate::search::FEATURE_NAMES`].
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeatureWeights {
    #[serde(default = "default_one")]
    pub tm: f64,
    #[serde(default = "default_one")]
    pub lm: f64,
    #[serde(default = "default_one")]
    pub word_penalty: f64,
    #[serde(default = "default_one")]
    pub phrase_penalty: f64,
}

fn default_one() -> f64 {
    1.0
}

impl Default for FeatureWeights {
    fn default() -> Self {
        Self {
            tm: 1.0,
            lm: 1.0,
            word_penalty: 1.0,
            phrase_penalty: 1.0,
        }
    }
}

impl FeatureWeights {
    /// Weights as an array aligned with the feature schema order.
    pub fn to_array(self) -> [f64; 4] {
        [self.tm, self.lm, self.word_penalty, self.phrase_penalty]
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("TOML parse error: {0}")]
    Parse(String),
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
    #[error("model error: {0}")]
    Model(#[from] super::ModelError),
    #[error("engine already initialized")]
    AlreadyInitialized,
}

#[derive(Debug, Clone, Deserialize)]
struct ConfigFile {
    engine: EngineSection,
    #[serde(default)]
    weights: Option<FeatureWeights>,
}

#[derive(Debug, Clone, Deserialize)]
struct EngineSection {
    phrase_table: PathBuf,
    #[serde(default)]
    language_model: Option<PathBuf>,
    #[serde(default)]
    verbosity: u8,
    #[serde(default = "default_true")]
    distinct_nbest: bool,
}

fn default_true() -> bool {
    true
}

/// Parsed engine configuration: model locations, verbosity, N-best options
/// and feature weights. Built from a TOML file via [`EngineConfig::load`],
/// or directly for in-memory setups.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub phrase_table: PathBuf,
    pub language_model: Option<PathBuf>,
    pub verbosity: u8,
    pub distinct_nbest: bool,
    pub weights: FeatureWeights,
    /// Unrecognized `key=value` arguments, forwarded to the engine state
    /// unmodified.
    pub pass_through: Vec<String>,
}

impl EngineConfig {
    /// Read and parse a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&text)?;
        Ok(config)
    }

    /// Parse TOML configuration text.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        let config = Self {
            phrase_table: file.engine.phrase_table,
            language_model: file.engine.language_model,
            verbosity: file.engine.verbosity,
            distinct_nbest: file.engine.distinct_nbest,
            weights: file.weights.unwrap_or_default(),
            pass_through: Vec::new(),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in crate::search::FEATURE_NAMES
            .iter()
            .zip(self.weights.to_array())
        {
            if !value.is_finite() {
                return Err(ConfigError::InvalidValue {
                    field: format!("weights.{name}"),
                    reason: "weight must be finite".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Apply command-line-style `key=value` overrides. Recognized keys change
    /// the corresponding option; anything else is kept in `pass_through`.
    pub fn apply_args(&mut self, args: &[String]) -> Result<(), ConfigError> {
        for arg in args {
            let Some((key, value)) = arg.split_once('=') else {
                self.pass_through.push(arg.clone());
                continue;
            };
            match key {
                "engine.verbosity" => {
                    self.verbosity = parse_value(key, value)?;
                }
                "engine.distinct_nbest" => {
                    self.distinct_nbest = parse_value(key, value)?;
                }
                "weights.tm" => self.weights.tm = parse_value(key, value)?,
                "weights.lm" => self.weights.lm = parse_value(key, value)?,
                "weights.word_penalty" => self.weights.word_penalty = parse_value(key, value)?,
                "weights.phrase_penalty" => self.weights.phrase_penalty = parse_value(key, value)?,
                _ => self.pass_through.push(arg.clone()),
            }
        }
        self.validate()
    }
}

fn parse_value<T: std::str::FromStr>(field: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        field: field.to_string(),
        reason: format!("cannot parse `{value}`"),
    })
}
