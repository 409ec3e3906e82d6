//! Configuration for spam-rs

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, SpamError};

/// Main configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub corpus: CorpusConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Naive Bayes model options
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ClassifierConfig {
    /// Additive smoothing factor (alpha)
    #[serde(default = "default_smooth_factor")]
    pub smooth_factor: f64,
    /// Maximum number of TF-IDF selected tokens per email
    #[serde(default = "default_num_features")]
    pub num_features: usize,
    /// Score the relay IP channel
    #[serde(default)]
    pub use_ip: bool,
    /// Score the send hour channel
    #[serde(default)]
    pub use_time: bool,
    #[serde(default = "default_weight")]
    pub ip_weight: f64,
    #[serde(default = "default_weight")]
    pub time_weight: f64,
}

/// Corpus layout and train/dev split
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CorpusConfig {
    /// Full index file (`<label> <path>` per line)
    pub index_file: Option<PathBuf>,
    /// Fold count; one fold becomes the dev set
    #[serde(default = "default_k_fold")]
    pub k_fold: usize,
    /// Seed for shuffling
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Fraction of the training index to keep
    #[serde(default = "default_data_size")]
    pub data_size: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// "pretty" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_smooth_factor() -> f64 {
    0.1
}

fn default_num_features() -> usize {
    128
}

fn default_weight() -> f64 {
    1.0
}

fn default_k_fold() -> usize {
    5
}

fn default_seed() -> u64 {
    123
}

fn default_data_size() -> f64 {
    1.0
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            smooth_factor: default_smooth_factor(),
            num_features: default_num_features(),
            use_ip: false,
            use_time: false,
            ip_weight: default_weight(),
            time_weight: default_weight(),
        }
    }
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            index_file: None,
            k_fold: default_k_fold(),
            seed: default_seed(),
            data_size: default_data_size(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl ClassifierConfig {
    /// Validate model options
    ///
    /// A smoothing factor of exactly zero is accepted; unseen events then
    /// score negative infinity.
    pub fn validate(&self) -> Result<()> {
        if !self.smooth_factor.is_finite() || self.smooth_factor < 0.0 {
            return Err(SpamError::Config(format!(
                "smooth_factor must be a non-negative number, got {}",
                self.smooth_factor
            )));
        }
        if self.num_features == 0 {
            return Err(SpamError::Config("num_features must be at least 1".to_string()));
        }
        if !self.ip_weight.is_finite() || !self.time_weight.is_finite() {
            return Err(SpamError::Config("channel weights must be finite".to_string()));
        }
        Ok(())
    }
}

impl CorpusConfig {
    pub fn validate(&self) -> Result<()> {
        if self.k_fold < 2 {
            return Err(SpamError::Config(format!(
                "k_fold must be at least 2, got {}",
                self.k_fold
            )));
        }
        if !(self.data_size > 0.0 && self.data_size <= 1.0) {
            return Err(SpamError::Config(format!(
                "data_size must be in (0, 1], got {}",
                self.data_size
            )));
        }
        Ok(())
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| SpamError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| SpamError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.classifier.validate()?;
        self.corpus.validate()
    }
}
