//! Draw engine configuration

use std::fs;
use std::path::Path;

use rf_core::RfError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pool::DuplicatePolicy;
use crate::timing::{SpinTiming, TimingProfile};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yml::Error),

    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid config: {0}")]
    Invalid(#[from] RfError),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Complete draw configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawConfig {
    /// Spin presentation timing
    pub timing: SpinTiming,
    /// Exclusion rule for duplicate names
    pub duplicate_policy: DuplicatePolicy,
    /// Fixed RNG seed for reproducible draws
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl DrawConfig {
    /// Instant settle, fixed seed
    pub fn studio(seed: u64) -> Self {
        Self {
            timing: SpinTiming::studio(),
            seed: Some(seed),
            ..Self::default()
        }
    }

    pub fn with_profile(mut self, profile: TimingProfile) -> Self {
        self.timing = SpinTiming::from_profile(profile);
        self
    }

    pub fn with_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.timing.validate()?;
        Ok(())
    }

    /// Export config as JSON
    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Import config from JSON
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(yaml: &str) -> ConfigResult<Self> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.json`, `.yaml` or `.yml` file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config = match extension(path).as_str() {
            "json" => Self::from_json(&text)?,
            "yaml" | "yml" => Self::from_yaml(&text)?,
            other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
        };
        log::info!("[DrawConfig] Loaded {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        let path = path.as_ref();
        let text = match extension(path).as_str() {
            "json" => self.to_json()?,
            "yaml" | "yml" => serde_yml::to_string(self)?,
            other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
        };
        fs::write(path, text)?;
        Ok(())
    }
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default()
}
