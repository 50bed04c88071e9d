//! Engine configuration.
//!
//! [`EngineConfig`] groups the options of every stage. All fields have
//! defaults, so an empty JSON object is a valid configuration:
//!
//! ```json
//! {
//!   "normalizer": {"stop_words": ["the", "a"]},
//!   "split": {"validation_fraction": 0.2, "seed": 42},
//!   "fit": {"epochs": 200, "batch_size": 8, "learning_rate": 0.5},
//!   "decoder": {"threshold": 0.25}
//! }
//! ```
//!
//! Unknown keys are rejected at every level.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::classifier::FitConfig;
use crate::dataset::SplitConfig;
use crate::decoder::DecoderConfig;
use crate::error::Result;
use crate::normalizer::NormalizerConfig;

/// Options for normalization, splitting, fitting and decoding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Text normalizer exclusion sets.
    pub normalizer: NormalizerConfig,
    /// Train/validation split.
    pub split: SplitConfig,
    /// Classifier hyperparameters.
    pub fit: FitConfig,
    /// Decoder threshold.
    pub decoder: DecoderConfig,
}

impl EngineConfig {
    /// Parse and validate a configuration from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json_str(&content)?;
        log::debug!("loaded configuration from {}", path.as_ref().display());
        Ok(config)
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<()> {
        self.normalizer.validate()?;
        self.split.validate()?;
        self.fit.validate()?;
        self.decoder.validate()?;
        Ok(())
    }

    /// Pretty JSON representation.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
