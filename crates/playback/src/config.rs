//! Configuration loading for playback.
//!
//! All playback settings can be loaded from a TOML configuration file. Every
//! field has a default, so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Complete playback configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Wall-clock seconds for one full cycle over the whole span
    pub duration_secs: f64,
    /// Nominal rendered frames per simulated step
    pub frame_rate: u32,
    /// Height of sampled agent locations
    pub ground_height: f64,
    /// Height of the first trajectory through a cell
    pub trail_base_height: f64,
    /// Extra height per additional agent through the same cell
    pub trail_stack_step: f64,
    /// Path line smoothing parameters
    pub path_line: PathLineConfig,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            duration_secs: 10.0,
            frame_rate: 15,
            ground_height: 0.5,
            trail_base_height: 1.0,
            trail_stack_step: 0.15,
            path_line: PathLineConfig::default(),
        }
    }
}

/// Path line smoothing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathLineConfig {
    /// Radius of the rounded corner at each turn
    pub corner_radius: f64,
    /// Segments per rounded corner
    pub corner_split: u32,
}

impl Default for PathLineConfig {
    fn default() -> Self {
        Self {
            corner_radius: 0.2,
            corner_split: 10,
        }
    }
}

impl PlaybackConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parses configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Returns this configuration as a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Checks values the playback clock cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.duration_secs.is_finite() || self.duration_secs <= 0.0 {
            return Err(ConfigError::InvalidDuration(self.duration_secs));
        }
        Ok(())
    }

    /// Returns a copy with a different cycle duration.
    pub fn with_duration(mut self, duration_secs: f64) -> Result<Self, ConfigError> {
        self.duration_secs = duration_secs;
        self.validate()?;
        Ok(self)
    }
}

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading config file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Error parsing TOML config
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    /// Error serializing config to TOML
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    /// Cycle duration is not a positive number of seconds
    #[error("invalid duration {0}, expected a positive number of seconds")]
    InvalidDuration(f64),
}
