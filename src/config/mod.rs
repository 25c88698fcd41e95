//! Configuration loading and management.
//!
//! - [`types`]: config struct definitions (Config, RegistryConfig, TelemetryConfig)
//! - [`validation`]: startup checks that report every problem at once

mod types;
mod validation;

pub use types::{Config, DuplicatePolicy, RegistryConfig, TelemetryConfig};
pub use validation::{ValidationError, validate};

use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}
