//! Configuration loading from pulse.toml
//!
//! Registry-wide defaults can be kept in a `pulse.toml` file in the project
//! root. The file is discovered by walking up from the current directory.
//! Values are read as loose numbers and validated into [`BenchmarkOptions`],
//! so a `runs = 1.5` in the file is reported instead of silently truncated.

use crate::error::{ConfigError, ValidationError};
use crate::options::{BenchmarkOptions, OptionValue};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// PulseBench configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PulseConfig {
    /// Registry-wide defaults
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// `[defaults]` table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Iterations discarded before measurement
    #[serde(default)]
    pub warm_ups: Option<OptionValue>,
    /// Measured iterations
    #[serde(default)]
    pub runs: Option<OptionValue>,
}

impl DefaultsConfig {
    /// Validate into typed options
    pub fn options(&self) -> Result<BenchmarkOptions, ValidationError> {
        BenchmarkOptions::from_raw(self.warm_ups, self.runs)
    }
}

impl PulseConfig {
    /// File name looked up by [`PulseConfig::discover`]
    pub const FILE_NAME: &'static str = "pulse.toml";

    /// Load and validate configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.options()?;
        Ok(config)
    }

    /// Walk up from the current directory looking for `pulse.toml`
    pub fn discover() -> Result<Option<Self>, ConfigError> {
        let dir = std::env::current_dir()?;
        Self::discover_from(dir)
    }

    /// Walk up from `dir` looking for `pulse.toml`
    pub fn discover_from(dir: impl Into<PathBuf>) -> Result<Option<Self>, ConfigError> {
        let mut dir = dir.into();
        loop {
            let config_path = dir.join(Self::FILE_NAME);
            if config_path.is_file() {
                tracing::debug!(path = %config_path.display(), "loading configuration");
                return Self::load(&config_path).map(Some);
            }
            if !dir.pop() {
                return Ok(None);
            }
        }
    }

    /// Registry defaults described by this configuration
    pub fn options(&self) -> Result<BenchmarkOptions, ValidationError> {
        self.defaults.options()
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# PulseBench Configuration

[defaults]
# Iterations run and discarded before measurement (non-negative integer)
warm_ups = 100
# Iterations measured per case (positive integer)
runs = 100
"#
        .to_string()
    }
}
