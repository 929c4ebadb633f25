//! Platform configuration.
//!
//! One `[[drivers]]` entry per bus master, matched to the enumerated
//! transports by position:
//!
//! ```toml
//! max_buses = 4
//!
//! [[drivers]]
//! name = "office"
//! max_gears = 16
//!
//! [[drivers]]
//! name = "hall"
//! ```

use std::path::{Path, PathBuf};

use dalilight_core::constants::{DEFAULT_MAX_BUSES, DEFAULT_MAX_GEARS, SHORT_ADDRESS_COUNT};
use serde::{Deserialize, Serialize};

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level platform configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaliConfig {
    /// Per-bus settings, in transport enumeration order.
    #[serde(default)]
    pub drivers: Vec<DriverConfig>,

    /// Number of buses the identifier space is sized for.
    #[serde(default = "default_max_buses")]
    pub max_buses: usize,
}

/// Settings for a single bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Name used as prefix for lamp names and for the bus entity.
    pub name: String,

    /// Number of short addresses probed during discovery.
    #[serde(default = "default_max_gears")]
    pub max_gears: u8,
}

fn default_max_buses() -> usize {
    DEFAULT_MAX_BUSES
}

fn default_max_gears() -> u8 {
    DEFAULT_MAX_GEARS
}

impl Default for DaliConfig {
    fn default() -> Self {
        Self {
            drivers: Vec::new(),
            max_buses: default_max_buses(),
        }
    }
}

impl DriverConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            max_gears: default_max_gears(),
        }
    }

    pub fn with_max_gears(mut self, max_gears: u8) -> Self {
        self.max_gears = max_gears;
        self
    }
}

impl DaliConfig {
    /// Parse and validate a TOML document.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed TOML and
    /// `ConfigError::Invalid` if validation fails.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: DaliConfig = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Read` if the file cannot be read, otherwise the
    /// same errors as [`from_toml_str`](Self::from_toml_str).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&input)
    }

    /// Check the configuration for values the platform cannot honour.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_buses == 0 {
            return Err(ConfigError::Invalid(
                "max_buses must be at least 1".to_string(),
            ));
        }
        if self.drivers.len() > self.max_buses {
            return Err(ConfigError::Invalid(format!(
                "{} drivers configured but max_buses is {}",
                self.drivers.len(),
                self.max_buses
            )));
        }
        for (index, driver) in self.drivers.iter().enumerate() {
            if driver.name.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "driver {index}: name must not be empty"
                )));
            }
            if driver.max_gears == 0 || driver.max_gears > SHORT_ADDRESS_COUNT {
                return Err(ConfigError::Invalid(format!(
                    "driver {index}: max_gears must be 1-{SHORT_ADDRESS_COUNT}, got {}",
                    driver.max_gears
                )));
            }
        }
        Ok(())
    }
}
