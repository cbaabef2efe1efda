use std::{path::PathBuf, sync::OnceLock};

use config::{Config, File};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("The configuration has already been initialized")]
    ConfigAlreadyInitialized,

    #[error("Unable to read the configuration file: {0}")]
    UnableToReadConfig(#[from] config::ConfigError),
}

/// Configuration of the command line tool.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct FerzConfig {
    /// Variant used when a command does not name one
    pub default_variant: String,

    /// Whether castling moves are written in the king-captures-rook form by default
    pub chess960: bool,

    /// Log filter used when `RUST_LOG` is not set
    pub log_level: String,
}

impl Default for FerzConfig {
    fn default() -> Self {
        Self { default_variant: String::from("chess"), chess960: false, log_level: String::from("warn") }
    }
}

static CONFIG: OnceLock<FerzConfig> = OnceLock::new();

/// Get the configuration, or the defaults when none was loaded
pub fn get_config() -> &'static FerzConfig {
    CONFIG.get_or_init(FerzConfig::default)
}

/// Reads a configuration file. Missing keys take their default value.
pub fn load(path: PathBuf) -> Result<FerzConfig, ConfigError> {
    let settings = Config::builder().add_source(File::from(path)).build()?;
    Ok(settings.try_deserialize()?)
}

/// Initialize the configuration from a file. A missing file leaves the defaults in place.
pub fn initialize(path: PathBuf) -> Result<(), ConfigError> {
    let config = if path.exists() { load(path)? } else { FerzConfig::default() };
    CONFIG.set(config).map_err(|_| ConfigError::ConfigAlreadyInitialized)
}
