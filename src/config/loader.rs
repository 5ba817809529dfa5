use std::fs;
use std::path::Path;

use crate::config::types::EngineConfig;
use crate::error::ConfigError;

impl EngineConfig {
    /// Loads configuration from a TOML file.
    ///
    /// - If the file doesn't exist, returns `EngineConfig::default()`.
    /// - If the file exists, parses it as TOML and validates.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(EngineConfig::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: EngineConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: Some(path.to_path_buf()),
                source: e,
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Parses and validates configuration from an in-memory TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError {
                path: None,
                source: e,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// A zero comparison depth would make every structured value unequal,
    /// which turns persistence into a save-on-every-change loop.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.equality_depth == 0 {
            return Err(ConfigError::ValidationError {
                message: "equality_depth must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
