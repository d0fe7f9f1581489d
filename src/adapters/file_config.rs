//! Configuration adapters.
//!
//! Implements [`ConfigPort`] two ways: the built-in settings table
//! ([`DefaultConfig`]) and a JSON file ([`JsonFileConfig`]).  Both hand
//! back validated [`Settings`]; out-of-range values are rejected, never
//! clamped.

use std::path::PathBuf;

use log::info;

use crate::app::ports::ConfigPort;
use crate::config::{ConfigError, Settings};

/// The reference deployment's settings table.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultConfig;

impl ConfigPort for DefaultConfig {
    fn load(&self) -> Result<Settings, ConfigError> {
        let settings = Settings::default();
        settings.validate()?;
        info!("Config: built-in defaults");
        Ok(settings)
    }
}

/// Settings read from a JSON file.  Missing keys take their default.
#[derive(Debug, Clone)]
pub struct JsonFileConfig {
    path: PathBuf,
}

impl JsonFileConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ConfigPort for JsonFileConfig {
    fn load(&self) -> Result<Settings, ConfigError> {
        let text = std::fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::NotFound,
            _ => ConfigError::IoError,
        })?;
        let settings = Settings::from_json(&text)?;
        info!("Config: loaded {}", self.path.display());
        Ok(settings)
    }
}
