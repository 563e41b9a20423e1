//! Configuration manager for loading and saving application configuration
//!
//! Configuration lives in `<data dir>/config.json`. Writes go through a
//! temporary file in the same directory that is persisted over the old file,
//! so a crash never leaves a half-written config behind.

use crate::config::models::AppConfig;
use crate::error::{GotoAppError, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the data directory
pub const HOME_ENV: &str = "GOTOAPP_HOME";

/// Configuration manager
pub struct ConfigManager;

impl ConfigManager {
    /// Get the data directory holding config and logs
    ///
    /// Resolution order: `$GOTOAPP_HOME`, `%APPDATA%\GoToApp`,
    /// `$XDG_CONFIG_HOME/gotoapp`, `$HOME/.config/gotoapp`, `./gotoapp`.
    pub fn data_dir() -> PathBuf {
        if let Ok(home) = std::env::var(HOME_ENV) {
            return PathBuf::from(home);
        }
        if let Ok(appdata) = std::env::var("APPDATA") {
            return PathBuf::from(appdata).join("GoToApp");
        }
        if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("gotoapp");
        }
        std::env::var("HOME").map_or_else(
            |_| PathBuf::from(".").join("gotoapp"),
            |home| PathBuf::from(home).join(".config").join("gotoapp"),
        )
    }

    /// Get the path to the configuration file
    pub fn get_config_path() -> PathBuf {
        Self::data_dir().join("config.json")
    }

    /// Load configuration from the default location
    ///
    /// If the configuration file doesn't exist or is corrupt, returns default configuration.
    pub fn load() -> Result<AppConfig> {
        Self::load_from(&Self::get_config_path())
    }

    /// Load configuration from an explicit path
    pub fn load_from(config_path: &Path) -> Result<AppConfig> {
        if !config_path.exists() {
            info!("Configuration file not found, using defaults");
            return Ok(AppConfig::default());
        }

        let json = std::fs::read_to_string(config_path)?;

        match serde_json::from_str::<AppConfig>(&json) {
            Ok(config) => {
                info!("Configuration loaded successfully");
                Ok(config.sanitized())
            }
            Err(e) => {
                warn!("Failed to parse configuration, using defaults: {}", e);
                Ok(AppConfig::default())
            }
        }
    }

    /// Save configuration to the default location
    pub fn save(config: &AppConfig) -> Result<()> {
        Self::save_to(config, &Self::get_config_path())
    }

    /// Save configuration to an explicit path with an atomic write
    pub fn save_to(config: &AppConfig, config_path: &Path) -> Result<()> {
        let config_dir = config_path.parent().ok_or_else(|| {
            GotoAppError::ConfigError(crate::error::StringError::new("Invalid config path"))
        })?;
        std::fs::create_dir_all(config_dir)?;

        let json = serde_json::to_string_pretty(config)?;
        let mut temp = tempfile::NamedTempFile::new_in(config_dir)?;
        temp.write_all(json.as_bytes())?;
        temp.as_file().sync_all()?;
        temp.persist(config_path)
            .map_err(|e| GotoAppError::IoError(e.error))?;

        info!("Configuration saved to {}", config_path.display());
        Ok(())
    }
}
