//! Configuration management for echonote.
//!
//! Settings live in a TOML file under the platform configuration directory.
//! A missing file loads defaults; the application saves the config back on
//! startup so the file exists for the user to edit.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::APP_NAME;
use crate::language::Language;

/// Core configuration structure for the application.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Base URL of the transcription backend
    #[serde(default = "default_api_url", skip_serializing_if = "is_default_api_url")]
    pub api_url: String,

    /// Language sent with uploads unless overridden per command
    #[serde(default, skip_serializing_if = "is_default_language")]
    pub language: Language,

    /// Seconds to wait for the backend before giving up on a request
    #[serde(
        default = "default_request_timeout",
        skip_serializing_if = "is_default_request_timeout"
    )]
    pub request_timeout: u64,
}

fn default_api_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn is_default_api_url(v: &str) -> bool {
    v == default_api_url()
}

fn is_default_language(v: &Language) -> bool {
    *v == Language::default()
}

fn default_request_timeout() -> u64 {
    300
}

fn is_default_request_timeout(v: &u64) -> bool {
    *v == default_request_timeout()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            language: Language::default(),
            request_timeout: default_request_timeout(),
        }
    }
}

impl Config {
    /// Base URL of the transcription backend
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Default upload language
    pub fn language(&self) -> Language {
        self.language
    }

    /// Get the request timeout as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

/// Manages loading and saving configuration files.
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Creates a new ConfigManager with the default configuration directory.
    pub fn new() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        Ok(Self { config_path })
    }

    /// Creates a new ConfigManager with a specified configuration directory.
    #[cfg(test)]
    pub fn with_config_dir<P: AsRef<std::path::Path>>(dir: P) -> Self {
        let config_path = dir.as_ref().join(format!("{}.toml", APP_NAME));
        Self { config_path }
    }

    /// Returns the default path to the configuration file.
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = config_dir().context("Failed to retrieve configuration directory")?;
        Ok(config_dir.join(APP_NAME).join(format!("{}.toml", APP_NAME)))
    }

    /// Loads the configuration from the config file or returns default.
    pub fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            return Ok(Config::default());
        }

        let config_content = fs::read_to_string(&self.config_path)
            .with_context(|| format!("Failed to read config file at {:?}", self.config_path))?;

        let config: Config = toml::from_str(&config_content)
            .with_context(|| format!("Failed to parse config file at {:?}", self.config_path))?;

        if config.request_timeout == 0 {
            warn!("request_timeout is 0; uploads will fail immediately");
        }

        Ok(config)
    }

    /// Saves the configuration to the config file.
    pub fn save(&self, config: &Config) -> Result<()> {
        let config_dir = self
            .config_path
            .parent()
            .with_context(|| format!("Failed to get parent directory of {:?}", self.config_path))?;

        fs::create_dir_all(config_dir)
            .with_context(|| format!("Failed to create config directory at {:?}", config_dir))?;

        let serialized =
            toml::to_string_pretty(&config).context("Failed to serialize configuration")?;

        fs::write(&self.config_path, serialized)
            .with_context(|| format!("Failed to write config file at {:?}", self.config_path))?;

        Ok(())
    }

    /// Returns the path to the configuration file.
    pub fn config_path(&self) -> &std::path::Path {
        &self.config_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api_url(), "http://127.0.0.1:8000");
        assert_eq!(config.language(), Language::En);
        assert_eq!(config.request_timeout(), Duration::from_secs(300));
    }

    #[test]
    fn test_config_serialization() {
        let config = Config {
            api_url: "http://notes.example:9000".to_string(),
            language: Language::Yue,
            ..Default::default()
        };

        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();

        assert_eq!(config.api_url, deserialized.api_url);
        assert_eq!(config.language, deserialized.language);
        assert_eq!(config.request_timeout, deserialized.request_timeout);
    }

    #[test]
    fn test_empty_file_loads_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.api_url, default_api_url());
        assert_eq!(config.language, Language::En);
    }

    #[test]
    fn test_config_manager_save_load() {
        let temp_dir = tempfile::tempdir().unwrap();

        let manager = ConfigManager::with_config_dir(temp_dir.path());

        let config = Config {
            language: Language::Zh,
            request_timeout: 60,
            ..Default::default()
        };

        manager.save(&config).unwrap();
        let loaded = manager.load().unwrap();

        assert_eq!(loaded.language, Language::Zh);
        assert_eq!(loaded.request_timeout, 60);
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_config_dir(temp_dir.path());
        let loaded = manager.load().unwrap();
        assert_eq!(loaded.api_url, default_api_url());
    }
}
