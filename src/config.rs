//! Configuration file support for animevsub-provider.
//!
//! This module loads and saves provider settings from a TOML configuration
//! file. Every field has a default so a partial file is valid.

use crate::aggregate::DEFAULT_PAGE_LIMIT;
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Provider configuration settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the Hasukatsu API
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Provider name sent with episode requests
    #[serde(default = "default_provider_name")]
    pub provider_name: String,

    /// Episodes requested per page
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,

    /// Maximum number of search results
    #[serde(default = "default_search_limit")]
    pub search_limit: u32,

    /// Server used when neither the caller nor the episode names one
    #[serde(default = "default_server")]
    pub default_server: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn default_api_base_url() -> String {
    "https://api.hasukatsu.site".to_string()
}

fn default_provider_name() -> String {
    "ANIMEVIETSUB".to_string()
}

fn default_page_limit() -> u32 {
    DEFAULT_PAGE_LIMIT
}

fn default_search_limit() -> u32 {
    20
}

fn default_server() -> String {
    "AnimeVsub".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Config {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            provider_name: default_provider_name(),
            page_limit: default_page_limit(),
            search_limit: default_search_limit(),
            default_server: default_server(),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Get the path to the config file.
    ///
    /// Returns ~/.config/animevsub/config.toml on Linux,
    /// or a platform-appropriate location on other systems.
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, "Could not find config directory")
            })?
            .join("animevsub");

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from disk.
    ///
    /// Returns default config if the file doesn't exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    /// Load config from `path`, or defaults if there is no file there.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse a config from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        if config.page_limit == 0 {
            return Err(AppError::Config("page_limit must be at least 1".to_string()));
        }
        Ok(config)
    }

    /// Render the config as the TOML written to disk.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Save config to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    /// Save config to `path`.
    ///
    /// Creates the parent directory if it doesn't exist.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Write a default config to `path` unless a file is already there.
    ///
    /// Returns whether a file was written.
    pub fn create_default_at(path: &Path) -> Result<bool> {
        if path.exists() {
            return Ok(false);
        }
        Self::new().save_to(path)?;
        Ok(true)
    }
}
