//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.thermocast.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = ".thermocast.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Outbound HTTP settings shared by all providers.
    #[serde(default)]
    pub http: HttpConfig,

    /// OpenWeatherMap provider.
    #[serde(default)]
    pub openweathermap: OpenWeatherMapConfig,

    /// Weather Underground provider.
    #[serde(default)]
    pub wunderground: WundergroundConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the server listens on.
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

/// Outbound HTTP settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout for provider calls, in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    10
}

/// OpenWeatherMap settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenWeatherMapConfig {
    /// Whether the provider takes part in aggregation.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// API key sent with each request.
    #[serde(default)]
    pub api_key: String,

    /// Scheme and host of the API.
    #[serde(default = "default_owm_base_url")]
    pub base_url: String,
}

impl Default for OpenWeatherMapConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: String::new(),
            base_url: default_owm_base_url(),
        }
    }
}

fn default_owm_base_url() -> String {
    "http://api.openweathermap.org".to_string()
}

/// Weather Underground settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WundergroundConfig {
    /// Whether the provider takes part in aggregation.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// API key, sent as a path segment.
    #[serde(default = "default_wu_api_key")]
    pub api_key: String,

    /// Scheme and host of the API.
    #[serde(default = "default_wu_base_url")]
    pub base_url: String,
}

impl Default for WundergroundConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: default_wu_api_key(),
            base_url: default_wu_base_url(),
        }
    }
}

fn default_wu_api_key() -> String {
    "api-key".to_string()
}

fn default_wu_base_url() -> String {
    "http://api.wunderground.com".to_string()
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were actually given.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref bind) = args.bind {
            self.server.bind = bind.clone();
        }

        if let Some(timeout) = args.timeout {
            self.http.timeout_seconds = timeout;
        }

        if let Some(ref key) = args.owm_key {
            self.openweathermap.api_key = key.clone();
        }
        if let Some(ref key) = args.wu_key {
            self.wunderground.api_key = key.clone();
        }

        if args.no_openweathermap {
            self.openweathermap.enabled = false;
        }
        if args.no_wunderground {
            self.wunderground.enabled = false;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> Result<String> {
        toml::to_string_pretty(&Config::default()).context("Failed to serialize default config")
    }
}
