//! Configuration management for the Vaayu application
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::VaayuError;
use crate::models::StationId;
use anyhow::{Context, Result};
use config::{Config, Environment, File, Map};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable the weather provider key is also read from
pub const API_KEY_ENV: &str = "AVWX_API_KEY";

/// Root configuration structure for the Vaayu application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaayuConfig {
    /// Weather provider configuration
    #[serde(default)]
    pub provider: ProviderConfig,
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Observation cache configuration
    #[serde(default)]
    pub cache: CacheConfig,
    /// Station history configuration
    #[serde(default)]
    pub history: HistoryConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Weather provider (AVWX) settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// AVWX API token
    pub api_key: Option<String>,
    /// Base URL for the AVWX API
    #[serde(default = "default_provider_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_provider_timeout")]
    pub timeout_seconds: u32,
    /// Maximum number of retries for transient failures
    #[serde(default = "default_provider_max_retries")]
    pub max_retries: u32,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    /// Directory holding the built dashboard
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

/// Observation cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Time-to-live in seconds, 0 disables caching
    #[serde(default = "default_cache_ttl")]
    pub ttl_seconds: u32,
}

/// Station history settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Maximum number of remembered stations
    #[serde(default = "default_history_capacity")]
    pub capacity: u32,
    /// Stations shown before anything has been queried
    #[serde(default = "default_history_seed")]
    pub seed: Vec<String>,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_provider_base_url() -> String {
    "https://avwx.rest/api".to_string()
}

fn default_provider_timeout() -> u32 {
    10
}

fn default_provider_max_retries() -> u32 {
    2
}

fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    3000
}

fn default_static_dir() -> String {
    "dist".to_string()
}

fn default_cache_ttl() -> u32 {
    300
}

fn default_history_capacity() -> u32 {
    8
}

fn default_history_seed() -> Vec<String> {
    ["KJFK", "EGLL", "VABB", "RJTT"]
        .iter()
        .map(|s| (*s).to_string())
        .collect()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_provider_base_url(),
            timeout_seconds: default_provider_timeout(),
            max_retries: default_provider_max_retries(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            static_dir: default_static_dir(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_cache_ttl(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: default_history_capacity(),
            seed: default_history_seed(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for VaayuConfig {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            server: ServerConfig::default(),
            cache: CacheConfig::default(),
            history: HistoryConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl VaayuConfig {
    /// Load configuration from the given file (or the default location)
    /// and the process environment
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        Self::load_with_env(config_path, None)
    }

    /// Same as [`Self::load_from_path`], with `env` standing in for the
    /// process environment when given
    fn load_with_env(
        config_path: Option<PathBuf>,
        env: Option<Map<String, String>>,
    ) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path()
                .filter(|path| path.exists())
                .unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Add environment variable overrides, e.g. VAAYU_PROVIDER__API_KEY
        builder = builder.add_source(
            Environment::with_prefix("VAAYU")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env.clone()),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: VaayuConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        if config.provider.api_key.is_none() {
            config.provider.api_key = match &env {
                Some(vars) => vars.get(API_KEY_ENV).cloned(),
                None => std::env::var(API_KEY_ENV).ok(),
            };
        }

        // Apply defaults for missing values
        config.apply_defaults();

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("vaayu").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self
            .provider
            .api_key
            .as_ref()
            .is_some_and(|key| key.trim().is_empty())
        {
            self.provider.api_key = None;
        }
        if self.provider.base_url.is_empty() {
            self.provider.base_url = default_provider_base_url();
        }
        if self.provider.timeout_seconds == 0 {
            self.provider.timeout_seconds = default_provider_timeout();
        }
        if self.server.host.is_empty() {
            self.server.host = default_server_host();
        }
        if self.server.port == 0 {
            self.server.port = default_server_port();
        }
        if self.server.static_dir.is_empty() {
            self.server.static_dir = default_static_dir();
        }
        if self.history.capacity == 0 {
            self.history.capacity = default_history_capacity();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_key()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate the provider API key, when one is set
    pub fn validate_api_key(&self) -> Result<()> {
        if let Some(api_key) = &self.provider.api_key {
            if api_key.len() < 8 {
                return Err(VaayuError::config(
                    "AVWX API key appears to be invalid (too short). Please check your API key.",
                )
                .into());
            }

            if api_key.len() > 200 {
                return Err(VaayuError::config(
                    "AVWX API key appears to be invalid (too long). Please check your API key.",
                )
                .into());
            }
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.provider.timeout_seconds > 120 {
            return Err(
                VaayuError::config("Provider timeout cannot exceed 120 seconds").into(),
            );
        }

        if self.provider.max_retries > 10 {
            return Err(VaayuError::config("Provider max retries cannot exceed 10").into());
        }

        if self.cache.ttl_seconds > 3600 {
            return Err(
                VaayuError::config("Cache TTL cannot exceed 3600 seconds (1 hour)").into(),
            );
        }

        if self.history.capacity > 50 {
            return Err(VaayuError::config("History capacity cannot exceed 50").into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(VaayuError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(VaayuError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if !self.provider.base_url.starts_with("http://")
            && !self.provider.base_url.starts_with("https://")
        {
            return Err(VaayuError::config(
                "Provider base URL must be a valid HTTP or HTTPS URL",
            )
            .into());
        }

        for code in &self.history.seed {
            StationId::parse(code).map_err(|_| {
                VaayuError::config(format!("Invalid station '{code}' in history seed"))
            })?;
        }

        Ok(())
    }

    /// Parsed history seed stations
    #[must_use]
    pub fn history_seed(&self) -> Vec<StationId> {
        self.history
            .seed
            .iter()
            .filter_map(|code| StationId::parse(code).ok())
            .collect()
    }
}
