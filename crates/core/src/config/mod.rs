//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (MCP_CONAN_*)
//! 2. TOML config file (if MCP_CONAN_CONFIG_FILE set)
//! 3. Built-in defaults

use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::cache::CacheOptions;

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (MCP_CONAN_*)
/// 2. TOML config file (if MCP_CONAN_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// GitHub token attached as a bearer credential to registry and README
    /// requests when present.
    ///
    /// Set via MCP_CONAN_GITHUB_TOKEN environment variable. Unauthenticated
    /// requests work but are subject to much tighter upstream rate limits.
    #[serde(default)]
    pub github_token: Option<String>,

    /// Base URL of the recipe index contents API.
    ///
    /// Set via MCP_CONAN_REGISTRY_BASE_URL environment variable.
    #[serde(default = "default_registry_base_url")]
    pub registry_base_url: String,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via MCP_CONAN_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via MCP_CONAN_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Default cache TTL in seconds for entries stored without one.
    ///
    /// Set via MCP_CONAN_CACHE_TTL_SECS environment variable.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Ceiling on the cache's summed estimated entry size, in bytes.
    ///
    /// Set via MCP_CONAN_CACHE_MAX_BYTES environment variable.
    #[serde(default = "default_cache_max_bytes")]
    pub cache_max_bytes: usize,

    /// Interval between background sweeps of expired cache entries, seconds.
    ///
    /// Set via MCP_CONAN_CACHE_SWEEP_SECS environment variable.
    #[serde(default = "default_cache_sweep_secs")]
    pub cache_sweep_secs: u64,
}

fn default_registry_base_url() -> String {
    "https://api.github.com/repos/conan-io/conan-center-index".into()
}

fn default_user_agent() -> String {
    "conan-mcp/0.1".into()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_cache_ttl_secs() -> u64 {
    3600
}

fn default_cache_max_bytes() -> usize {
    104_857_600 // 100MB
}

fn default_cache_sweep_secs() -> u64 {
    300
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            github_token: None,
            registry_base_url: default_registry_base_url(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            cache_ttl_secs: default_cache_ttl_secs(),
            cache_max_bytes: default_cache_max_bytes(),
            cache_sweep_secs: default_cache_sweep_secs(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Cache construction settings derived from this configuration.
    pub fn cache_options(&self) -> CacheOptions {
        CacheOptions {
            default_ttl: Duration::from_secs(self.cache_ttl_secs),
            max_bytes: self.cache_max_bytes,
            sweep_interval: Duration::from_secs(self.cache_sweep_secs),
        }
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `MCP_CONAN_`
    /// 2. TOML file from `MCP_CONAN_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("MCP_CONAN_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("MCP_CONAN_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
