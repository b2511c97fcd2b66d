//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (PAGEFETCH_*)
//! 2. TOML config file (if PAGEFETCH_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (PAGEFETCH_*)
/// 2. TOML config file (if PAGEFETCH_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite database holding the last rendered document.
    ///
    /// Set via PAGEFETCH_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for plain HTTP requests.
    ///
    /// Set via PAGEFETCH_USER_AGENT environment variable. The browser uses
    /// its own fixed stealth user agent.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via PAGEFETCH_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum number of redirects followed by plain HTTP requests.
    ///
    /// Set via PAGEFETCH_MAX_REDIRECTS environment variable.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    /// Whether rendered mode (headless browser) is enabled.
    ///
    /// Set via PAGEFETCH_RENDER_ENABLED environment variable.
    #[serde(default = "default_true")]
    pub render_enabled: bool,

    /// Upper bound on a single browser render, launch to teardown.
    ///
    /// Set via PAGEFETCH_RENDER_TIMEOUT_MS environment variable.
    #[serde(default = "default_render_timeout_ms")]
    pub render_timeout_ms: u64,

    /// Number of browser renders allowed to run at once.
    ///
    /// Set via PAGEFETCH_MAX_CONCURRENT_RENDERS environment variable.
    #[serde(default = "default_max_concurrent_renders")]
    pub max_concurrent_renders: usize,

    /// Chrome/Chromium binary. Auto-detected when unset.
    ///
    /// Set via PAGEFETCH_CHROME_EXECUTABLE environment variable.
    #[serde(default)]
    pub chrome_executable: Option<PathBuf>,

    /// Lifetime of an extracted payload in the cache, in seconds.
    ///
    /// Set via PAGEFETCH_PAYLOAD_TTL_SECS environment variable.
    #[serde(default = "default_payload_ttl_secs")]
    pub payload_ttl_secs: u64,

    /// How often expired payloads are swept from the cache, in seconds.
    ///
    /// Set via PAGEFETCH_SWEEP_INTERVAL_SECS environment variable.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./pagefetch-log.sqlite")
}

fn default_user_agent() -> String {
    "pagefetch/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_max_redirects() -> usize {
    10
}

fn default_true() -> bool {
    true
}

fn default_render_timeout_ms() -> u64 {
    30_000
}

fn default_max_concurrent_renders() -> usize {
    2
}

fn default_payload_ttl_secs() -> u64 {
    36_000 // 10h
}

fn default_sweep_interval_secs() -> u64 {
    120
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            max_redirects: default_max_redirects(),
            render_enabled: true,
            render_timeout_ms: default_render_timeout_ms(),
            max_concurrent_renders: default_max_concurrent_renders(),
            chrome_executable: None,
            payload_ttl_secs: default_payload_ttl_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn render_timeout(&self) -> Duration {
        Duration::from_millis(self.render_timeout_ms)
    }

    pub fn payload_ttl(&self) -> Duration {
        Duration::from_secs(self.payload_ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `PAGEFETCH_`
    /// 2. TOML file from `PAGEFETCH_CONFIG_FILE` (if set)
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

        if let Ok(config_path) = std::env::var("PAGEFETCH_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("PAGEFETCH_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
