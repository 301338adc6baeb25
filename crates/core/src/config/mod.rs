//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (BROLLY_*)
//! 2. TOML config file (if BROLLY_CONFIG_FILE set)
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
/// 1. Environment variables (BROLLY_*)
/// 2. TOML config file (if BROLLY_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite response store.
    ///
    /// Set via BROLLY_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Prefix for generation store names.
    ///
    /// Set via BROLLY_CACHE_PREFIX environment variable.
    #[serde(default = "default_cache_prefix")]
    pub cache_prefix: String,

    /// Version tag of the current generation. Bumping it makes the next
    /// install+activate cycle discard every older generation's stores.
    ///
    /// Set via BROLLY_VERSION environment variable.
    #[serde(default = "default_version")]
    pub version: String,

    /// Origin of the application itself; same-origin requests are served
    /// network-first, everything else cache-first.
    ///
    /// Set via BROLLY_APP_ORIGIN environment variable.
    #[serde(default = "default_app_origin")]
    pub app_origin: String,

    /// Bootstrap resource URLs pre-populated into the static store at
    /// install time.
    ///
    /// Set via BROLLY_PRECACHE_URLS environment variable.
    #[serde(default)]
    pub precache_urls: Vec<String>,

    /// URL of the root document served as the navigation fallback.
    ///
    /// Set via BROLLY_OFFLINE_URL environment variable.
    #[serde(default = "default_offline_url")]
    pub offline_url: String,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via BROLLY_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to fetch per request.
    ///
    /// Set via BROLLY_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via BROLLY_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// URL substrings whose requests are never intercepted (telemetry).
    ///
    /// Set via BROLLY_TELEMETRY_PATTERNS environment variable.
    #[serde(default = "default_telemetry_patterns")]
    pub telemetry_patterns: Vec<String>,

    /// URL substrings identifying font hosts; their offline fallback is an
    /// empty stylesheet.
    ///
    /// Set via BROLLY_FONT_PATTERNS environment variable.
    #[serde(default = "default_font_patterns")]
    pub font_patterns: Vec<String>,

    /// URL substrings identifying third-party script hosts; their offline
    /// fallback is an informational script stub.
    ///
    /// Set via BROLLY_SCRIPT_PATTERNS environment variable.
    #[serde(default = "default_script_patterns")]
    pub script_patterns: Vec<String>,
}

/// Names of the two current generation stores.
///
/// An explicit value object rather than ambient constants: the generation
/// manager receives it at construction and is the sole owner of the
/// name-to-store bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationNames {
    pub static_name: String,
    pub dynamic_name: String,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./brolly-cache.sqlite")
}

fn default_cache_prefix() -> String {
    "brolly".into()
}

fn default_version() -> String {
    "v1".into()
}

fn default_app_origin() -> String {
    "http://localhost:8080".into()
}

fn default_offline_url() -> String {
    "http://localhost:8080/index.html".into()
}

fn default_user_agent() -> String {
    "brolly/0.1".into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_telemetry_patterns() -> Vec<String> {
    vec!["google-analytics.com".into(), "googletagmanager.com".into(), "/collect?".into()]
}

fn default_font_patterns() -> Vec<String> {
    vec!["fonts.googleapis.com".into(), "fonts.gstatic.com".into()]
}

fn default_script_patterns() -> Vec<String> {
    vec!["cdnjs.cloudflare.com".into(), "cdn.jsdelivr.net".into(), "unpkg.com".into()]
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            cache_prefix: default_cache_prefix(),
            version: default_version(),
            app_origin: default_app_origin(),
            precache_urls: Vec::new(),
            offline_url: default_offline_url(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
            telemetry_patterns: default_telemetry_patterns(),
            font_patterns: default_font_patterns(),
            script_patterns: default_script_patterns(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Store names of the generation described by this configuration.
    pub fn generation_names(&self) -> GenerationNames {
        GenerationNames {
            static_name: format!("{}-static-{}", self.cache_prefix, self.version),
            dynamic_name: format!("{}-dynamic-{}", self.cache_prefix, self.version),
        }
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `BROLLY_`
    /// 2. TOML file from `BROLLY_CONFIG_FILE` (if set)
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

        if let Ok(config_path) = std::env::var("BROLLY_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("BROLLY_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
