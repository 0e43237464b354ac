//! Configuration loading and resolution
//!
//! Settings are resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing or unreadable TOML file is not fatal: a warning is logged and
//! compiled defaults are used.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable holding the generative-AI API key
pub const ENV_API_KEY: &str = "ALP_GOOGLE_API_KEY";

/// Fallback environment variable for the API key
pub const ENV_API_KEY_FALLBACK: &str = "GOOGLE_API_KEY";

/// Environment variable holding the bearer token signing secret
pub const ENV_TOKEN_SECRET: &str = "ALP_TOKEN_SECRET";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TomlConfig {
    /// Database connection string (e.g. `sqlite://alp.db?mode=rwc`)
    #[serde(default)]
    pub database_url: Option<String>,

    /// Bind address
    #[serde(default)]
    pub host: Option<String>,

    /// HTTP server port
    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub auth: AuthConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Generative-AI client configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmConfig {
    /// API key (environment variables take precedence)
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Per-request timeout in seconds
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_llm_base_url(),
            max_output_tokens: default_max_output_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_llm_timeout_secs(),
        }
    }
}

/// Bearer token verification configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    /// HMAC secret shared with the token issuer. Empty disables the gate.
    #[serde(default)]
    pub token_secret: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_llm_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_max_output_tokens() -> u32 {
    1000
}

fn default_temperature() -> f32 {
    0.7
}

fn default_llm_timeout_secs() -> u64 {
    60
}

/// Compiled defaults used when no other source provides a value
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub database_url: String,
    pub host: String,
    pub port: u16,
}

impl Default for CompiledDefaults {
    fn default() -> Self {
        Self {
            database_url: "sqlite://alp.db?mode=rwc".to_string(),
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

/// Command-line overrides (already merged with their environment variables by clap)
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub database_url: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub llm: LlmConfig,
    /// Resolved API key; `None` leaves AI endpoints unavailable
    pub api_key: Option<String>,
    /// Resolved token secret; `None` disables bearer authentication
    pub token_secret: Option<String>,
}

impl ServiceConfig {
    /// Merge command line, environment, TOML and compiled defaults
    pub fn resolve(cli: CliOverrides, toml_config: TomlConfig) -> Self {
        let defaults = CompiledDefaults::default();

        let api_key = resolve_api_key(
            std::env::var(ENV_API_KEY).ok(),
            std::env::var(ENV_API_KEY_FALLBACK).ok(),
            toml_config.llm.api_key.clone(),
        );

        let token_secret = std::env::var(ENV_TOKEN_SECRET)
            .ok()
            .or_else(|| toml_config.auth.token_secret.clone())
            .filter(|s| is_valid_key(s));

        Self {
            database_url: cli
                .database_url
                .or(toml_config.database_url)
                .unwrap_or(defaults.database_url),
            host: cli.host.or(toml_config.host).unwrap_or(defaults.host),
            port: cli.port.or(toml_config.port).unwrap_or(defaults.port),
            log_level: toml_config.logging.level,
            llm: toml_config.llm,
            api_key,
            token_secret,
        }
    }
}

/// Resolve the AI API key from its sources
///
/// **Priority:** `ALP_GOOGLE_API_KEY` → `GOOGLE_API_KEY` → TOML
pub fn resolve_api_key(
    primary_env: Option<String>,
    fallback_env: Option<String>,
    toml_key: Option<String>,
) -> Option<String> {
    let candidates = [
        (ENV_API_KEY, primary_env),
        (ENV_API_KEY_FALLBACK, fallback_env),
        ("TOML", toml_key),
    ];

    let valid: Vec<(&str, String)> = candidates
        .into_iter()
        .filter_map(|(source, key)| key.filter(|k| is_valid_key(k)).map(|k| (source, k)))
        .collect();

    if valid.len() > 1 {
        let sources: Vec<&str> = valid.iter().map(|(source, _)| *source).collect();
        warn!(
            "AI API key found in multiple sources: {}. Using {} (highest priority).",
            sources.join(", "),
            sources[0]
        );
    }

    match valid.into_iter().next() {
        Some((source, key)) => {
            info!("AI API key loaded from {}", source);
            Some(key)
        }
        None => {
            warn!(
                "AI API key not configured. Set {} or add api_key under [llm] in the config file",
                ENV_API_KEY
            );
            None
        }
    }
}

/// Validate key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Default configuration file path for the platform
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("alp").join("config.toml"))
}

/// Where the TOML configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    /// Parsed from this file
    File(PathBuf),
    /// No file at this path
    Missing(PathBuf),
    /// File present but unreadable or malformed
    Invalid(String),
    /// No config directory on this platform
    NoConfigDir,
}

impl ConfigOrigin {
    /// Log the outcome; call once tracing is initialized
    pub fn log(&self) {
        match self {
            ConfigOrigin::File(path) => info!("Loaded configuration from {}", path.display()),
            ConfigOrigin::Missing(path) => {
                warn!("Config file not found: {} (using defaults)", path.display())
            }
            ConfigOrigin::Invalid(e) => warn!("{} (using defaults)", e),
            ConfigOrigin::NoConfigDir => {
                warn!("Could not determine config directory; using defaults")
            }
        }
    }
}

/// Read TOML configuration without logging, degrading to defaults
///
/// For callers that need the file before tracing is set up; the returned
/// [`ConfigOrigin`] is logged later.
pub fn read_toml_config_or_default(path: Option<&Path>) -> (TomlConfig, ConfigOrigin) {
    let path = match path.map(Path::to_path_buf).or_else(default_config_path) {
        Some(path) => path,
        None => return (TomlConfig::default(), ConfigOrigin::NoConfigDir),
    };

    if !path.exists() {
        return (TomlConfig::default(), ConfigOrigin::Missing(path));
    }

    match read_toml_config(&path) {
        Ok(config) => (config, ConfigOrigin::File(path)),
        Err(e) => (TomlConfig::default(), ConfigOrigin::Invalid(e.to_string())),
    }
}

/// Load TOML configuration, degrading to defaults if the file is missing
pub fn load_toml_config(path: Option<&Path>) -> TomlConfig {
    let (config, origin) = read_toml_config_or_default(path);
    origin.log();
    config
}

/// Read and parse a TOML configuration file
pub fn read_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}
