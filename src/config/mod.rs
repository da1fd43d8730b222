//! Configuration management for segment-export
//!
//! This module handles loading, parsing, and resolving configuration from:
//! - Configuration files (TOML format)
//! - Environment variables (optionally seeded from a `.env` file)
//! - Command-line arguments (applied by the `cli` module)
//!
//! Configuration precedence (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Configuration file
//! 4. Default values
//!
//! The pipeline never reads any of these sources directly: it receives a
//! [`RunSettings`] produced by [`RunSettings::resolve`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::client::{DEFAULT_API_VERSION, DEFAULT_AUTH_HEADER, Endpoint};
use crate::error::{ConfigError, Result};
use crate::export::Destination;
use crate::model::FetchParameters;

/// Environment variable holding the store domain
pub const ENV_DOMAIN: &str = "SEGMENT_EXPORT_DOMAIN";
/// Environment variable holding the API access token
pub const ENV_ACCESS_TOKEN: &str = "SEGMENT_EXPORT_ACCESS_TOKEN";
/// Environment variable overriding the API version
pub const ENV_API_VERSION: &str = "SEGMENT_EXPORT_API_VERSION";
/// Older variable names, read when the primary ones are unset
pub const LEGACY_ENV_DOMAIN: &str = "SHOPIFY_DOMAIN";
pub const LEGACY_ENV_ACCESS_TOKEN: &str = "SHOPIFY_ACCESS_TOKEN";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// API connection configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Fetch and output defaults
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// API connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Store domain, e.g. `my-shop.example.com`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    /// Admin API access token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    /// Admin API version path segment
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Header carrying the access token
    #[serde(default = "default_auth_header")]
    pub auth_header: String,

    /// Scheme and host replacing `https://{domain}`, for proxies and test servers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Deadline for the whole run in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// Fetch parameter and output defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Segment filter expression
    #[serde(default = "default_query")]
    pub query: String,

    /// Number of members to fetch
    #[serde(default = "default_first")]
    pub first: u32,

    /// Sort key
    #[serde(default = "default_sort_key")]
    pub sort_key: String,

    /// Reverse sort order
    #[serde(default = "default_reverse")]
    pub reverse: bool,

    /// Output file, empty or `-` for stdout
    #[serde(default = "default_output")]
    pub output: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// Enable timestamps in logs
    #[serde(default = "default_log_timestamps")]
    pub timestamps: bool,
}

/// Log level options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

// Default value functions
fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

fn default_auth_header() -> String {
    DEFAULT_AUTH_HEADER.to_string()
}

fn default_timeout() -> u64 {
    5
}

fn default_query() -> String {
    "customer_tags CONTAINS 'task1' AND customer_tags CONTAINS 'level:3'".to_string()
}

fn default_first() -> u32 {
    50
}

fn default_sort_key() -> String {
    "amount_spent".to_string()
}

fn default_reverse() -> bool {
    true
}

fn default_output() -> String {
    "customers.csv".to_string()
}

fn default_log_level() -> LogLevel {
    LogLevel::Warn
}

fn default_log_timestamps() -> bool {
    true
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            domain: None,
            access_token: None,
            api_version: default_api_version(),
            auth_header: default_auth_header(),
            base_url: None,
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            query: default_query(),
            first: default_first(),
            sort_key: default_sort_key(),
            reverse: default_reverse(),
            output: default_output(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            timestamps: default_log_timestamps(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Result<Config>` - Loaded configuration or error
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound(path.display().to_string()),
            _ => ConfigError::InvalidFormat(format!("{}: {e}", path.display())),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Load configuration from the file and environment layers
    ///
    /// An explicit path must exist; the default path is optional.
    ///
    /// # Arguments
    /// * `path` - Explicit configuration file, if given on the command line
    ///
    /// # Returns
    /// * `Result<Config>` - Merged configuration or error
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Self::default_path();
                if default_path.exists() {
                    Self::from_file(&default_path)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_env();
        Ok(config)
    }

    /// Override values from the process environment
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Override values using `lookup` to read environment variables
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(domain) = non_empty(ENV_DOMAIN).or_else(|| non_empty(LEGACY_ENV_DOMAIN)) {
            self.api.domain = Some(domain);
        }
        if let Some(token) =
            non_empty(ENV_ACCESS_TOKEN).or_else(|| non_empty(LEGACY_ENV_ACCESS_TOKEN))
        {
            self.api.access_token = Some(token);
        }
        if let Some(version) = non_empty(ENV_API_VERSION) {
            self.api.api_version = version;
        }
    }

    /// Get the default configuration file path
    ///
    /// # Returns
    /// * `PathBuf` - Path to default configuration file
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("segment-export")
            .join("config.toml")
    }

    /// Validate the configuration
    ///
    /// # Returns
    /// * `Result<()>` - Ok if valid, error otherwise
    pub fn validate(&self) -> Result<()> {
        if self.fetch.first == 0 {
            return Err(invalid("fetch.first", self.fetch.first).into());
        }
        if self.api.timeout_secs == 0 {
            return Err(invalid("api.timeout_secs", self.api.timeout_secs).into());
        }
        if self.api.api_version.trim().is_empty() {
            return Err(invalid("api.api_version", &self.api.api_version).into());
        }
        Ok(())
    }

    /// Get the run deadline as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    /// Render the configuration as TOML with the access token masked
    pub fn to_toml_redacted(&self) -> Result<String> {
        let mut shown = self.clone();
        if shown.api.access_token.is_some() {
            shown.api.access_token = Some("***".to_string());
        }
        toml::to_string_pretty(&shown)
            .map_err(|e| ConfigError::InvalidFormat(e.to_string()).into())
    }
}

fn invalid(field: &str, value: impl fmt::Display) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    }
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

/// Fully resolved settings for one pipeline run
#[derive(Clone)]
pub struct RunSettings {
    pub domain: String,
    pub endpoint: Endpoint,
    credential: String,
    pub auth_header: String,
    pub params: FetchParameters,
    pub destination: Destination,
    pub timeout: Duration,
}

impl RunSettings {
    /// Resolve run settings from configuration
    ///
    /// Fails with `MissingField` when the domain or access token is absent,
    /// before anything touches the network.
    pub fn resolve(config: &Config) -> Result<Self> {
        config.validate()?;

        let domain = required(config.api.domain.as_deref(), "api.domain", ENV_DOMAIN)?;
        let credential = required(
            config.api.access_token.as_deref(),
            "api.access_token",
            ENV_ACCESS_TOKEN,
        )?;

        let endpoint = match config.api.base_url.as_deref() {
            Some(base) => Endpoint::with_base_url(base, &config.api.api_version),
            None => Endpoint::for_domain(&domain, &config.api.api_version),
        };

        let params = FetchParameters::new(
            config.fetch.query.clone(),
            config.fetch.first,
            config.fetch.sort_key.clone(),
            config.fetch.reverse,
        )?;

        Ok(Self {
            domain,
            endpoint,
            credential,
            auth_header: config.api.auth_header.clone(),
            params,
            destination: Destination::parse(&config.fetch.output),
            timeout: config.timeout(),
        })
    }

    /// Access token for the API
    pub fn credential(&self) -> &str {
        &self.credential
    }
}

fn required(value: Option<&str>, field: &str, env: &str) -> Result<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ConfigError::MissingField(format!("{field} (or {env})")).into()),
    }
}

impl fmt::Debug for RunSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunSettings")
            .field("domain", &self.domain)
            .field("endpoint", &self.endpoint)
            .field("credential", &"<redacted>")
            .field("auth_header", &self.auth_header)
            .field("params", &self.params)
            .field("destination", &self.destination)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use std::collections::HashMap;

    fn configured() -> Config {
        let mut config = Config::default();
        config.api.domain = Some("shop.example.com".to_string());
        config.api.access_token = Some("shpat_secret".to_string());
        config
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.api_version, "2025-01");
        assert_eq!(config.api.auth_header, "X-Access-Token");
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.fetch.first, 50);
        assert_eq!(config.fetch.sort_key, "amount_spent");
        assert!(config.fetch.reverse);
        assert_eq!(config.fetch.output, "customers.csv");
        assert_eq!(config.logging.level, LogLevel::Warn);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = Config::from_toml_str(
            r#"
            [api]
            domain = "shop.example.com"
            auth_header = "X-Shopify-Access-Token"

            [fetch]
            first = 10

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.api.domain.as_deref(), Some("shop.example.com"));
        assert_eq!(config.api.auth_header, "X-Shopify-Access-Token");
        assert_eq!(config.api.timeout_secs, 5);
        assert_eq!(config.fetch.first, 10);
        assert_eq!(config.fetch.sort_key, "amount_spent");
        assert_eq!(config.logging.level, LogLevel::Debug);
    }

    #[test]
    fn test_invalid_toml() {
        let err = Config::from_toml_str("[api\ndomain = ").unwrap_err();
        assert!(matches!(err, AppError::Config(ConfigError::InvalidFormat(_))));
    }

    #[test]
    fn test_explicit_missing_file() {
        let err = Config::load(Some(Path::new("/nonexistent/segment-export.toml"))).unwrap_err();
        assert!(matches!(err, AppError::Config(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[api]\ntimeout_secs = 9\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(9));
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config = Config::from_toml_str("[api]\ndomain = \"file.example.com\"\n").unwrap();
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_DOMAIN, "env.example.com"),
            (ENV_ACCESS_TOKEN, "env-token"),
            (ENV_API_VERSION, "  "),
        ]);

        config.apply_env_from(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.api.domain.as_deref(), Some("env.example.com"));
        assert_eq!(config.api.access_token.as_deref(), Some("env-token"));
        // Blank values are ignored
        assert_eq!(config.api.api_version, "2025-01");
    }

    #[test]
    fn test_legacy_env_names_are_fallbacks() {
        let mut config = Config::default();
        let env: HashMap<&str, &str> = HashMap::from([
            (LEGACY_ENV_DOMAIN, "legacy.example.com"),
            (LEGACY_ENV_ACCESS_TOKEN, "legacy-token"),
        ]);
        config.apply_env_from(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.api.domain.as_deref(), Some("legacy.example.com"));
        assert_eq!(config.api.access_token.as_deref(), Some("legacy-token"));

        let mut config = Config::default();
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_DOMAIN, "primary.example.com"),
            (LEGACY_ENV_DOMAIN, "legacy.example.com"),
        ]);
        config.apply_env_from(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.api.domain.as_deref(), Some("primary.example.com"));
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let mut config = configured();
        config.fetch.first = 0;
        assert!(config.validate().is_err());

        let mut config = configured();
        config.api.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = configured();
        config.api.api_version = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_resolve_requires_domain_and_token() {
        let mut config = configured();
        config.api.domain = None;
        let err = RunSettings::resolve(&config).unwrap_err();
        assert!(
            matches!(err, AppError::Config(ConfigError::MissingField(ref f)) if f.starts_with("api.domain"))
        );

        let mut config = configured();
        config.api.access_token = Some("   ".to_string());
        let err = RunSettings::resolve(&config).unwrap_err();
        assert!(
            matches!(err, AppError::Config(ConfigError::MissingField(ref f)) if f.starts_with("api.access_token"))
        );
    }

    #[test]
    fn test_resolve_builds_settings() {
        let mut config = configured();
        config.fetch.output = "-".to_string();

        let settings = RunSettings::resolve(&config).unwrap();
        assert_eq!(
            settings.endpoint.url(),
            "https://shop.example.com/admin/api/2025-01/graphql.json"
        );
        assert_eq!(settings.credential(), "shpat_secret");
        assert_eq!(settings.destination, Destination::Stdout);
        assert_eq!(settings.params.limit(), 50);
        assert_eq!(settings.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_resolve_with_base_url() {
        let mut config = configured();
        config.api.base_url = Some("http://127.0.0.1:8080/".to_string());

        let settings = RunSettings::resolve(&config).unwrap();
        assert_eq!(
            settings.endpoint.url(),
            "http://127.0.0.1:8080/admin/api/2025-01/graphql.json"
        );
    }

    #[test]
    fn test_debug_redacts_credential() {
        let settings = RunSettings::resolve(&configured()).unwrap();
        let debug = format!("{settings:?}");
        assert!(!debug.contains("shpat_secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_toml_output_redacts_token() {
        let rendered = configured().to_toml_redacted().unwrap();
        assert!(!rendered.contains("shpat_secret"));
        assert!(rendered.contains("***"));
        assert!(rendered.contains("shop.example.com"));
    }

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(LogLevel::Trace.to_tracing_level(), tracing::Level::TRACE);
        assert_eq!(LogLevel::Error.to_tracing_level(), tracing::Level::ERROR);
    }
}
