//! Configuration loading and constants.
//!
//! Loads optional configuration from a TOML file and defines constants for the
//! Consul operator API, the license source, and logging defaults. `AppConfig`
//! is the root configuration struct; every section has compiled defaults so the
//! handler runs without any file at all.

use const_format::formatcp;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

// =============================================================================
// Consul Operator API
// =============================================================================

/// Default HTTP port of a Consul agent
pub const CONSUL_DEFAULT_PORT: u16 = 8500;

/// Consul HTTP API version prefix
pub const CONSUL_API_VERSION: &str = "v1";

/// Path of the operator license endpoint
pub const CONSUL_LICENSE_PATH: &str = formatcp!("/{}/operator/license", CONSUL_API_VERSION);

/// Header carrying the ACL token (`X-Consul-Token`), lowercase for `HeaderName::from_static`
pub const CONSUL_TOKEN_HEADER: &str = "x-consul-token";

// =============================================================================
// License Source
// =============================================================================

/// Environment variable holding the license payload
pub const DEFAULT_LICENSE_ENV_VAR: &str = "LICENSE";

// =============================================================================
// Invocation Endpoint
// =============================================================================

/// Default bind address for `serve`
pub const DEFAULT_HTTP_HOST: &str = "127.0.0.1";

/// Default bind port for `serve`
pub const DEFAULT_HTTP_PORT: u16 = 8080;

// =============================================================================
// Logging
// =============================================================================

/// Default log filter when RUST_LOG is not set
pub const DEFAULT_LOG_FILTER: &str = "consul_license=info";

/// Default log format (text or json)
pub const DEFAULT_LOG_FORMAT: &str = "text";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Consul endpoint settings
    #[serde(default)]
    pub consul: ConsulConfig,
    /// Where the license payload comes from
    #[serde(default)]
    pub license: LicenseConfig,
    /// Invocation endpoint for `serve`
    #[serde(default)]
    pub http: HttpServerConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Consul operator API settings
#[derive(Debug, Clone, Deserialize)]
pub struct ConsulConfig {
    /// Port appended to the invocation's `consul_server`
    #[serde(default = "ConsulConfig::default_port")]
    pub port: u16,
    /// Path of the license endpoint
    #[serde(default = "ConsulConfig::default_path")]
    pub path: String,
    /// Request timeout; unset leaves the HTTP client default in place
    pub timeout_seconds: Option<u64>,
}

impl Default for ConsulConfig {
    fn default() -> Self {
        Self {
            port: Self::default_port(),
            path: Self::default_path(),
            timeout_seconds: None,
        }
    }
}

impl ConsulConfig {
    fn default_port() -> u16 {
        CONSUL_DEFAULT_PORT
    }

    fn default_path() -> String {
        CONSUL_LICENSE_PATH.to_string()
    }

    /// Get the configured request timeout, if any
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

/// License source settings
#[derive(Debug, Clone, Deserialize)]
pub struct LicenseConfig {
    /// Environment variable read on every invocation
    #[serde(default = "LicenseConfig::default_env_var")]
    pub env_var: String,
    /// Reject an empty license instead of sending an empty body
    #[serde(default)]
    pub required: bool,
}

impl Default for LicenseConfig {
    fn default() -> Self {
        Self {
            env_var: Self::default_env_var(),
            required: false,
        }
    }
}

impl LicenseConfig {
    fn default_env_var() -> String {
        DEFAULT_LICENSE_ENV_VAR.to_string()
    }
}

/// HTTP invocation endpoint configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    #[serde(default = "HttpServerConfig::default_host")]
    pub host: String,
    #[serde(default = "HttpServerConfig::default_port")]
    pub port: u16,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
        }
    }
}

impl HttpServerConfig {
    fn default_host() -> String {
        DEFAULT_HTTP_HOST.to_string()
    }

    fn default_port() -> u16 {
        DEFAULT_HTTP_PORT
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log format: "text" (human-readable, default) or "json" (structured)
    #[serde(default = "LoggingConfig::default_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: DEFAULT_LOG_FORMAT.to_string(),
        }
    }
}

impl LoggingConfig {
    fn default_format() -> String {
        DEFAULT_LOG_FORMAT.to_string()
    }

    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl AppConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when given, otherwise fall back to compiled defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.consul.path.starts_with('/') {
            return Err(ConfigError::Validation(format!(
                "consul.path must start with '/', got '{}'",
                self.consul.path
            )));
        }
        if self.license.env_var.is_empty() {
            return Err(ConfigError::Validation(
                "license.env_var must not be empty".to_string(),
            ));
        }
        match self.logging.format.to_ascii_lowercase().as_str() {
            "text" | "json" => Ok(()),
            other => Err(ConfigError::Validation(format!(
                "logging.format must be \"text\" or \"json\", got '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Configuration error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_license_path_constant() {
        assert_eq!(CONSUL_LICENSE_PATH, "/v1/operator/license");
    }

    #[test]
    fn test_defaults_without_file() {
        let config = AppConfig::load_or_default(None::<&str>).unwrap();
        assert_eq!(config.consul.port, 8500);
        assert_eq!(config.consul.path, "/v1/operator/license");
        assert!(config.consul.timeout().is_none());
        assert_eq!(config.license.env_var, "LICENSE");
        assert!(!config.license.required);
        assert_eq!(config.http.port, DEFAULT_HTTP_PORT);
        assert!(!config.logging.is_json());
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let file = write_config("");
        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.consul.port, CONSUL_DEFAULT_PORT);
        assert_eq!(config.license.env_var, DEFAULT_LICENSE_ENV_VAR);
    }

    #[test]
    fn test_partial_sections() {
        let file = write_config(
            r#"
[consul]
port = 18500
timeout_seconds = 5

[license]
required = true

[logging]
format = "JSON"
"#,
        );
        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.consul.port, 18500);
        assert_eq!(config.consul.path, CONSUL_LICENSE_PATH);
        assert_eq!(config.consul.timeout(), Some(Duration::from_secs(5)));
        assert!(config.license.required);
        assert_eq!(config.license.env_var, "LICENSE");
        assert!(config.logging.is_json());
    }

    #[test]
    fn test_missing_file_is_error() {
        let result = AppConfig::load("/nonexistent/consul-license.toml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_malformed_file_is_error() {
        let file = write_config("[consul\nport = ");
        assert!(matches!(
            AppConfig::load(file.path()),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_relative_path_rejected() {
        let file = write_config("[consul]\npath = \"v1/operator/license\"\n");
        assert!(matches!(
            AppConfig::load(file.path()),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_unknown_log_format_rejected() {
        let file = write_config("[logging]\nformat = \"yaml\"\n");
        assert!(matches!(
            AppConfig::load(file.path()),
            Err(ConfigError::Validation(_))
        ));
    }
}
