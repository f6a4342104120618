//! Configuration loading and constants.
//!
//! Two kinds of configuration live here. `DatabaseConfig` holds the database
//! credentials and is resolved from `DB_*` environment variables on every
//! request. `AppConfig` holds process settings (listen address, probe port and
//! timeout, log format) and is loaded once at startup from an optional TOML file.

use const_format::formatcp;
use serde::Deserialize;
use std::ffi::OsString;
use std::path::Path;

// =============================================================================
// HTTP Response Cache Control
// =============================================================================

/// Status page - always probed fresh, never stored by intermediaries
pub const CACHE_CONTROL_STATUS: &str = "no-store";

// =============================================================================
// Database Environment Variables and Defaults
// =============================================================================

pub const ENV_DB_HOST: &str = "DB_HOST";
pub const ENV_DB_USER: &str = "DB_USER";
pub const ENV_DB_PASSWORD: &str = "DB_PASSWORD";
pub const ENV_DB_NAME: &str = "DB_NAME";

pub const DEFAULT_DB_HOST: &str = "mariadb";
pub const DEFAULT_DB_USER: &str = "appuser";
pub const DEFAULT_DB_PASSWORD: &str = "apppassword";
pub const DEFAULT_DB_NAME: &str = "appdb";

/// Query issued against the database on each probe
pub const VERSION_QUERY: &str = "SELECT VERSION() as version";

/// Shown when the version query succeeds but yields no row
pub const UNKNOWN_VERSION: &str = "unknown version";

// =============================================================================
// Probe and Server Defaults
// =============================================================================

/// Standard MariaDB/MySQL port
pub const DEFAULT_DB_PORT: u16 = 3306;

/// Upper bound on connect + version query, in seconds
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Drain window for in-flight requests on shutdown, in seconds
pub const SHUTDOWN_GRACE_SECS: u64 = 10;

pub const DEFAULT_HTTP_HOST: &str = "0.0.0.0";
pub const DEFAULT_HTTP_PORT: u16 = 8080;

// =============================================================================
// Default Paths and Strings
// =============================================================================

/// Default log filter when RUST_LOG is not set
pub const DEFAULT_LOG_FILTER: &str = "stack_status=info,tower_http=info";

/// Default log format (text or json)
pub const DEFAULT_LOG_FORMAT: &str = "text";

/// Server software line shown on the status page
pub const SERVER_SOFTWARE: &str =
    formatcp!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

/// Database credentials for a single probe.
///
/// Built once per request and handed to the probe; never mutated afterwards.
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub host: String,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl DatabaseConfig {
    /// Resolve from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var_os(key))
    }

    /// Resolve using an arbitrary variable lookup.
    ///
    /// A default replaces a variable only when it is absent or not valid
    /// Unicode. An empty value is kept as-is, so an empty password stays empty.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let resolve = |key: &str, default: &str| match lookup(key) {
            Some(value) => value.into_string().unwrap_or_else(|_| {
                tracing::warn!(variable = key, "Ignoring non-UTF-8 environment value");
                default.to_string()
            }),
            None => default.to_string(),
        };

        Self {
            host: resolve(ENV_DB_HOST, DEFAULT_DB_HOST),
            user: resolve(ENV_DB_USER, DEFAULT_DB_USER),
            password: resolve(ENV_DB_PASSWORD, DEFAULT_DB_PASSWORD),
            database: resolve(ENV_DB_NAME, DEFAULT_DB_NAME),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_DB_HOST.to_string(),
            user: DEFAULT_DB_USER.to_string(),
            password: DEFAULT_DB_PASSWORD.to_string(),
            database: DEFAULT_DB_NAME.to_string(),
        }
    }
}

// Keep the password out of logs and panic messages.
impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub http: HttpServerConfig,
    /// Probe settings that are not credentials
    #[serde(default)]
    pub database: ProbeConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
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

/// Connection settings for the database probe
#[derive(Debug, Clone, Deserialize)]
pub struct ProbeConfig {
    /// Database server port (default: 3306)
    #[serde(default = "ProbeConfig::default_port")]
    pub port: u16,
    /// Bound on connect plus version query in seconds (default: 5)
    #[serde(default = "ProbeConfig::default_timeout")]
    pub connect_timeout_seconds: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            port: Self::default_port(),
            connect_timeout_seconds: Self::default_timeout(),
        }
    }
}

impl ProbeConfig {
    fn default_port() -> u16 {
        DEFAULT_DB_PORT
    }

    fn default_timeout() -> u64 {
        DEFAULT_CONNECT_TIMEOUT_SECS
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

    /// Whether structured JSON output was requested
    pub fn is_json(&self) -> bool {
        self.format == "json"
    }
}

impl AppConfig {
    /// Load from a TOML file. Missing keys fall back to defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate TOML text.
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database.connect_timeout_seconds == 0 {
            return Err(ConfigError::Validation(
                "database.connect_timeout_seconds must be greater than zero".to_string(),
            ));
        }

        match self.logging.format.as_str() {
            "text" | "json" => Ok(()),
            other => Err(ConfigError::Validation(format!(
                "logging.format must be \"text\" or \"json\", got \"{}\"",
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
