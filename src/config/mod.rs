//! Configuration management
//!
//! Settings are read from `config.yml` and may be overridden through
//! `DFA_*` environment variables. Every section is optional; missing values
//! fall back to defaults suitable for a local SQLite deployment.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub site: SiteConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// `host:port` string suitable for `TcpListener::bind`
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database driver (sqlite or mysql)
    #[serde(default)]
    pub driver: DatabaseDriver,
    /// Connection URL or, for SQLite, a file path
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            driver: DatabaseDriver::default(),
            url: default_database_url(),
        }
    }
}

fn default_database_url() -> String {
    "data/dfa.db".to_string()
}

/// Database driver type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseDriver {
    #[default]
    Sqlite,
    Mysql,
}

/// Login session settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// How long a login stays valid
    #[serde(default = "default_lifetime_days")]
    pub lifetime_days: i64,
    /// Add the `Secure` attribute to the session cookie (enable behind HTTPS)
    #[serde(default)]
    pub cookie_secure: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            lifetime_days: default_lifetime_days(),
            cookie_secure: false,
        }
    }
}

impl SessionConfig {
    /// Session lifetime as a duration; call after [`Config::validate`]
    pub fn lifetime(&self) -> Duration {
        Duration::days(self.lifetime_days)
    }

    /// `Max-Age` for the session cookie
    pub fn max_age_secs(&self) -> i64 {
        self.lifetime_days * 24 * 60 * 60
    }
}

/// Upper bound for `session.lifetime_days` (ten years)
pub const MAX_SESSION_LIFETIME_DAYS: i64 = 3650;

fn default_lifetime_days() -> i64 {
    14
}

/// Site presentation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Name shown in page titles and the header
    #[serde(default = "default_site_name")]
    pub name: String,
    /// Directory whose `.html` files override the built-in templates
    #[serde(default)]
    pub templates_path: Option<PathBuf>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: default_site_name(),
            templates_path: None,
        }
    }
}

fn default_site_name() -> String {
    "DFA".to_string()
}

/// Error type for configuration parsing
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {message}")]
    ParseError { path: String, message: String },
    #[error("Invalid value for '{field}': {message}")]
    Invalid { field: &'static str, message: String },
}

impl Config {
    /// Load configuration from a YAML file.
    ///
    /// A missing or empty file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: format_yaml_error(&e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file, then apply `DFA_*` environment overrides
    ///
    /// Recognised variables: `DFA_SERVER_HOST`, `DFA_SERVER_PORT`,
    /// `DFA_DATABASE_DRIVER`, `DFA_DATABASE_URL`, `DFA_SESSION_LIFETIME_DAYS`,
    /// `DFA_SESSION_COOKIE_SECURE`, `DFA_SITE_NAME`, `DFA_SITE_TEMPLATES_PATH`.
    /// Values that fail to parse are ignored.
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Check values serde cannot constrain
    pub fn validate(&self) -> Result<(), ConfigError> {
        let days = self.session.lifetime_days;
        if !(1..=MAX_SESSION_LIFETIME_DAYS).contains(&days) {
            return Err(ConfigError::Invalid {
                field: "session.lifetime_days",
                message: format!(
                    "must be between 1 and {}, got {}",
                    MAX_SESSION_LIFETIME_DAYS, days
                ),
            });
        }
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("DFA_SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = env_parsed::<u16>("DFA_SERVER_PORT") {
            self.server.port = port;
        }

        if let Ok(driver) = std::env::var("DFA_DATABASE_DRIVER") {
            match driver.to_lowercase().as_str() {
                "sqlite" => self.database.driver = DatabaseDriver::Sqlite,
                "mysql" => self.database.driver = DatabaseDriver::Mysql,
                other => tracing::warn!("Ignoring unknown DFA_DATABASE_DRIVER '{}'", other),
            }
        }
        if let Ok(url) = std::env::var("DFA_DATABASE_URL") {
            self.database.url = url;
        }

        if let Some(days) = env_parsed::<i64>("DFA_SESSION_LIFETIME_DAYS") {
            if days > 0 {
                self.session.lifetime_days = days;
            }
        }
        if let Some(secure) = env_parsed::<bool>("DFA_SESSION_COOKIE_SECURE") {
            self.session.cookie_secure = secure;
        }

        if let Ok(name) = std::env::var("DFA_SITE_NAME") {
            self.site.name = name;
        }
        if let Ok(path) = std::env::var("DFA_SITE_TEMPLATES_PATH") {
            self.site.templates_path = Some(PathBuf::from(path));
        }
    }
}

fn env_parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

fn format_yaml_error(e: &serde_yaml::Error) -> String {
    match e.location() {
        Some(location) => format!(
            "at line {}, column {}: {}",
            location.line(),
            location.column(),
            e
        ),
        None => e.to_string(),
    }
}
