//! Configuration module for StudySync.

use serde::Deserialize;
use std::path::Path;

use crate::{Result, StudySyncError};

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origins.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![],
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/studysync.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// What to do when an upload names a file that already exists in its category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Replace the stored bytes; last writer wins.
    #[default]
    Overwrite,
    /// Refuse the upload and keep the existing file.
    Reject,
}

/// Blob storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Root directory holding one subdirectory per category.
    #[serde(default = "default_storage_root")]
    pub root: String,
    /// Maximum upload size in megabytes.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size_mb: u64,
    /// Filename collision policy.
    #[serde(default)]
    pub on_collision: CollisionPolicy,
    /// Age in seconds after which an uncommitted blob is considered orphaned.
    #[serde(default = "default_orphan_grace")]
    pub orphan_grace_secs: u64,
}

fn default_storage_root() -> String {
    "data/files".to_string()
}

fn default_max_upload_size() -> u64 {
    10
}

fn default_orphan_grace() -> u64 {
    3600
}

impl StorageConfig {
    /// Maximum upload size in bytes.
    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_size_mb.saturating_mul(1024 * 1024)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_storage_root(),
            max_upload_size_mb: default_max_upload_size(),
            on_collision: CollisionPolicy::default(),
            orphan_grace_secs: default_orphan_grace(),
        }
    }
}

/// Session configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Secret used to sign session tokens (must be set).
    #[serde(default)]
    pub jwt_secret: String,
    /// Session lifetime in seconds.
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,
    /// Name of the session cookie.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
}

fn default_session_ttl() -> u64 {
    86400 // 1 day
}

fn default_cookie_name() -> String {
    "studysync_session".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            session_ttl_secs: default_session_ttl(),
            cookie_name: default_cookie_name(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/studysync.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Blob storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Session configuration.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(StudySyncError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| StudySyncError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `STUDYSYNC_JWT_SECRET`: Override the session signing secret
    pub fn apply_env_overrides(&mut self) {
        if let Ok(jwt_secret) = std::env::var("STUDYSYNC_JWT_SECRET") {
            if !jwt_secret.is_empty() {
                self.auth.jwt_secret = jwt_secret;
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.is_empty() {
            return Err(StudySyncError::Config(
                "jwt_secret is not set. \
                 Set it in config.toml or via STUDYSYNC_JWT_SECRET environment variable."
                    .to_string(),
            ));
        }
        if self.storage.max_upload_size_mb == 0 {
            return Err(StudySyncError::Config(
                "storage.max_upload_size_mb must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
