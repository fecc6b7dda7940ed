//! Server configuration from environment variables.
//!
//! # Variables
//! - `ROSTER_HOST`: bind address (default `0.0.0.0`).
//! - `ROSTER_PORT`: bind port (default `3000`).
//! - `ROSTER_DB_PATH`: SQLite file (default `roster.sqlite3` in the temp dir).
//! - `ROSTER_LOG_LEVEL`: `trace|debug|info|warn|error`.
//! - `ROSTER_LOG_DIR`: rolling log directory; stderr when unset.

use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DB_FILE_NAME: &str = "roster.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("ROSTER_PORT must be a port number between 1 and 65535, got `{0}`")]
    InvalidPort(String),
    #[error("ROSTER_LOG_LEVEL must be one of trace|debug|info|warn|error, got `{0}`")]
    InvalidLogLevel(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
}

impl ServerConfig {
    /// Reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup.
    ///
    /// Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let port = match read("ROSTER_PORT") {
            Some(raw) => match raw.parse::<u16>() {
                Ok(port) if port > 0 => port,
                _ => return Err(ConfigError::InvalidPort(raw)),
            },
            None => DEFAULT_PORT,
        };

        let log_level = match read("ROSTER_LOG_LEVEL") {
            Some(raw) => match roster_core::normalize_level(&raw) {
                Ok(level) => level.to_string(),
                Err(_) => return Err(ConfigError::InvalidLogLevel(raw)),
            },
            None => roster_core::default_log_level().to_string(),
        };

        Ok(Self {
            host: read("ROSTER_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            db_path: read("ROSTER_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)),
            log_level,
            log_dir: read("ROSTER_LOG_DIR").map(PathBuf::from),
        })
    }
}
