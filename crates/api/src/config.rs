//! Catalog service configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `ROCKETSHOES_API_HOST` - Bind address (default: 127.0.0.1)
//! - `ROCKETSHOES_API_PORT` - Listen port (default: 3333)
//! - `ROCKETSHOES_API_DATA` - Catalog data file (default: `crates/api/data/db.json`)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Catalog service configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// JSON file holding products and stock
    pub data_path: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = lookup("ROCKETSHOES_API_HOST")
            .unwrap_or_else(|| "127.0.0.1".to_string())
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("ROCKETSHOES_API_HOST".to_string(), e.to_string())
            })?;
        let port = lookup("ROCKETSHOES_API_PORT")
            .unwrap_or_else(|| "3333".to_string())
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("ROCKETSHOES_API_PORT".to_string(), e.to_string())
            })?;

        Ok(Self {
            host,
            port,
            data_path: lookup("ROCKETSHOES_API_DATA")
                .map_or_else(|| PathBuf::from("crates/api/data/db.json"), PathBuf::from),
            sentry_dsn: lookup("SENTRY_DSN").filter(|dsn| !dsn.is_empty()),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
