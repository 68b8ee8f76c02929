//! Cart client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `ROCKETSHOES_API_URL` - Catalog/stock API base URL (default: `http://localhost:3333/`)
//! - `ROCKETSHOES_API_TOKEN` - Bearer token sent to the API
//! - `ROCKETSHOES_STORAGE_PATH` - Local storage file (default: `.rocketshoes/storage.json`)
//! - `ROCKETSHOES_STORAGE_KEY` - Key the cart is stored under (default: `@RocketShoes:cart`)
//! - `ROCKETSHOES_CATALOG_CACHE_TTL_SECS` - Product cache TTL, 0 disables (default: 300)
//! - `ROCKETSHOES_REQUEST_TIMEOUT_SECS` - HTTP request timeout (default: none)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Default storage key, namespaced to the storefront.
pub const DEFAULT_STORAGE_KEY: &str = "@RocketShoes:cart";

const DEFAULT_API_URL: &str = "http://localhost:3333/";
const DEFAULT_STORAGE_PATH: &str = ".rocketshoes/storage.json";
const DEFAULT_CATALOG_CACHE_TTL_SECS: &str = "300";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart client configuration.
///
/// Implements `Debug` manually to redact the API token.
#[derive(Clone)]
pub struct CartConfig {
    /// Catalog/stock API base URL, always ending in `/`
    pub api_url: Url,
    /// Optional bearer token for the API
    pub api_token: Option<SecretString>,
    /// File backing the local key-value storage
    pub storage_path: PathBuf,
    /// Key the cart is stored under
    pub storage_key: String,
    /// Product cache TTL, `None` disables caching
    pub catalog_cache_ttl: Option<Duration>,
    /// HTTP request timeout, `None` waits for the transport
    pub request_timeout: Option<Duration>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl std::fmt::Debug for CartConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartConfig")
            .field("api_url", &self.api_url.as_str())
            .field(
                "api_token",
                &self.api_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("storage_path", &self.storage_path)
            .field("storage_key", &self.storage_key)
            .field("catalog_cache_ttl", &self.catalog_cache_ttl)
            .field("request_timeout", &self.request_timeout)
            .field("sentry_dsn", &self.sentry_dsn)
            .finish()
    }
}

impl CartConfig {
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
        let api_url = parse_base_url(
            "ROCKETSHOES_API_URL",
            &lookup("ROCKETSHOES_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        )?;

        let storage_key = lookup("ROCKETSHOES_STORAGE_KEY")
            .unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_string());
        if storage_key.trim().is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "ROCKETSHOES_STORAGE_KEY".to_string(),
                "must not be empty".to_string(),
            ));
        }

        let cache_ttl_secs = parse_secs(
            "ROCKETSHOES_CATALOG_CACHE_TTL_SECS",
            &lookup("ROCKETSHOES_CATALOG_CACHE_TTL_SECS")
                .unwrap_or_else(|| DEFAULT_CATALOG_CACHE_TTL_SECS.to_string()),
        )?;
        let request_timeout = lookup("ROCKETSHOES_REQUEST_TIMEOUT_SECS")
            .map(|value| parse_secs("ROCKETSHOES_REQUEST_TIMEOUT_SECS", &value))
            .transpose()?
            .map(Duration::from_secs);

        Ok(Self {
            api_url,
            api_token: lookup("ROCKETSHOES_API_TOKEN")
                .filter(|token| !token.is_empty())
                .map(SecretString::from),
            storage_path: lookup("ROCKETSHOES_STORAGE_PATH")
                .map_or_else(|| PathBuf::from(DEFAULT_STORAGE_PATH), PathBuf::from),
            storage_key,
            catalog_cache_ttl: (cache_ttl_secs > 0).then(|| Duration::from_secs(cache_ttl_secs)),
            request_timeout,
            sentry_dsn: lookup("SENTRY_DSN").filter(|dsn| !dsn.is_empty()),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a base URL, appending a trailing slash so relative joins keep the path.
fn parse_base_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let mut url =
        Url::parse(value).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be an absolute http(s) URL".to_string(),
        ));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

/// Parse a whole number of seconds.
fn parse_secs(key: &str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}
