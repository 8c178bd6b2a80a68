//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `PETS_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`; only needed when `PETS_STORAGE=postgres`)
//!
//! ## Optional
//! - `PETS_STORAGE` - `postgres` (default) or `memory`
//! - `PETS_HOST` - Bind address (default: 127.0.0.1)
//! - `PETS_PORT` - Listen port (default: 8000)
//! - `PETS_MEDIA_URL` - Base URL photo references are resolved against
//!   (default: `http://localhost:8000/media/`)
//! - `PETS_LOG_JSON` - Emit JSON logs when set to `1`
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_MEDIA_URL: &str = "http://localhost:8000/media/";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Where pets, requests and accounts are persisted.
#[derive(Debug, Clone)]
pub enum StorageBackend {
    /// `PostgreSQL` at the given connection URL (contains password).
    Postgres(SecretString),
    /// Process-local tables, lost on restart.
    Memory,
}

/// Server application configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Record store backend
    pub storage: StorageBackend,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Base URL that relative photo references are joined onto
    pub media_base_url: Url,
    /// Emit logs as JSON lines
    pub log_json: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
    /// Fraction of error events sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions sent to Sentry
    pub sentry_traces_sample_rate: f32,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let storage = match parse_storage_kind(&get_env_or_default("PETS_STORAGE", "postgres"))? {
            StorageKind::Postgres => {
                StorageBackend::Postgres(get_database_url("PETS_DATABASE_URL")?)
            }
            StorageKind::Memory => StorageBackend::Memory,
        };
        let host = get_env_or_default("PETS_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("PETS_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("PETS_PORT", "8000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("PETS_PORT".to_string(), e.to_string()))?;
        let media_base_url = parse_media_url(&get_env_or_default("PETS_MEDIA_URL", DEFAULT_MEDIA_URL))?;
        let log_json = get_optional_env("PETS_LOG_JSON").as_deref() == Some("1");

        Ok(Self {
            storage,
            host,
            port,
            media_base_url,
            log_json,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_sample_rate(
                "SENTRY_SAMPLE_RATE",
                &get_env_or_default("SENTRY_SAMPLE_RATE", "1.0"),
            )?,
            sentry_traces_sample_rate: parse_sample_rate(
                "SENTRY_TRACES_SAMPLE_RATE",
                &get_env_or_default("SENTRY_TRACES_SAMPLE_RATE", "0.0"),
            )?,
        })
    }

    /// In-memory configuration for tests and local experiments.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            storage: StorageBackend::Memory,
            host: IpAddr::from([127, 0, 0, 1]),
            port: 8000,
            // The default is a valid absolute URL
            media_base_url: Url::parse(DEFAULT_MEDIA_URL)
                .unwrap_or_else(|_| unreachable!("default media URL is valid")),
            log_json: false,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StorageKind {
    Postgres,
    Memory,
}

fn parse_storage_kind(value: &str) -> Result<StorageKind, ConfigError> {
    match value {
        "postgres" => Ok(StorageKind::Postgres),
        "memory" => Ok(StorageKind::Memory),
        other => Err(ConfigError::InvalidEnvVar(
            "PETS_STORAGE".to_string(),
            format!("expected `postgres` or `memory`, got `{other}`"),
        )),
    }
}

/// Parse the media base URL, making sure relative references append to it.
fn parse_media_url(value: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar("PETS_MEDIA_URL".to_string(), e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            "PETS_MEDIA_URL".to_string(),
            "must be a hierarchical URL such as https://host/media/".to_string(),
        ));
    }
    // Url::join replaces the last segment unless the path ends in a slash
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn parse_sample_rate(key: &str, value: &str) -> Result<f32, ConfigError> {
    let rate = value
        .parse::<f32>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !(0.0..=1.0).contains(&rate) {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between 0.0 and 1.0 (got {rate})"),
        ));
    }
    Ok(rate)
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
