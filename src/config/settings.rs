//! # Configuration Settings
//!
//! Defines the configuration structure for the Barbican cache service.

use crate::errors::{Error, Result};
use crate::resolver::DEFAULT_CONTAINER_CAPACITY;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct AppConfig {
    /// HTTP API configuration
    #[validate(nested)]
    pub server: ApiServerConfig,

    /// Secret store configuration
    #[validate(nested)]
    pub barbican: BarbicanConfig,

    /// Token issuance configuration
    #[validate(nested)]
    pub keystone: KeystoneConfig,

    /// Cache tier configuration
    #[validate(nested)]
    pub cache: CacheConfig,

    /// Logging configuration
    #[validate(nested)]
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(Error::from)?;
        self.validate_custom()
    }

    /// Checks spanning more than one field
    fn validate_custom(&self) -> Result<()> {
        let keystone = &self.keystone;
        if keystone.static_token.is_none() {
            if keystone.auth_url.is_none() {
                return Err(Error::config("OS_AUTH_URL or BARBICAN_CACHE_STATIC_TOKEN must be set"));
            }
            if keystone.credential_id.is_none() || keystone.credential_secret.is_none() {
                return Err(Error::config(
                    "OS_APPLICATION_CREDENTIAL_CLIENT_ID and OS_APPLICATION_CREDENTIAL_CLIENT_SECRET are required with OS_AUTH_URL",
                ));
            }
        }

        if self.cache.kv_url.trim().is_empty() {
            return Err(Error::config("KV_URL cannot be blank"));
        }

        Ok(())
    }
}

/// HTTP API server configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ApiServerConfig {
    /// Server bind address
    #[validate(length(min = 1, message = "Bind address cannot be empty"))]
    pub bind_address: String,

    /// Server port
    #[validate(range(min = 1, message = "Port must be between 1 and 65535"))]
    pub port: u16,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self { bind_address: "0.0.0.0".to_string(), port: 3000 }
    }
}

impl ApiServerConfig {
    /// Get the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

/// Barbican endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BarbicanConfig {
    /// Base URL, e.g. `https://barbican.example.com:9311`
    #[validate(url(message = "BARBICAN_URL must be a valid URL"))]
    pub url: String,

    /// Per-request timeout in seconds
    #[validate(range(
        min = 1,
        max = 300,
        message = "Request timeout must be between 1 and 300 seconds"
    ))]
    pub request_timeout_seconds: u64,
}

impl Default for BarbicanConfig {
    fn default() -> Self {
        Self { url: "http://localhost:9311".to_string(), request_timeout_seconds: 30 }
    }
}

impl BarbicanConfig {
    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

/// Keystone application credential, or a pre-issued token
#[derive(Clone, Default, Serialize, Deserialize, Validate)]
pub struct KeystoneConfig {
    #[validate(url(message = "OS_AUTH_URL must be a valid URL"))]
    pub auth_url: Option<String>,

    pub credential_id: Option<String>,

    #[serde(skip_serializing)]
    pub credential_secret: Option<String>,

    /// Used instead of Keystone when set
    #[serde(skip_serializing)]
    pub static_token: Option<String>,
}

impl std::fmt::Debug for KeystoneConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |value: &Option<String>| value.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("KeystoneConfig")
            .field("auth_url", &self.auth_url)
            .field("credential_id", &self.credential_id)
            .field("credential_secret", &redact(&self.credential_secret))
            .field("static_token", &redact(&self.static_token))
            .finish()
    }
}

/// Shared index address used when `KV_URL` is unset.
pub const DEFAULT_KV_URL: &str = "localhost:6379";

/// Cache tier configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CacheConfig {
    /// Shared cache address, as a `redis://` URL or bare `host:port`
    pub kv_url: String,

    /// Maximum entries in the local container index
    #[validate(range(min = 1, message = "Container capacity must be at least 1"))]
    pub container_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            kv_url: DEFAULT_KV_URL.to_string(),
            container_capacity: DEFAULT_CONTAINER_CAPACITY,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ObservabilityConfig {
    /// Log filter directive (trace, debug, info, warn, error, or a full filter)
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub log_level: String,

    /// Enable JSON structured logging
    pub json_logging: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self { log_level: "info".to_string(), json_logging: false }
    }
}
