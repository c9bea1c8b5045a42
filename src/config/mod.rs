//! # Configuration Management
//!
//! Configuration is read from the environment (after an optional `.env` file is
//! loaded by the binary) and validated before any component is built.

pub mod settings;

pub use settings::{
    ApiServerConfig, AppConfig, BarbicanConfig, CacheConfig, KeystoneConfig,
    ObservabilityConfig,
};

use std::str::FromStr;

use crate::errors::{Error, Result};

/// Read an optional variable. Empty values count as unset.
fn optional_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

/// Read and parse a variable, falling back to `default` when unset.
fn parsed_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional_var(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| Error::config(format!("Invalid {}: {}", name, e))),
        None => Ok(default),
    }
}

fn flag_var(name: &str, default: bool) -> bool {
    optional_var(name).map(|s| s.to_lowercase() == "true" || s == "1").unwrap_or(default)
}

impl ApiServerConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            bind_address: optional_var("BARBICAN_CACHE_BIND_ADDRESS")
                .unwrap_or(defaults.bind_address),
            port: parsed_var("BARBICAN_CACHE_PORT", defaults.port)?,
        })
    }
}

impl BarbicanConfig {
    pub fn from_env() -> Result<Self> {
        let url = optional_var("BARBICAN_URL")
            .ok_or_else(|| Error::config("BARBICAN_URL must be set"))?;
        Ok(Self {
            url,
            request_timeout_seconds: parsed_var(
                "BARBICAN_CACHE_REQUEST_TIMEOUT_SECS",
                Self::default().request_timeout_seconds,
            )?,
        })
    }
}

impl KeystoneConfig {
    pub fn from_env() -> Self {
        Self {
            auth_url: optional_var("OS_AUTH_URL"),
            credential_id: optional_var("OS_APPLICATION_CREDENTIAL_CLIENT_ID"),
            credential_secret: optional_var("OS_APPLICATION_CREDENTIAL_CLIENT_SECRET"),
            static_token: optional_var("BARBICAN_CACHE_STATIC_TOKEN"),
        }
    }
}

impl CacheConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            kv_url: optional_var("KV_URL").unwrap_or(defaults.kv_url),
            container_capacity: parsed_var(
                "BARBICAN_CACHE_CONTAINER_CAPACITY",
                defaults.container_capacity,
            )?,
        })
    }
}

impl ObservabilityConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            log_level: optional_var("BARBICAN_CACHE_LOG_LEVEL").unwrap_or(defaults.log_level),
            json_logging: flag_var("BARBICAN_CACHE_JSON_LOGS", defaults.json_logging),
        }
    }
}

impl AppConfig {
    /// Load every section from the environment and validate the result.
    pub fn from_env() -> Result<Self> {
        let config = Self {
            server: ApiServerConfig::from_env()?,
            barbican: BarbicanConfig::from_env()?,
            keystone: KeystoneConfig::from_env(),
            cache: CacheConfig::from_env()?,
            observability: ObservabilityConfig::from_env(),
        };
        config.validate()?;
        Ok(config)
    }
}
