//! # Structured Logging
//!
//! Subscriber setup and span macros on top of the tracing ecosystem.
//!
//! Log output is filtered by `RUST_LOG` when set, and by the configured level
//! otherwise. JSON output is selected with `BARBICAN_CACHE_JSON_LOGS=true`.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{AppConfig, ObservabilityConfig};
use crate::errors::{Error, Result};

/// Create a tracing span for a Barbican request.
///
/// ```rust,ignore
/// let span = backend_span!("GET", "https://barbican/v1/containers");
/// let span = backend_span!("DELETE", url, secret_id = %id);
/// ```
#[macro_export]
macro_rules! backend_span {
    ($method:expr, $url:expr) => {
        tracing::debug_span!(
            "backend_request",
            method = %$method,
            url = %$url,
            request_id = %uuid::Uuid::new_v4()
        )
    };
    ($method:expr, $url:expr, $($field:tt)*) => {
        tracing::debug_span!(
            "backend_request",
            method = %$method,
            url = %$url,
            request_id = %uuid::Uuid::new_v4(),
            $($field)*
        )
    };
}

/// Build the log filter, preferring `RUST_LOG` over the configured level.
pub fn env_filter(config: &ObservabilityConfig) -> Result<EnvFilter> {
    match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::try_new(directives)
            .map_err(|e| Error::config(format!("Invalid RUST_LOG filter: {}", e))),
        _ => EnvFilter::try_new(&config.log_level)
            .map_err(|e| Error::config(format!("Invalid log level '{}': {}", config.log_level, e))),
    }
}

/// Install the global subscriber.
///
/// Returns `Ok(false)` when a subscriber was already installed, which happens in
/// tests and when the binary initializes twice.
pub fn init_logging(config: &ObservabilityConfig) -> Result<bool> {
    let filter = env_filter(config)?;

    let installed = if config.json_logging {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_current_span(true).with_target(true))
            .try_init()
    } else {
        tracing_subscriber::registry().with(filter).with(fmt::layer().with_target(true)).try_init()
    };

    Ok(installed.is_ok())
}

/// Log configuration at startup. Credentials are never included.
pub fn log_config_info(config: &AppConfig) {
    tracing::info!(
        server_address = %config.server.bind_address(),
        barbican_url = %config.barbican.url,
        keystone = config.keystone.auth_url.is_some(),
        static_token = config.keystone.static_token.is_some(),
        container_capacity = config.cache.container_capacity,
        json_logging = config.observability.json_logging,
        "Barbican cache configuration"
    );
}
