//! # Barbican Cache
//!
//! A name-resolving cache in front of an OpenStack Barbican secret store.
//!
//! Barbican only understands opaque container and secret references. This service
//! lets callers address secrets as `(container name, secret name)` by keeping the
//! name → identifier mapping in two tiers:
//!
//! ```text
//! HTTP API → SecretResolver → local LRU (containers)
//!                           → Redis hash index (secrets)
//!                           → Barbican REST (payloads, mutations)
//! ```
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use barbican_cache::{api::start_api_server, config::AppConfig, startup::build_resolver, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = AppConfig::from_env()?;
//!     let resolver = build_resolver(&config).await?;
//!     resolver.load_all().await?;
//!     start_api_server(config.server.clone(), resolver).await
//! }
//! ```

pub mod api;
pub mod config;
pub mod errors;
pub mod observability;
pub mod resolver;
pub mod startup;

// Re-export commonly used types and traits
pub use config::AppConfig;
pub use errors::{Error, Result};
pub use resolver::{ResolveError, SecretResolver};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
