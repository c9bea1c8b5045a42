//! # Secret Resolution
//!
//! Two-tier name resolution in front of a Barbican secret store.
//!
//! Barbican addresses containers and secrets by opaque references
//! (`https://barbican/v1/secrets/<id>`). Callers only know names. This module keeps:
//!
//! - a process-local LRU of container name → [`ContainerId`] ([`ContainerIndex`]);
//! - a shared hash index of `(container, secret name)` → [`SecretId`] ([`SecretIndex`]),
//!   backed by Redis in production ([`RedisSecretIndex`]);
//! - a [`BackendGateway`] that performs the actual REST calls ([`BarbicanClient`]).
//!
//! [`SecretResolver`] ties them together and is the only type request handlers use.
//!
//! ```rust,ignore
//! let resolver = SecretResolver::new(
//!     Arc::new(ContainerIndex::new(1000)),
//!     Arc::new(RedisSecretIndex::connect("localhost:6379").await?),
//!     Arc::new(BarbicanClient::new(http, "https://barbican:9311", tokens)),
//! );
//! resolver.load_all().await?;
//! let payload = resolver.get_secret("billing", "db-pass").await?;
//! ```

pub mod auth;
pub mod container_index;
pub mod error;
pub mod gateway;
pub mod orchestrator;
pub mod redis_index;
pub mod reference;
pub mod secret_index;

pub use auth::{KeystoneTokenProvider, StaticTokenProvider, TokenProvider};
pub use container_index::{ContainerIndex, DEFAULT_CONTAINER_CAPACITY};
pub use error::{ResolveError, Result};
pub use gateway::{BackendGateway, BarbicanClient, ContainerRecord, NamedSecretRef};
pub use orchestrator::{LoadReport, LoadWarning, SecretResolver};
pub use redis_index::RedisSecretIndex;
pub use reference::{container_key, extract_identifier, ContainerId, SecretId};
pub use secret_index::{InMemorySecretIndex, SecretIndex};
