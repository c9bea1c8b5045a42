//! # Observability
//!
//! Structured logging for the cache service. HTTP request spans come from
//! `tower-http`'s `TraceLayer` in [`crate::api::routes`]; backend calls are wrapped in
//! [`backend_span!`](crate::backend_span) spans.

pub mod logging;

pub use logging::{env_filter, init_logging, log_config_info};
