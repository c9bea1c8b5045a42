//! # REST API
//!
//! HTTP surface of the cache service: container creation, secret upload, retrieval
//! and deletion by name.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use routes::{build_router, ApiState};
pub use server::start_api_server;
