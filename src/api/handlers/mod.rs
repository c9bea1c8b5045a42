//! HTTP request handlers organized by resource type

pub mod containers;
pub mod health;
pub mod secrets;

pub use containers::create_container_handler;
pub use health::health_handler;
pub use secrets::{delete_secret_handler, get_secret_handler, upload_secret_handler};
