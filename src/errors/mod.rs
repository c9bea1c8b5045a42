//! # Error Handling
//!
//! Crate-level errors for startup and serving. Resolution failures keep their own
//! taxonomy in [`ResolveError`] and are wrapped here when they cross into startup code.

use crate::resolver::ResolveError;

/// Custom result type for service operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the Barbican cache service
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network transport errors (HTTP client construction, serving)
    #[error("Transport error: {0}")]
    Transport(String),

    /// I/O errors, such as a failed listener bind
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Secret resolution errors
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

impl Error {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create a new transport error
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport(message.into())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Config(errors.to_string())
    }
}
