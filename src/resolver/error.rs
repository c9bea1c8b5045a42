//! Error types for reference resolution.

use thiserror::Error;

/// Result type for resolution operations.
pub type Result<T> = std::result::Result<T, ResolveError>;

/// Errors that can occur while resolving names against the caches and the backend.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// The backend returned a reference without a usable trailing identifier.
    #[error("Malformed reference: '{reference}'")]
    MalformedReference { reference: String },

    /// Container is not known to the local container index.
    #[error("Container not found: {container}")]
    ContainerNotFound { container: String },

    /// Secret is not known to the shared secret index.
    #[error("Secret not found: {container}/{name}")]
    SecretNotFound { container: String, name: String },

    /// Transport-level failure reaching the backend.
    #[error("Backend unavailable at {url}: {message}")]
    BackendUnavailable { url: String, message: String },

    /// The backend answered with an unexpected status code.
    #[error("Backend rejected {operation} with status {status}")]
    BackendRejected { operation: &'static str, status: u16, body: String },

    /// The backend answered successfully but the body could not be decoded.
    #[error("Invalid backend response: {message}")]
    InvalidResponse { message: String },

    /// The shared cache tier failed for a reason other than a miss.
    #[error("Cache unavailable: {message}")]
    CacheUnavailable { message: String },

    /// An authentication token could not be obtained.
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },
}

impl ResolveError {
    pub fn malformed_reference(reference: impl Into<String>) -> Self {
        Self::MalformedReference { reference: reference.into() }
    }

    pub fn container_not_found(container: impl Into<String>) -> Self {
        Self::ContainerNotFound { container: container.into() }
    }

    pub fn secret_not_found(container: impl Into<String>, name: impl Into<String>) -> Self {
        Self::SecretNotFound { container: container.into(), name: name.into() }
    }

    pub fn backend_unavailable(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BackendUnavailable { url: url.into(), message: message.into() }
    }

    pub fn backend_rejected(operation: &'static str, status: u16, body: impl Into<String>) -> Self {
        Self::BackendRejected { operation, status, body: body.into() }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse { message: message.into() }
    }

    pub fn cache_unavailable(message: impl Into<String>) -> Self {
        Self::CacheUnavailable { message: message.into() }
    }

    pub fn authentication_failed(message: impl Into<String>) -> Self {
        Self::AuthenticationFailed { message: message.into() }
    }

    /// True for both container and secret misses.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ContainerNotFound { .. } | Self::SecretNotFound { .. })
    }

    /// Status code surfaced to HTTP callers.
    ///
    /// Backend rejections pass the backend's own status through. Everything that is not
    /// a miss or a rejection is a generic server error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::ContainerNotFound { .. } | Self::SecretNotFound { .. } => 404,
            Self::BackendRejected { status, .. } => *status,
            Self::MalformedReference { .. }
            | Self::BackendUnavailable { .. }
            | Self::InvalidResponse { .. }
            | Self::CacheUnavailable { .. }
            | Self::AuthenticationFailed { .. } => 500,
        }
    }

    /// Message safe to return to callers. Never includes backend bodies or URLs.
    pub fn public_message(&self) -> String {
        match self {
            Self::ContainerNotFound { .. } => "Container not found".to_string(),
            Self::SecretNotFound { .. } => "Secret not found".to_string(),
            Self::BackendRejected { operation, .. } => format!("Error {}", operation),
            _ => "Internal server error".to_string(),
        }
    }
}

impl From<redis::RedisError> for ResolveError {
    fn from(error: redis::RedisError) -> Self {
        Self::cache_unavailable(error.to_string())
    }
}
