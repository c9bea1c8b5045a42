//! Request types for the secrets API

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to store a secret inside an existing container
#[derive(Clone, Serialize, Deserialize, Validate)]
pub struct UploadSecretRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Container name cannot be empty"))]
    pub container: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Secret name cannot be empty"))]
    pub name: String,

    /// Secret value, stored as its UTF-8 bytes
    #[serde(default)]
    pub payload: String,
}

impl std::fmt::Debug for UploadSecretRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadSecretRequest")
            .field("container", &self.container)
            .field("name", &self.name)
            .field("payload", &"[REDACTED]")
            .finish()
    }
}

/// Path parameters addressing one secret
#[derive(Debug, Clone, Deserialize)]
pub struct SecretPath {
    pub container: String,
    pub name: String,
}
