//! Backend reference parsing and strongly-typed identifiers.
//!
//! Barbican hands out references such as
//! `https://barbican.example.com/v1/containers/0d3f...`. Every later call only needs
//! the trailing identifier segment, so references are reduced to a [`ContainerId`] or
//! [`SecretId`] as soon as they arrive.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::{ResolveError, Result};

/// Extract the canonical identifier from a backend reference.
///
/// The identifier is the substring after the last `/`. An empty reference or an empty
/// final segment (trailing slash) is rejected.
pub fn extract_identifier(reference: &str) -> Result<&str> {
    let identifier = reference.rsplit('/').next().unwrap_or_default();
    if identifier.is_empty() {
        return Err(ResolveError::malformed_reference(reference));
    }
    Ok(identifier)
}

/// Identifier of a container in the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContainerId(String);

impl ContainerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Build an identifier from a full container reference.
    pub fn from_reference(reference: &str) -> Result<Self> {
        extract_identifier(reference).map(Self::new)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a secret in the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretId(String);

impl SecretId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Build an identifier from a full secret reference.
    pub fn from_reference(reference: &str) -> Result<Self> {
        extract_identifier(reference).map(Self::new)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SecretId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Cache key shared by both index tiers for a container name.
pub fn container_key(container: &str) -> String {
    format!("container:{}", container)
}
