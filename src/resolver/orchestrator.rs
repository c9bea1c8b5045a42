//! Resolution orchestrator.
//!
//! [`SecretResolver`] is the façade request handlers talk to. It resolves container
//! names through the local [`ContainerIndex`], secret names through the shared
//! [`SecretIndex`], and goes to the [`BackendGateway`] only for payloads and mutations.
//!
//! Both indexes are treated as complete: a miss in either one is reported as "not
//! found" and never triggers a backend lookup.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{error, info, instrument, warn};

use super::container_index::ContainerIndex;
use super::error::{ResolveError, Result};
use super::gateway::{BackendGateway, ContainerRecord};
use super::reference::{container_key, ContainerId, SecretId};
use super::secret_index::SecretIndex;

/// A single record skipped during a bulk load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    /// Container reference had no usable identifier; the container and its secrets were skipped.
    MalformedContainer { container: String, reference: String },
    /// Secret reference had no usable identifier.
    MalformedSecret { container: String, secret: String, reference: String },
    /// Secret listed without a name, so it cannot be resolved by name.
    UnnamedSecret { container: String, reference: String },
    /// Writing the secret to the shared index failed.
    CacheWrite { container: String, secret: String, message: String },
}

/// Outcome of [`SecretResolver::load_all`].
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub containers_loaded: usize,
    pub secrets_loaded: usize,
    pub warnings: Vec<LoadWarning>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Name → identifier resolution over the two cache tiers and the backend.
///
/// Cloning is cheap; every clone shares the same indexes and gateway.
#[derive(Debug, Clone)]
pub struct SecretResolver {
    containers: Arc<ContainerIndex>,
    secrets: Arc<dyn SecretIndex>,
    gateway: Arc<dyn BackendGateway>,
}

impl SecretResolver {
    pub fn new(
        containers: Arc<ContainerIndex>,
        secrets: Arc<dyn SecretIndex>,
        gateway: Arc<dyn BackendGateway>,
    ) -> Self {
        Self { containers, secrets, gateway }
    }

    pub fn container_index(&self) -> &ContainerIndex {
        &self.containers
    }

    /// Populate both indexes from the backend's full container listing.
    ///
    /// Only the listing call itself can fail the load. Bad references and cache write
    /// failures are skipped, logged and collected in the returned report.
    #[instrument(skip(self))]
    pub async fn load_all(&self) -> Result<LoadReport> {
        let records = self.gateway.list_containers().await.map_err(|e| {
            error!(error = %e, "Error loading containers");
            e
        })?;

        let mut report = LoadReport::default();
        for record in &records {
            let container_id = match record.identifier() {
                Ok(id) => id,
                Err(e) => {
                    warn!(container = %record.name, error = %e, "Invalid container ref");
                    report.warnings.push(LoadWarning::MalformedContainer {
                        container: record.name.clone(),
                        reference: record.container_ref.clone(),
                    });
                    continue;
                }
            };
            self.index_container(&record.name, container_id, record, &mut report).await;
            report.containers_loaded += 1;
        }

        info!(
            containers = report.containers_loaded,
            secrets = report.secrets_loaded,
            warnings = report.warnings.len(),
            "Loaded container references"
        );
        Ok(report)
    }

    /// Write one container and its secrets to the indexes under `name`.
    async fn index_container(
        &self,
        name: &str,
        container_id: ContainerId,
        record: &ContainerRecord,
        report: &mut LoadReport,
    ) {
        info!(key = %container_key(name), value = %container_id, "Caching container");
        self.containers.set(name, container_id);

        let key = container_key(name);
        for secret in &record.secret_refs {
            if secret.name.is_empty() {
                warn!(container = %name, secret_ref = %secret.secret_ref, "Secret ref without name");
                report.warnings.push(LoadWarning::UnnamedSecret {
                    container: name.to_string(),
                    reference: secret.secret_ref.clone(),
                });
                continue;
            }

            let secret_id = match SecretId::from_reference(&secret.secret_ref) {
                Ok(id) => id,
                Err(e) => {
                    warn!(container = %name, secret_name = %secret.name, error = %e, "Invalid secret ref");
                    report.warnings.push(LoadWarning::MalformedSecret {
                        container: name.to_string(),
                        secret: secret.name.clone(),
                        reference: secret.secret_ref.clone(),
                    });
                    continue;
                }
            };

            match self.secrets.hset(&key, &secret.name, &secret_id).await {
                Ok(()) => report.secrets_loaded += 1,
                Err(e) => {
                    error!(container = %name, secret_name = %secret.name, error = %e, "Error saving secret to cache");
                    report.warnings.push(LoadWarning::CacheWrite {
                        container: name.to_string(),
                        secret: secret.name.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }
    }

    /// Create a container in the backend and index it immediately.
    #[instrument(skip(self), fields(container = %name))]
    pub async fn create_container(&self, name: &str) -> Result<ContainerId> {
        let record = self.gateway.create_container(name).await.map_err(|e| {
            error!(error = %e, "Error creating container in Barbican");
            e
        })?;

        // Fail before touching the index so a bad reference leaves no trace.
        let container_id = record.identifier().map_err(|e| {
            error!(error = %e, "Failed to cache new container");
            e
        })?;

        let mut report = LoadReport::default();
        self.index_container(name, container_id.clone(), &record, &mut report).await;
        for warning in &report.warnings {
            warn!(?warning, "Skipped secret on new container");
        }

        Ok(container_id)
    }

    /// Upload a secret, attach it to a known container, and index it.
    ///
    /// The shared index is written only after both backend calls succeed. A failed
    /// index write is logged and the upload still reports success.
    #[instrument(skip(self, payload), fields(container = %container, secret_name = %name))]
    pub async fn upload_secret(
        &self,
        container: &str,
        name: &str,
        payload: &[u8],
    ) -> Result<SecretId> {
        let Some(container_id) = self.containers.get(container) else {
            warn!("Container not found in cache");
            return Err(ResolveError::container_not_found(container));
        };

        let secret_ref = self.gateway.upload_secret(name, payload).await?;
        self.gateway.attach_secret(&container_id, &secret_ref, name).await?;

        let secret_id = SecretId::from_reference(&secret_ref).map_err(|e| {
            warn!(error = %e, "Invalid secret ref returned");
            e
        })?;

        if let Err(e) = self.secrets.hset(&container_key(container), name, &secret_id).await {
            error!(
                secret_id = %secret_id,
                error = %e,
                "Secret stored in Barbican but not saved to cache"
            );
        }

        Ok(secret_id)
    }

    /// Fetch the payload of a secret known to the shared index.
    #[instrument(skip(self), fields(container = %container, secret_name = %name))]
    pub async fn get_secret(&self, container: &str, name: &str) -> Result<Bytes> {
        let secret_id = self.lookup_secret(container, name).await?;
        self.gateway.fetch_secret_payload(&secret_id).await
    }

    /// Delete a secret from the backend and drop it from the shared index.
    ///
    /// A failed index removal after a successful backend delete is logged but does not
    /// fail the call.
    #[instrument(skip(self), fields(container = %container, secret_name = %name))]
    pub async fn delete_secret(&self, container: &str, name: &str) -> Result<()> {
        if self.containers.get(container).is_none() {
            warn!("Container not found in cache");
            return Err(ResolveError::container_not_found(container));
        }

        let secret_id = self.lookup_secret(container, name).await?;
        self.gateway.delete_secret(&secret_id).await?;

        if let Err(e) = self.secrets.hdel(&container_key(container), name).await {
            error!(
                secret_id = %secret_id,
                error = %e,
                "Secret deleted from Barbican but still present in cache"
            );
        }

        Ok(())
    }

    async fn lookup_secret(&self, container: &str, name: &str) -> Result<SecretId> {
        match self.secrets.hget(&container_key(container), name).await {
            Ok(Some(id)) => Ok(id),
            Ok(None) => {
                warn!("Secret not found in cache");
                Err(ResolveError::secret_not_found(container, name))
            }
            Err(e) => {
                error!(error = %e, "Error getting secret from cache");
                Err(e)
            }
        }
    }
}
