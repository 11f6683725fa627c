//! Manifest operations for registry client
//!
//! Implements Docker Registry v2 manifest operations:
//! - Manifest download (GET /v2/{name}/manifests/{reference}) with digest
//!   resolution, size computation and config-blob enrichment
//! - Manifest deletion (DELETE /v2/{name}/manifests/{digest})

use crate::error::handlers::HttpErrorHandler;
use crate::error::{RegistryError, Result};
use crate::logging::Logger;
use crate::registry::manifest::{ImageConfigBlob, Manifest, ManifestDocument, resolve_digest};
use crate::registry::operations::BlobOperations;
use crate::registry::transport::RegistryTransport;
use reqwest::Method;
use std::sync::Arc;

pub struct ManifestOperations<T> {
    transport: Arc<T>,
    blobs: BlobOperations<T>,
    output: Logger,
}

impl<T> Clone for ManifestOperations<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            blobs: self.blobs.clone(),
            output: self.output.clone(),
        }
    }
}

impl<T: RegistryTransport> ManifestOperations<T> {
    pub fn new(transport: Arc<T>, blobs: BlobOperations<T>, output: Logger) -> Self {
        Self {
            transport,
            blobs,
            output,
        }
    }

    /// Download the schema 2 manifest for `tag`.
    ///
    /// The config blob is fetched best-effort: when it loads, its `created` and
    /// `architecture` replace the values read from the manifest itself.
    pub async fn get_manifest(&self, repository: &str, tag: &str) -> Result<Manifest> {
        self.output
            .verbose(&format!("Pulling manifest for {}:{}", repository, tag));

        let path = format!("/v2/{}/manifests/{}", repository, tag);
        let response = self.transport.request(Method::GET, &path).await?;
        if response.status != 200 {
            return Err(HttpErrorHandler::handle_registry_error(
                response.status,
                &format!("manifest {}:{}", repository, tag),
            ));
        }

        let digest = resolve_digest(&response);
        let document: ManifestDocument = serde_json::from_slice(&response.body).map_err(|e| {
            RegistryError::Decode(format!("manifest {}:{}: {}", repository, tag, e))
        })?;

        let mut manifest = Manifest {
            media_type: document.media_type.clone().unwrap_or_default(),
            schema_version: document.schema_version.unwrap_or_default(),
            tag: tag.to_string(),
            architecture: document.architecture.clone().unwrap_or_default(),
            digest,
            size: document.computed_size(response.body.len()),
            created: document.created(),
        };

        if let Some(config_digest) = document.config_digest() {
            self.apply_config_blob(repository, config_digest, &mut manifest)
                .await;
        }

        self.output.detail(&format!(
            "{}:{} digest={} size={}",
            repository,
            tag,
            if manifest.digest.is_empty() { "-" } else { manifest.digest.as_str() },
            manifest.size
        ));
        Ok(manifest)
    }

    async fn apply_config_blob(&self, repository: &str, digest: &str, manifest: &mut Manifest) {
        let raw = match self.blobs.get_blob(repository, digest).await {
            Ok(raw) => raw,
            Err(e) => {
                self.output
                    .verbose(&format!("Skipping config enrichment for {}: {}", manifest.tag, e));
                return;
            }
        };

        let config: ImageConfigBlob = match serde_json::from_slice(&raw) {
            Ok(config) => config,
            Err(e) => {
                self.output
                    .verbose(&format!("Config blob {} is not an image config: {}", digest, e));
                return;
            }
        };

        if let Some(created) = config.created.filter(|c| !c.is_empty()) {
            manifest.created = Some(created);
        }
        if let Some(architecture) = config.architecture.filter(|a| !a.is_empty()) {
            manifest.architecture = architecture;
        }
    }

    /// Delete a manifest by digest; only `202 Accepted` counts as success
    pub async fn delete_manifest(&self, repository: &str, digest: &str) -> Result<()> {
        self.output
            .verbose(&format!("Deleting manifest {} from {}", digest, repository));

        let path = format!("/v2/{}/manifests/{}", repository, digest);
        let response = self.transport.request(Method::DELETE, &path).await?;
        if response.status != 202 {
            self.output.verbose(&format!(
                "Delete rejected: {}",
                HttpErrorHandler::describe_status(response.status)
            ));
            return Err(HttpErrorHandler::handle_registry_error(
                response.status,
                &format!("delete manifest {} in {}", digest, repository),
            ));
        }

        self.output
            .success(&format!("Deleted manifest {} from {}", digest, repository));
        Ok(())
    }
}
