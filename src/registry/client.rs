// RegistryClient: one connection to a registry described by a `Registry`
// descriptor, composing the catalog/tag, manifest and blob operation groups
// over a shared transport.

use crate::config::{ClientConfig, Registry};
use crate::error::Result;
use crate::logging::Logger;
use crate::registry::manifest::Manifest;
use crate::registry::operations::{
    BlobOperations, Catalog, ManifestOperations, RepositoryOperations, TagList,
};
use crate::registry::transport::{HttpTransport, RegistryTransport};
use std::sync::Arc;

pub struct RegistryClientBuilder {
    registry: Registry,
    config: ClientConfig,
    output: Logger,
}

impl RegistryClientBuilder {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            config: ClientConfig::default(),
            output: Logger::new_quiet(),
        }
    }

    pub fn with_config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_logger(mut self, output: Logger) -> Self {
        self.output = output;
        self
    }

    pub fn build(self) -> Result<RegistryClient> {
        self.config.validate()?;
        let transport = HttpTransport::new(self.registry, &self.config, self.output.clone())?;
        Ok(RegistryClient::with_transport(transport, self.output))
    }
}

pub struct RegistryClient<T = HttpTransport> {
    transport: Arc<T>,
    repositories: RepositoryOperations<T>,
    manifests: ManifestOperations<T>,
    blobs: BlobOperations<T>,
    output: Logger,
}

impl<T> Clone for RegistryClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            repositories: self.repositories.clone(),
            manifests: self.manifests.clone(),
            blobs: self.blobs.clone(),
            output: self.output.clone(),
        }
    }
}

impl RegistryClient<HttpTransport> {
    pub fn new(registry: Registry, config: &ClientConfig, output: Logger) -> Result<Self> {
        Self::builder(registry)
            .with_config(config.clone())
            .with_logger(output)
            .build()
    }

    pub fn builder(registry: Registry) -> RegistryClientBuilder {
        RegistryClientBuilder::new(registry)
    }
}

impl<T: RegistryTransport> RegistryClient<T> {
    pub fn with_transport(transport: T, output: Logger) -> Self {
        let transport = Arc::new(transport);
        let blobs = BlobOperations::new(Arc::clone(&transport), output.clone());
        let manifests =
            ManifestOperations::new(Arc::clone(&transport), blobs.clone(), output.clone());
        let repositories = RepositoryOperations::new(Arc::clone(&transport), output.clone());

        Self {
            transport,
            repositories,
            manifests,
            blobs,
            output,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn logger(&self) -> &Logger {
        &self.output
    }

    pub async fn get_catalog(&self) -> Result<Catalog> {
        self.repositories.get_catalog().await
    }

    pub async fn get_tags(&self, repository: &str) -> Result<TagList> {
        self.repositories.get_tags(repository).await
    }

    pub async fn get_manifest(&self, repository: &str, tag: &str) -> Result<Manifest> {
        self.manifests.get_manifest(repository, tag).await
    }

    pub async fn get_blob(&self, repository: &str, digest: &str) -> Result<Vec<u8>> {
        self.blobs.get_blob(repository, digest).await
    }

    pub async fn delete_manifest(&self, repository: &str, digest: &str) -> Result<()> {
        self.manifests.delete_manifest(repository, digest).await
    }
}
