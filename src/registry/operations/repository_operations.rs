//! Repository operations for registry client
//!
//! Implements Docker Registry v2 listing operations:
//! - Catalog listing (GET /v2/_catalog)
//! - Tag listing (GET /v2/{name}/tags/list)

use crate::error::handlers::HttpErrorHandler;
use crate::error::{RegistryError, Result};
use crate::logging::Logger;
use crate::registry::transport::RegistryTransport;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Repository names hosted by a registry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub repositories: Vec<String>,
}

/// Tags of one repository, in registry order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagList {
    pub name: String,
    pub tags: Vec<String>,
}

#[derive(Deserialize)]
struct CatalogBody {
    repositories: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct TagListBody {
    #[serde(default)]
    name: String,
    tags: Option<Vec<String>>,
}

pub struct RepositoryOperations<T> {
    transport: Arc<T>,
    output: Logger,
}

impl<T> Clone for RepositoryOperations<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            output: self.output.clone(),
        }
    }
}

impl<T: RegistryTransport> RepositoryOperations<T> {
    pub fn new(transport: Arc<T>, output: Logger) -> Self {
        Self { transport, output }
    }

    /// List repositories using the Docker Registry v2 catalog API
    pub async fn get_catalog(&self) -> Result<Catalog> {
        self.output
            .verbose(&format!("Fetching catalog from {}", self.transport.base_url()));

        let response = self.transport.request(Method::GET, "/v2/_catalog").await?;
        if response.status != 200 {
            return Err(HttpErrorHandler::handle_registry_error(
                response.status,
                "catalog",
            ));
        }

        let body: CatalogBody = serde_json::from_slice(&response.body)
            .map_err(|e| RegistryError::Decode(format!("catalog response: {}", e)))?;
        let catalog = Catalog {
            repositories: body.repositories.unwrap_or_default(),
        };

        self.output.verbose(&format!(
            "Found {} repositories",
            catalog.repositories.len()
        ));
        Ok(catalog)
    }

    /// List all tags in repository using Docker Registry v2 API
    pub async fn get_tags(&self, repository: &str) -> Result<TagList> {
        self.output
            .verbose(&format!("Listing tags for repository: {}", repository));

        let path = format!("/v2/{}/tags/list", repository);
        let response = self.transport.request(Method::GET, &path).await?;
        if response.status != 200 {
            return Err(HttpErrorHandler::handle_registry_error(
                response.status,
                &format!("tags for {}", repository),
            ));
        }

        let body: TagListBody = serde_json::from_slice(&response.body)
            .map_err(|e| RegistryError::Decode(format!("tags response for {}: {}", repository, e)))?;
        let tags = TagList {
            name: body.name,
            tags: body.tags.unwrap_or_default(),
        };

        self.output.verbose(&format!(
            "Found {} tags for repository {}",
            tags.tags.len(),
            repository
        ));
        Ok(tags)
    }
}
