//! HTTP transport for the Docker Registry API v2
//!
//! [`RegistryTransport`] is the seam every registry operation goes through. The
//! production implementation, [`HttpTransport`], resolves credentials from the
//! [`Registry`] descriptor on each request, attaches Basic-Auth, and asks for the
//! schema 2 manifest media type on manifest paths. Requests are never retried.

use crate::config::{ClientConfig, Registry};
use crate::error::handlers::NetworkErrorHandler;
use crate::error::{RegistryError, Result};
use crate::logging::Logger;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderMap};
use reqwest::{Client, Method};
use std::time::Duration;

pub const DOCKER_MANIFEST_V2: &str = "application/vnd.docker.distribution.manifest.v2+json";

/// Status, headers and body of a registry response
#[derive(Debug, Clone, Default)]
pub struct RawResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Header value as text, `None` when absent or not valid ASCII
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[async_trait]
pub trait RegistryTransport: Send + Sync {
    /// Issue `method` against `path` (which starts with `/v2/`)
    async fn request(&self, method: Method, path: &str) -> Result<RawResponse>;

    /// Base URL of the registry, for log lines
    fn base_url(&self) -> &str;
}

pub struct HttpTransport {
    client: Client,
    registry: Registry,
    output: Logger,
}

impl HttpTransport {
    pub fn new(registry: Registry, config: &ClientConfig, output: Logger) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(timeout));
        }
        if config.skip_tls {
            builder = builder
                .danger_accept_invalid_certs(true)
                .danger_accept_invalid_hostnames(true);
        }
        let client = builder
            .build()
            .map_err(|e| RegistryError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            registry,
            output,
        })
    }

    fn url_for(&self, path: &str) -> String {
        let base = self.registry.url.strip_suffix('/').unwrap_or(&self.registry.url);
        format!("{}{}", base, path)
    }
}

#[async_trait]
impl RegistryTransport for HttpTransport {
    async fn request(&self, method: Method, path: &str) -> Result<RawResponse> {
        let url = self.url_for(path);
        let credentials = self.registry.credentials()?;

        self.output.detail(&format!("{} {}", method, url));

        let mut request = self.client.request(method, &url);
        if let Some((username, password)) = credentials {
            request = request.basic_auth(username, Some(password));
        }
        if path.contains("/manifests/") {
            request = request.header(ACCEPT, DOCKER_MANIFEST_V2);
        }

        let response = request
            .send()
            .await
            .map_err(|e| NetworkErrorHandler::handle_network_error(&e, &url))?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| NetworkErrorHandler::handle_network_error(&e, &url))?;

        self.output.detail(&format!("{} -> {}", url, status));

        Ok(RawResponse {
            status,
            headers,
            body: body.to_vec(),
        })
    }

    fn base_url(&self) -> &str {
        &self.registry.url
    }
}
