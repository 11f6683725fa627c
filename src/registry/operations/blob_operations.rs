//! Blob operations for registry client
//!
//! Implements blob download (GET /v2/{name}/blobs/{digest}).

use crate::error::Result;
use crate::error::handlers::HttpErrorHandler;
use crate::logging::Logger;
use crate::registry::transport::RegistryTransport;
use reqwest::Method;
use std::sync::Arc;

pub struct BlobOperations<T> {
    transport: Arc<T>,
    output: Logger,
}

impl<T> Clone for BlobOperations<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            output: self.output.clone(),
        }
    }
}

impl<T: RegistryTransport> BlobOperations<T> {
    pub fn new(transport: Arc<T>, output: Logger) -> Self {
        Self { transport, output }
    }

    /// Download a blob and return its raw bytes
    pub async fn get_blob(&self, repository: &str, digest: &str) -> Result<Vec<u8>> {
        self.output
            .detail(&format!("Fetching blob {} from {}", digest, repository));

        let path = format!("/v2/{}/blobs/{}", repository, digest);
        let response = self.transport.request(Method::GET, &path).await?;
        if response.status != 200 {
            return Err(HttpErrorHandler::handle_registry_error(
                response.status,
                &format!("blob {} in {}", digest, repository),
            ));
        }

        self.output.detail(&format!(
            "Blob {} is {}",
            digest,
            self.output.format_size(response.body.len() as i64)
        ));
        Ok(response.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::testing::ScriptedTransport;

    #[tokio::test]
    async fn returns_raw_body() {
        let transport = ScriptedTransport::new().json(
            "GET",
            "/v2/app/blobs/sha256:cfg",
            200,
            r#"{"architecture":"arm64"}"#,
        );
        let blobs = BlobOperations::new(Arc::new(transport), Logger::new_quiet());
        let body = blobs.get_blob("app", "sha256:cfg").await.unwrap();
        assert_eq!(body, br#"{"architecture":"arm64"}"#.to_vec());
    }

    #[tokio::test]
    async fn missing_blob_is_status_error() {
        let blobs = BlobOperations::new(Arc::new(ScriptedTransport::new()), Logger::new_quiet());
        let err = blobs.get_blob("app", "sha256:none").await.unwrap_err();
        assert_eq!(err.status_code(), Some(404));
    }
}
