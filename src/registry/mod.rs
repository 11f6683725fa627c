//! Registry module for Docker registry interactions
//!
//! This module provides the HTTP transport, manifest/catalog/tag/blob readers and the
//! repository size estimator for Docker Registry HTTP API v2 endpoints.

pub mod client;
pub mod estimator;
pub mod manifest;
pub mod operations;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{RegistryClient, RegistryClientBuilder};
pub use estimator::RepositoryInfo;
pub use manifest::Manifest;
pub use operations::{Catalog, TagList};
pub use transport::{HttpTransport, RawResponse, RegistryTransport};
