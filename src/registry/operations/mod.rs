//! Registry operations module
//!
//! Each operation group shares the transport and logger of its [`RegistryClient`](crate::registry::RegistryClient).

pub mod blob_operations;
pub mod manifest_operations;
pub mod repository_operations;

pub use blob_operations::BlobOperations;
pub use manifest_operations::ManifestOperations;
pub use repository_operations::{Catalog, RepositoryOperations, TagList};
