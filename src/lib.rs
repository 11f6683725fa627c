//! Reglite library
//!
//! A small Docker Registry v2 client: catalogs, tags, manifests, blobs and
//! manifest deletion, repository size estimation and concurrent health probes
//! over an inventory of named registries.

pub mod cli;
pub mod config;
pub mod error;
pub mod health;
pub mod logging;
pub mod registry;

pub use config::{ClientConfig, Inventory, Registry};
pub use error::{RegistryError, Result};
pub use health::{HealthValidator, RegistryStatus, Status, StatusTable};
pub use logging::Logger;
pub use registry::{Manifest, RegistryClient, RepositoryInfo};
