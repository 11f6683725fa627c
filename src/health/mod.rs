//! Registry health tracking
//!
//! [`HealthValidator`] probes every configured registry concurrently with one
//! catalog call each and records the outcome in a [`StatusTable`].

pub mod validator;

pub use validator::HealthValidator;

use crate::config::Inventory;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Checking,
    Online,
    Offline,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Checking => write!(f, "checking"),
            Status::Online => write!(f, "online"),
            Status::Offline => write!(f, "offline"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryStatus {
    pub name: String,
    pub url: String,
    pub status: Status,
    pub last_checked: DateTime<Utc>,
    #[serde(rename = "responseTime")]
    pub response_time_millis: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error_message: String,
}

impl RegistryStatus {
    /// Placeholder for a registry that has not been probed yet
    pub fn checking(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            status: Status::Checking,
            last_checked: Utc::now(),
            response_time_millis: 0,
            error_message: String::new(),
        }
    }
}

/// Status listing for every configured registry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    pub registries: Vec<RegistryStatus>,
    pub last_update: DateTime<Utc>,
}

/// Shared status table keyed by registry name.
///
/// Probes take the write lock only to store a finished result; listings take
/// the read lock. Writers are queued fairly, so a stream of readers cannot
/// starve a completing probe.
#[derive(Debug, Clone, Default)]
pub struct StatusTable {
    entries: Arc<RwLock<HashMap<String, RegistryStatus>>>,
}

impl StatusTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `status`, replacing any earlier result for the same registry
    pub async fn record(&self, status: RegistryStatus) {
        let mut entries = self.entries.write().await;
        entries.insert(status.name.clone(), status);
    }

    pub async fn get(&self, name: &str) -> Option<RegistryStatus> {
        self.entries.read().await.get(name).cloned()
    }

    /// Recorded status, or a transient `checking` placeholder
    pub async fn status_or_checking(&self, name: &str, url: &str) -> RegistryStatus {
        self.get(name)
            .await
            .unwrap_or_else(|| RegistryStatus::checking(name, url))
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// One entry per configured registry, in inventory order.
    ///
    /// `last_update` is the oldest `last_checked` among probed registries, or
    /// now when nothing has been probed.
    pub async fn snapshot(&self, inventory: &Inventory) -> StatusSnapshot {
        let mut last_update = Utc::now();
        let mut registries = Vec::with_capacity(inventory.len());

        for (name, registry) in &inventory.inventory {
            let status = self.status_or_checking(name, &registry.url).await;
            if status.status != Status::Checking && status.last_checked < last_update {
                last_update = status.last_checked;
            }
            registries.push(status);
        }

        StatusSnapshot {
            registries,
            last_update,
        }
    }
}
