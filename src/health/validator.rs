//! Concurrent registry probing

use crate::config::{ClientConfig, Registry};
use crate::error::{RegistryError, Result};
use crate::health::{RegistryStatus, Status, StatusTable};
use crate::logging::Logger;
use crate::registry::{RegistryClient, RegistryTransport};
use chrono::Utc;
use futures::future::join_all;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

pub struct HealthValidator {
    config: ClientConfig,
    table: StatusTable,
    probe_timeout: Option<Duration>,
    output: Logger,
}

impl HealthValidator {
    pub fn new(config: ClientConfig, table: StatusTable, output: Logger) -> Self {
        let probe_timeout = config.probe_timeout_secs.map(Duration::from_secs);
        Self {
            config,
            table,
            probe_timeout,
            output,
        }
    }

    /// Record `offline` for any probe that runs longer than `timeout`
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = Some(timeout);
        self
    }

    pub fn table(&self) -> &StatusTable {
        &self.table
    }

    /// Probe every registry in parallel over HTTP and wait for all of them.
    pub async fn validate_all(&self, registries: &BTreeMap<String, Registry>) {
        self.validate_with(registries, |registry| {
            RegistryClient::new(registry.clone(), &self.config, self.output.clone())
        })
        .await
    }

    /// Probe every registry in parallel using clients from `connect`.
    ///
    /// One probe per registry, no fan-out limit. Each result is written to the
    /// table as soon as its probe finishes; the call returns after the last one.
    pub async fn validate_with<T, F>(&self, registries: &BTreeMap<String, Registry>, connect: F)
    where
        T: RegistryTransport,
        F: Fn(&Registry) -> Result<RegistryClient<T>>,
    {
        self.output
            .verbose(&format!("Validating {} registries", registries.len()));

        let probes = registries.iter().map(|(name, registry)| {
            let client = connect(registry);
            async move {
                let status = self.probe(name, registry, client).await;
                self.table.record(status).await;
            }
        });
        join_all(probes).await;
    }

    async fn probe<T: RegistryTransport>(
        &self,
        name: &str,
        registry: &Registry,
        client: Result<RegistryClient<T>>,
    ) -> RegistryStatus {
        let last_checked = Utc::now();
        let started = Instant::now();

        let outcome = match client {
            Ok(client) => self.catalog_within_deadline(&client).await,
            Err(e) => Err(e),
        };
        let response_time_millis = started.elapsed().as_millis() as i64;

        let (status, error_message) = match outcome {
            Ok(()) => {
                self.output.verbose(&format!(
                    "{} online ({}ms)",
                    name, response_time_millis
                ));
                (Status::Online, String::new())
            }
            Err(e) => {
                self.output.verbose(&format!("{} offline: {}", name, e));
                (Status::Offline, e.to_string())
            }
        };

        RegistryStatus {
            name: name.to_string(),
            url: registry.url.clone(),
            status,
            last_checked,
            response_time_millis,
            error_message,
        }
    }

    async fn catalog_within_deadline<T: RegistryTransport>(
        &self,
        client: &RegistryClient<T>,
    ) -> Result<()> {
        match self.probe_timeout {
            Some(limit) => match tokio::time::timeout(limit, client.get_catalog()).await {
                Ok(result) => result.map(|_| ()),
                Err(_) => Err(RegistryError::Transport(format!(
                    "probe timed out after {}",
                    self.output.format_duration(limit)
                ))),
            },
            None => client.get_catalog().await.map(|_| ()),
        }
    }
}
