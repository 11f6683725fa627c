//! Runner executing one CLI command against the configured registries

use crate::cli::args::{Args, Command};
use crate::config::{ClientConfig, Inventory, Registry};
use crate::error::{RegistryError, Result};
use crate::health::{HealthValidator, StatusTable};
use crate::logging::Logger;
use crate::registry::RegistryClient;
use serde::Serialize;
use std::path::Path;
use std::time::Instant;

pub struct Runner {
    args: Args,
    output: Logger,
    client_config: ClientConfig,
}

impl Runner {
    pub fn new(args: Args) -> Result<Self> {
        args.validate()?;

        // JSON goes to stdout, so keep informational lines out of it
        let output = if args.quiet || (args.json_output() && !args.verbose) {
            Logger::new_quiet()
        } else {
            Logger::new(args.verbose)
        };

        let client_config = ClientConfig::from_env()
            .with_timeout(args.timeout)
            .with_skip_tls(args.skip_tls)
            .with_probe_timeout(args.probe_timeout);
        client_config.validate()?;

        Ok(Self {
            args,
            output,
            client_config,
        })
    }

    pub async fn run(&self) -> Result<()> {
        let start_time = Instant::now();
        let inventory = self.load_inventory()?;

        match &self.args.command {
            Command::Registries => self.list_registries(&inventory)?,
            Command::Status => self.show_status(&inventory).await?,
            Command::Catalog { registry } => {
                let client = self.client(&inventory, registry)?;
                let catalog = client.get_catalog().await?;
                self.emit(&catalog, || {
                    self.output.list(
                        &format!("Repositories in {}", registry),
                        &catalog.repositories,
                    )
                })?;
            }
            Command::Tags {
                registry,
                repository,
            } => {
                let client = self.client(&inventory, registry)?;
                let tags = client.get_tags(repository).await?;
                self.emit(&tags, || {
                    self.output
                        .list(&format!("Tags of {}", repository), &tags.tags)
                })?;
            }
            Command::Manifest {
                registry,
                repository,
                tag,
            } => {
                let client = self.client(&inventory, registry)?;
                let manifest = client.get_manifest(repository, tag).await?;
                self.emit(&manifest, || {
                    let out = &self.output;
                    out.result(&format!("{}:{}", repository, manifest.tag));
                    out.field("digest", &manifest.digest);
                    out.field("media type", &manifest.media_type);
                    out.field("schema", &manifest.schema_version.to_string());
                    out.field("architecture", &manifest.architecture);
                    out.field(
                        "size",
                        &format!(
                            "{} ({} bytes)",
                            out.format_size(manifest.size),
                            manifest.size
                        ),
                    );
                    if let Some(created) = &manifest.created {
                        out.field("created", created);
                    }
                })?;
            }
            Command::Info {
                registry,
                repository,
            } => {
                let client = self.client(&inventory, registry)?;
                self.output
                    .step(&format!("Computing size of {}", repository));
                let info = client.repository_info(repository).await?;
                self.emit(&info, || {
                    let out = &self.output;
                    let size = out.format_size(info.total_size);
                    out.result(&info.name);
                    out.field("tags", &info.tags_count.to_string());
                    if info.is_estimate {
                        out.field(
                            "total size",
                            &format!(
                                "~{} (estimated from {} sampled tags)",
                                size, info.sample_tags_count
                            ),
                        );
                    } else {
                        out.field("total size", &size);
                    }
                    out.list(&format!("Tags of {}", info.name), &info.tags);
                })?;
            }
            Command::Delete {
                registry,
                repository,
                digest,
            } => {
                let client = self.client(&inventory, registry)?;
                client.delete_manifest(repository, digest).await?;
                if self.args.json_output() {
                    self.output.result(
                        &serde_json::json!({ "message": "Tag deleted successfully", "digest": digest })
                            .to_string(),
                    );
                }
            }
        }

        self.output.verbose(&format!(
            "Completed in {}",
            self.output.format_duration(start_time.elapsed())
        ));
        Ok(())
    }

    fn load_inventory(&self) -> Result<Inventory> {
        let path = Path::new(&self.args.config);
        let inventory = if self.args.no_docker_config {
            Inventory::load_without_docker(path)?
        } else {
            Inventory::load(path)?
        };

        self.output.verbose(&format!(
            "Loaded {} registries from {}",
            inventory.len(),
            self.args.config
        ));
        Ok(inventory)
    }

    fn client(&self, inventory: &Inventory, name: &str) -> Result<RegistryClient> {
        let registry = inventory
            .registry(name)
            .ok_or_else(|| RegistryError::Config(format!("Registry not found: {}", name)))?;

        self.output
            .verbose(&format!("Using {} → {}", name, registry.url));
        RegistryClient::new(registry.clone(), &self.client_config, self.output.clone())
    }

    fn list_registries(&self, inventory: &Inventory) -> Result<()> {
        if self.args.json_output() {
            let names = inventory.names();
            self.output.result(&serde_json::to_string_pretty(
                &serde_json::json!({ "registries": names }),
            )?);
            return Ok(());
        }

        for (name, registry) in &inventory.inventory {
            self.output.result(&format!(
                "{} → {} ({})",
                name,
                registry.url,
                auth_summary(registry)
            ));
        }
        Ok(())
    }

    async fn show_status(&self, inventory: &Inventory) -> Result<()> {
        let validator = HealthValidator::new(
            self.client_config.clone(),
            StatusTable::new(),
            self.output.clone(),
        );
        if inventory.is_empty() {
            self.output
                .step(&format!("No registries configured in {}", self.args.config));
        } else {
            self.output
                .step(&format!("Probing {} registries", inventory.len()));
        }
        validator.validate_all(&inventory.inventory).await;

        let snapshot = validator.table().snapshot(inventory).await;
        self.emit(&snapshot, || {
            for status in &snapshot.registries {
                let detail = if status.error_message.is_empty() {
                    format!("{}ms", status.response_time_millis)
                } else {
                    status.error_message.clone()
                };
                self.output
                    .row(&status.name, &status.status.to_string(), &status.url, &detail);
            }
        })
    }

    /// Print `value` as JSON, or run `text` for human-readable output
    fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce()) -> Result<()> {
        if self.args.json_output() {
            self.output.result(&serde_json::to_string_pretty(value)?);
        } else {
            text();
        }
        Ok(())
    }
}

/// Credential summary without secrets
fn auth_summary(registry: &Registry) -> String {
    match registry.credentials() {
        Ok(Some((username, _))) if !username.is_empty() => format!("auth: {}", username),
        _ => "no auth".to_string(),
    }
}
