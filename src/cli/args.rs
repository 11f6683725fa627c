//! Command-line argument parsing

use crate::error::{RegistryError, Result};
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "reglite")]
#[command(about = "Browse Docker Registry v2 endpoints: catalogs, tags, manifests, sizes and health")]
#[command(version)]
pub struct Args {
    /// Inventory file
    #[arg(
        long = "config",
        short = 'c',
        default_value = "inventory.yaml",
        global = true,
        help = "Path to the YAML registry inventory"
    )]
    pub config: String,

    /// Verbose output
    #[arg(long = "verbose", short = 'v', global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Quiet output
    #[arg(long = "quiet", short = 'q', global = true, help = "Only print results and errors")]
    pub quiet: bool,

    /// Output format for results
    #[arg(
        long = "output",
        short = 'o',
        default_value = "text",
        global = true,
        help = "Output format: text, json"
    )]
    pub output: String,

    /// Timeout in seconds for each registry request
    #[arg(long = "timeout", short = 't', global = true, help = "Per-request timeout in seconds")]
    pub timeout: Option<u64>,

    /// Skip TLS verification
    #[arg(
        long = "skip-tls",
        short = 'k',
        global = true,
        help = "Skip TLS certificate verification"
    )]
    pub skip_tls: bool,

    /// Timeout in seconds for each health probe
    #[arg(long = "probe-timeout", global = true, help = "Health probe timeout in seconds")]
    pub probe_timeout: Option<u64>,

    /// Ignore ~/.docker/config.json
    #[arg(
        long = "no-docker-config",
        global = true,
        help = "Do not merge credentials from ~/.docker/config.json"
    )]
    pub no_docker_config: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List configured registries
    Registries,
    /// Probe every registry and show its status
    Status,
    /// List repositories of a registry
    Catalog { registry: String },
    /// List tags of a repository
    Tags { registry: String, repository: String },
    /// Show the manifest of a tag
    Manifest {
        registry: String,
        repository: String,
        tag: String,
    },
    /// Show tags and total (or estimated) size of a repository
    Info { registry: String, repository: String },
    /// Delete a manifest by digest
    Delete {
        registry: String,
        repository: String,
        digest: String,
    },
}

impl Args {
    pub fn parse_args() -> Self {
        Args::parse()
    }

    pub fn json_output(&self) -> bool {
        self.output == "json"
    }

    /// Validate arguments
    pub fn validate(&self) -> Result<()> {
        match self.output.as_str() {
            "text" | "json" => {}
            _ => {
                return Err(RegistryError::Validation(
                    "Output format must be one of: text, json".to_string(),
                ));
            }
        }

        if self.timeout == Some(0) {
            return Err(RegistryError::Validation(
                "Timeout must be greater than 0".to_string(),
            ));
        }

        if self.probe_timeout == Some(0) {
            return Err(RegistryError::Validation(
                "Probe timeout must be greater than 0".to_string(),
            ));
        }

        if self.verbose && self.quiet {
            return Err(RegistryError::Validation(
                "--verbose and --quiet cannot be combined".to_string(),
            ));
        }

        if let Command::Delete { digest, .. } = &self.command {
            if !digest.contains(':') {
                return Err(RegistryError::Validation(format!(
                    "Delete needs a content digest such as sha256:..., got {}",
                    digest
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_subcommand_with_global_flags() {
        let args = Args::try_parse_from([
            "reglite", "info", "local", "team/app", "--output", "json", "-c", "regs.yaml",
        ])
        .unwrap();
        assert_eq!(
            args.command,
            Command::Info {
                registry: "local".to_string(),
                repository: "team/app".to_string()
            }
        );
        assert!(args.json_output());
        assert_eq!(args.config, "regs.yaml");
        assert!(args.validate().is_ok());
    }

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["reglite", "registries"]).unwrap();
        assert_eq!(args.config, "inventory.yaml");
        assert_eq!(args.output, "text");
        assert_eq!(args.timeout, None);
        assert!(!args.skip_tls);
    }

    #[test]
    fn rejects_bad_values() {
        let bad_output = Args::try_parse_from(["reglite", "status", "-o", "yaml"]).unwrap();
        assert!(bad_output.validate().is_err());

        let zero_timeout = Args::try_parse_from(["reglite", "status", "-t", "0"]).unwrap();
        assert!(zero_timeout.validate().is_err());

        let tag_not_digest =
            Args::try_parse_from(["reglite", "delete", "local", "app", "latest"]).unwrap();
        assert!(tag_not_digest.validate().is_err());
    }
}
