//! Configuration: registry descriptors, the YAML inventory and client settings

use crate::error::{RegistryError, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Connection descriptor for one registry endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// base64 encoded `username:password`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<String>,
}

impl Registry {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_auth_token(mut self, auth: impl Into<String>) -> Self {
        self.auth = Some(auth.into());
        self
    }

    /// Resolve Basic-Auth credentials.
    ///
    /// Explicit username and password win over the `auth` token. No credentials
    /// at all, or a token with an empty half, is `Ok(None)`; a malformed token is
    /// an [`RegistryError::AuthDecode`].
    pub fn credentials(&self) -> Result<Option<(String, String)>> {
        let username = self.username.as_deref().unwrap_or_default();
        let password = self.password.as_deref().unwrap_or_default();
        if !username.is_empty() && !password.is_empty() {
            return Ok(Some((username.to_string(), password.to_string())));
        }

        match self.auth.as_deref() {
            Some(token) if !token.is_empty() => {
                let (username, password) = decode_auth(token)?;
                if username.is_empty() || password.is_empty() {
                    return Ok(None);
                }
                Ok(Some((username, password)))
            }
            _ => Ok(None),
        }
    }

    /// The URL must parse and use http or https
    pub fn validate_url(&self) -> Result<()> {
        let parsed = url::Url::parse(&self.url)?;
        match parsed.scheme() {
            "http" | "https" => Ok(()),
            other => Err(RegistryError::Validation(format!(
                "unsupported scheme {} in {}",
                other, self.url
            ))),
        }
    }

    pub fn has_credentials(&self) -> bool {
        self.username.as_deref().is_some_and(|u| !u.is_empty())
            || self.password.as_deref().is_some_and(|p| !p.is_empty())
            || self.auth.as_deref().is_some_and(|a| !a.is_empty())
    }
}

fn decode_auth(token: &str) -> Result<(String, String)> {
    let decoded = STANDARD
        .decode(token.trim())
        .map_err(|e| RegistryError::AuthDecode(format!("failed to decode auth: {}", e)))?;
    let decoded = String::from_utf8(decoded)
        .map_err(|e| RegistryError::AuthDecode(format!("auth is not UTF-8: {}", e)))?;

    match decoded.split_once(':') {
        Some((user, pass)) => Ok((user.to_string(), pass.to_string())),
        None => Err(RegistryError::AuthDecode(
            "invalid auth format, expected username:password".to_string(),
        )),
    }
}

/// Named registries loaded from the inventory file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Inventory {
    #[serde(default)]
    pub inventory: BTreeMap<String, Registry>,
}

/// Subset of `~/.docker/config.json`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DockerConfig {
    #[serde(default)]
    pub auths: BTreeMap<String, DockerAuth>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DockerAuth {
    #[serde(default)]
    pub auth: String,
}

impl Inventory {
    pub fn from_yaml(text: &str) -> Result<Self> {
        let inventory: Inventory = serde_yaml::from_str(text)?;
        for (name, registry) in &inventory.inventory {
            registry
                .validate_url()
                .map_err(|e| e.context(&format!("registry {}", name)))?;
        }
        Ok(inventory)
    }

    /// Read the inventory and merge credentials from the local Docker config if present
    pub fn load(path: &Path) -> Result<Self> {
        let mut inventory = Self::load_without_docker(path)?;
        if let Some(docker) = DockerConfig::load_default() {
            inventory.merge_docker_config(&docker);
        }
        Ok(inventory)
    }

    pub fn load_without_docker(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| RegistryError::Config(format!("failed to read {}: {}", path.display(), e)))?;
        Self::from_yaml(&text).map_err(|e| e.context(&format!("failed to parse {}", path.display())))
    }

    pub fn registry(&self, name: &str) -> Option<&Registry> {
        self.inventory.get(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.inventory.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inventory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inventory.is_empty()
    }

    /// Add Docker-config hosts missing from the inventory and fill `auth` for
    /// existing entries that carry no credentials at all.
    pub fn merge_docker_config(&mut self, docker: &DockerConfig) {
        for (registry_url, auth) in &docker.auths {
            let host = registry_url
                .trim_start_matches("https://")
                .trim_start_matches("http://")
                .to_string();

            match self.inventory.get_mut(&host) {
                Some(existing) => {
                    if !existing.has_credentials() {
                        existing.auth = Some(auth.auth.clone());
                    }
                }
                None => {
                    let scheme = if is_local_host(&host) { "http" } else { "https" };
                    self.inventory.insert(
                        host.clone(),
                        Registry {
                            url: format!("{}://{}", scheme, host),
                            auth: Some(auth.auth.clone()),
                            ..Default::default()
                        },
                    );
                }
            }
        }
    }
}

impl DockerConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn default_path() -> Option<PathBuf> {
        std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".docker").join("config.json"))
    }

    /// Missing or unreadable Docker configuration is not an error
    pub fn load_default() -> Option<Self> {
        let path = Self::default_path()?;
        let text = std::fs::read_to_string(path).ok()?;
        Self::from_json(&text).ok()
    }
}

fn is_local_host(host: &str) -> bool {
    host.contains("localhost") || host.contains("127.0.0.1") || is_private_ip(host)
}

fn is_private_ip(host: &str) -> bool {
    if host.starts_with("10.") || host.starts_with("192.168.") {
        return true;
    }
    (16..=31).any(|octet| host.starts_with(&format!("172.{}.", octet)))
}

/// HTTP client settings shared by every registry connection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Per-request deadline; `None` leaves requests unbounded
    pub timeout_secs: Option<u64>,
    pub skip_tls: bool,
    /// Deadline for one health probe
    pub probe_timeout_secs: Option<u64>,
}

impl ClientConfig {
    pub fn with_timeout(mut self, timeout_secs: Option<u64>) -> Self {
        if timeout_secs.is_some() {
            self.timeout_secs = timeout_secs;
        }
        self
    }

    pub fn with_skip_tls(mut self, skip_tls: bool) -> Self {
        self.skip_tls = self.skip_tls || skip_tls;
        self
    }

    pub fn with_probe_timeout(mut self, probe_timeout_secs: Option<u64>) -> Self {
        if probe_timeout_secs.is_some() {
            self.probe_timeout_secs = probe_timeout_secs;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == Some(0) {
            return Err(RegistryError::Validation(
                "timeout must be greater than 0".to_string(),
            ));
        }
        if self.probe_timeout_secs == Some(0) {
            return Err(RegistryError::Validation(
                "probe timeout must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Create config from environment variables and defaults
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("REGLITE_TIMEOUT") {
            if let Ok(timeout) = val.parse() {
                config.timeout_secs = Some(timeout);
            }
        }
        if let Ok(val) = std::env::var("REGLITE_PROBE_TIMEOUT") {
            if let Ok(timeout) = val.parse() {
                config.probe_timeout_secs = Some(timeout);
            }
        }
        if let Ok(val) = std::env::var("REGLITE_SKIP_TLS") {
            config.skip_tls = val.to_lowercase() == "true" || val == "1";
        }

        config
    }
}
