//! Manifest and config-blob documents
//!
//! Bodies are decoded into permissive structs: every field is optional so one
//! type covers schema 1, schema 2 and OCI manifests as well as image configs.

use crate::registry::transport::RawResponse;
use serde::{Deserialize, Serialize};

/// Manifest as returned to callers, with computed size and resolved digest
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub media_type: String,
    pub schema_version: i64,
    pub tag: String,
    pub architecture: String,
    pub digest: String,
    pub size: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestDocument {
    pub media_type: Option<String>,
    pub schema_version: Option<i64>,
    pub config: Option<Descriptor>,
    pub layers: Option<Vec<Descriptor>>,
    pub architecture: Option<String>,
    pub history: Option<Vec<HistoryEntry>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Descriptor {
    pub media_type: Option<String>,
    pub digest: Option<String>,
    pub size: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryEntry {
    pub created: Option<String>,
    #[serde(rename = "v1Compatibility")]
    pub v1_compatibility: Option<String>,
}

/// JSON document embedded as a string in schema 1 `history[].v1Compatibility`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct V1Compatibility {
    pub created: Option<String>,
}

/// Image config blob referenced by `config.digest`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageConfigBlob {
    pub created: Option<String>,
    pub architecture: Option<String>,
}

impl ManifestDocument {
    /// Config size plus every layer size; the raw body length when that sum is zero
    pub fn computed_size(&self, body_len: usize) -> i64 {
        let config = self
            .config
            .as_ref()
            .and_then(|c| c.size)
            .unwrap_or_default();
        let layers: i64 = self
            .layers
            .iter()
            .flatten()
            .filter_map(|layer| layer.size)
            .fold(0, i64::saturating_add);

        match config.saturating_add(layers) {
            0 => body_len as i64,
            total => total,
        }
    }

    /// `history[0].created`, overridden by the first `v1Compatibility` entry carrying one
    pub fn created(&self) -> Option<String> {
        let history = self.history.as_deref().unwrap_or_default();
        let mut created = history.first().and_then(|h| h.created.clone());

        let legacy = history
            .iter()
            .filter_map(|h| h.v1_compatibility.as_deref())
            .filter_map(|raw| serde_json::from_str::<V1Compatibility>(raw).ok())
            .find_map(|v1| v1.created);
        if legacy.is_some() {
            created = legacy;
        }

        created
    }

    pub fn config_digest(&self) -> Option<&str> {
        self.config
            .as_ref()
            .and_then(|c| c.digest.as_deref())
            .filter(|d| !d.is_empty())
    }
}

/// First non-empty of `Docker-Content-Digest`, `Docker-Digest`, and the unquoted `ETag`.
/// A weak `W/` prefix on the ETag is dropped.
pub fn resolve_digest(response: &RawResponse) -> String {
    ["Docker-Content-Digest", "Docker-Digest"]
        .iter()
        .filter_map(|name| response.header(name))
        .map(str::trim)
        .find(|value| !value.is_empty())
        .or_else(|| {
            response
                .header("ETag")
                .map(|etag| {
                    let etag = etag.trim();
                    etag.strip_prefix("W/").unwrap_or(etag).trim_matches('"')
                })
                .filter(|etag| !etag.is_empty())
        })
        .unwrap_or_default()
        .to_string()
}
