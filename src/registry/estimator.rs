//! Repository size estimation
//!
//! Small repositories are sized exactly: every tag's manifest is fetched and
//! sizes are summed once per distinct digest. Larger repositories are sized from
//! an evenly spaced sample of tags and extrapolated with a layer-sharing discount.
//! Manifests are fetched one at a time.

use crate::error::Result;
use crate::registry::client::RegistryClient;
use crate::registry::transport::RegistryTransport;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Repositories with at most this many tags are sized exactly
pub const EXACT_TAG_LIMIT: usize = 35;

/// Number of tags sampled for larger repositories
pub const SAMPLE_SIZE: usize = 10;

/// Floor of the deduplication factor
const DEDUP_FLOOR: f64 = 0.3;

/// Weight of the sampled fraction in the deduplication factor
const DEDUP_WEIGHT: f64 = 0.7;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryInfo {
    pub name: String,
    pub tags: Vec<String>,
    pub tags_count: usize,
    pub total_size: i64,
    pub is_estimate: bool,
    pub sample_tags_count: usize,
}

/// Indices `i * tag_count / sample_size` for `i` in `0..sample_size`.
/// Repeated indices are kept.
pub fn sample_indices(tag_count: usize, sample_size: usize) -> Vec<usize> {
    if sample_size == 0 {
        return Vec::new();
    }
    (0..sample_size).map(|i| i * tag_count / sample_size).collect()
}

/// Project a sample sum onto the whole repository.
///
/// `sample_sum * (tags / sample) * (0.3 + 0.7 * sample / tags)`
pub fn extrapolate(sample_sum: i64, tag_count: usize, sample_size: usize) -> i64 {
    if sample_size == 0 || tag_count == 0 {
        return 0;
    }
    let tags = tag_count as f64;
    let sample = sample_size as f64;
    let scaling_factor = tags / sample;
    let dedup_factor = DEDUP_FLOOR + DEDUP_WEIGHT * sample / tags;

    (sample_sum as f64 * scaling_factor * dedup_factor).round() as i64
}

/// Sum sizes counting each non-empty digest once, first occurrence wins.
/// Entries without a digest are always counted.
pub fn deduplicated_total<'a, I>(sizes: I) -> i64
where
    I: IntoIterator<Item = (&'a str, i64)>,
{
    let mut seen = HashSet::new();
    sizes
        .into_iter()
        .filter(|(digest, _)| digest.is_empty() || seen.insert(*digest))
        .map(|(_, size)| size)
        .fold(0, i64::saturating_add)
}

impl<T: RegistryTransport> RegistryClient<T> {
    /// Tag list plus total storage footprint of `repository`.
    ///
    /// Fails only when the tag list itself cannot be fetched; tags whose manifest
    /// cannot be read contribute nothing.
    pub async fn repository_info(&self, repository: &str) -> Result<RepositoryInfo> {
        let tag_list = self.get_tags(repository).await?;
        let tags = tag_list.tags;
        let tag_count = tags.len();

        let mut info = RepositoryInfo {
            name: repository.to_string(),
            tags_count: tag_count,
            ..Default::default()
        };

        if tag_count == 0 {
            info.tags = tags;
            return Ok(info);
        }

        if tag_count <= EXACT_TAG_LIMIT {
            info.total_size = self.deduplicated_size(repository, &tags).await;
            info.sample_tags_count = tag_count;
        } else {
            let sample_size = SAMPLE_SIZE.min(tag_count);
            let sample: Vec<String> = sample_indices(tag_count, sample_size)
                .into_iter()
                .map(|i| tags[i].clone())
                .collect();
            let sample_sum = self.deduplicated_size(repository, &sample).await;

            info.total_size = extrapolate(sample_sum, tag_count, sample_size);
            info.is_estimate = true;
            info.sample_tags_count = sample_size;

            self.logger().verbose(&format!(
                "Estimated {} from {} of {} tags (sample sum {})",
                repository, sample_size, tag_count, sample_sum
            ));
        }

        info.tags = tags;
        Ok(info)
    }

    async fn deduplicated_size(&self, repository: &str, tags: &[String]) -> i64 {
        let mut manifests = Vec::with_capacity(tags.len());
        for tag in tags {
            match self.get_manifest(repository, tag).await {
                Ok(manifest) => manifests.push((manifest.digest, manifest.size)),
                Err(e) => self
                    .logger()
                    .verbose(&format!("Skipping {}:{} in size total: {}", repository, tag, e)),
            }
        }

        deduplicated_total(
            manifests
                .iter()
                .map(|(digest, size)| (digest.as_str(), *size)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::Logger;
    use crate::registry::testing::ScriptedTransport;

    fn tags_json(count: usize) -> String {
        let tags: Vec<String> = (0..count).map(|i| format!("\"t{}\"", i)).collect();
        format!(r#"{{"name":"app","tags":[{}]}}"#, tags.join(","))
    }

    fn manifest_json(size: i64) -> String {
        format!(r#"{{"schemaVersion":2,"layers":[{{"size":{}}}]}}"#, size)
    }

    fn with_manifest(transport: ScriptedTransport, tag: &str, digest: &str, size: i64) -> ScriptedTransport {
        let path = format!("/v2/app/manifests/{}", tag);
        transport.with_headers(
            "GET",
            &path,
            200,
            &[("docker-content-digest", digest)],
            &manifest_json(size),
        )
    }

    fn client(transport: ScriptedTransport) -> RegistryClient<ScriptedTransport> {
        RegistryClient::with_transport(transport, Logger::new_quiet())
    }

    #[test]
    fn sample_indices_are_evenly_spaced() {
        assert_eq!(
            sample_indices(100, 10),
            vec![0, 10, 20, 30, 40, 50, 60, 70, 80, 90]
        );
        assert_eq!(sample_indices(36, 10), vec![0, 3, 7, 10, 14, 18, 21, 25, 28, 32]);
        assert_eq!(sample_indices(5, 10), vec![0, 0, 1, 1, 2, 2, 3, 3, 4, 4]);
        assert!(sample_indices(10, 0).is_empty());
    }

    #[test]
    fn extrapolation_matches_formula() {
        assert_eq!(extrapolate(1000, 100, 10), 3700);
        // factor floors near 0.3 for very large repositories
        assert_eq!(extrapolate(1000, 10_000, 10), 300_700);
        // whole population sampled: factor 1.0
        assert_eq!(extrapolate(1000, 10, 10), 1000);
        assert_eq!(extrapolate(1000, 0, 0), 0);
    }

    #[test]
    fn duplicates_count_once_and_empty_digests_always_count() {
        let total = deduplicated_total(vec![
            ("sha256:a", 100),
            ("sha256:a", 200),
            ("", 50),
            ("", 50),
            ("sha256:b", 7),
        ]);
        assert_eq!(total, 207);
    }

    #[test]
    fn deduplicated_total_saturates() {
        let total = deduplicated_total(vec![("sha256:a", i64::MAX), ("sha256:b", 10)]);
        assert_eq!(total, i64::MAX);
    }

    #[tokio::test]
    async fn empty_repository_is_zero_and_exact() {
        let transport =
            ScriptedTransport::new().json("GET", "/v2/app/tags/list", 200, r#"{"name":"app","tags":[]}"#);
        let info = client(transport).repository_info("app").await.unwrap();
        assert_eq!(info.total_size, 0);
        assert!(!info.is_estimate);
        assert_eq!(info.sample_tags_count, 0);
        assert_eq!(info.tags_count, 0);
    }

    #[tokio::test]
    async fn exact_path_deduplicates_and_skips_failures() {
        let mut transport = ScriptedTransport::new().json(
            "GET",
            "/v2/app/tags/list",
            200,
            r#"{"name":"app","tags":["latest","v1","v2","broken"]}"#,
        );
        transport = with_manifest(transport, "latest", "sha256:one", 100);
        transport = with_manifest(transport, "v1", "sha256:one", 200);
        transport = with_manifest(transport, "v2", "sha256:two", 30);
        let transport = transport.fail("GET", "/v2/app/manifests/broken");

        let info = client(transport).repository_info("app").await.unwrap();
        assert_eq!(info.total_size, 130);
        assert!(!info.is_estimate);
        assert_eq!(info.tags_count, 4);
        assert_eq!(info.sample_tags_count, 4);
        assert_eq!(info.tags, vec!["latest", "v1", "v2", "broken"]);
    }

    #[tokio::test]
    async fn thirty_five_tags_is_still_exact() {
        let mut transport = ScriptedTransport::new().json("GET", "/v2/app/tags/list", 200, &tags_json(35));
        for i in 0..35 {
            transport = with_manifest(transport, &format!("t{}", i), &format!("sha256:{}", i), 10);
        }

        let info = client(transport).repository_info("app").await.unwrap();
        assert!(!info.is_estimate);
        assert_eq!(info.sample_tags_count, 35);
        assert_eq!(info.total_size, 350);
    }

    #[tokio::test]
    async fn large_repository_is_sampled_and_extrapolated() {
        let mut transport = ScriptedTransport::new().json("GET", "/v2/app/tags/list", 200, &tags_json(100));
        for i in 0..100 {
            transport = with_manifest(transport, &format!("t{}", i), &format!("sha256:{}", i), 100);
        }

        let client = client(transport);
        let info = client.repository_info("app").await.unwrap();
        assert!(info.is_estimate);
        assert_eq!(info.sample_tags_count, 10);
        assert_eq!(info.tags_count, 100);
        assert_eq!(info.total_size, 3700);

        let fetched: Vec<String> = client
            .transport()
            .calls()
            .into_iter()
            .filter(|call| call.contains("/manifests/"))
            .collect();
        let expected: Vec<String> = (0..10)
            .map(|i| format!("GET /v2/app/manifests/t{}", i * 10))
            .collect();
        assert_eq!(fetched, expected);
    }

    #[tokio::test]
    async fn tag_list_failure_propagates() {
        let transport = ScriptedTransport::new().fail("GET", "/v2/app/tags/list");
        assert!(client(transport).repository_info("app").await.is_err());
    }
}
