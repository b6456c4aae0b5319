//! Core data types: zone and KV snapshots, purge payloads, run summaries.

use serde::{Deserialize, Serialize};

/// A managed domain under the CDN account.
///
/// Zones are an immutable snapshot fetched once per invocation and discarded
/// at process exit; `id` is the unique handle used in API paths, `name` is
/// the public domain (e.g. `example.com`) used for host/URL matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    /// Opaque zone identifier.
    pub id: String,
    /// Public domain name of the zone.
    pub name: String,
    /// Zone status as reported by the API (`active`, `pending`, ...).
    #[serde(default)]
    pub status: String,
}

/// A Workers KV namespace scoped to the account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KvNamespace {
    /// Opaque namespace identifier.
    pub id: String,
    /// Human-readable namespace title.
    pub title: String,
}

/// A key listed from a KV namespace, with optional expiration and metadata.
// No Eq: JSON metadata values are only PartialEq.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KvKey {
    /// The key name.
    pub name: String,
    /// Unix timestamp at which the key expires, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<i64>,
    /// Arbitrary JSON metadata attached to the key, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// Payload for a cache purge call against a single zone.
///
/// Field names and omission rules follow the CDN wire format: empty
/// collections and a false `purge_everything` are left out of the JSON body
/// entirely, so the API sees only the fields that apply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PurgeRequest {
    /// Full URLs to purge.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,
    /// Cache tags to purge.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Hostnames to purge.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hosts: Vec<String>,
    /// Purge the entire zone cache; mutually exclusive with the selectors.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub purge_everything: bool,
}

impl PurgeRequest {
    /// A request that purges the entire zone cache.
    #[must_use]
    pub fn everything() -> Self {
        Self {
            purge_everything: true,
            ..Self::default()
        }
    }

    /// A request purging the given hostnames.
    #[must_use]
    pub fn hosts(hosts: Vec<String>) -> Self {
        Self {
            hosts,
            ..Self::default()
        }
    }

    /// A request purging the given full URLs.
    #[must_use]
    pub fn files(files: Vec<String>) -> Self {
        Self {
            files,
            ..Self::default()
        }
    }

    /// A request purging the given cache tags.
    #[must_use]
    pub fn tags(tags: Vec<String>) -> Self {
        Self {
            tags,
            ..Self::default()
        }
    }

    /// True when the request would be a no-op on the wire.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.purge_everything
            && self.files.is_empty()
            && self.tags.is_empty()
            && self.hosts.is_empty()
    }
}

/// Aggregate success/failure counts for a whole run.
///
/// `success + failure` always equals the number of attempted operations
/// (purge calls or KV deletions); the merge discipline in the batch executor
/// guarantees no operation is double-counted under concurrency. Drives the
/// process exit code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Operations that completed successfully.
    pub success: usize,
    /// Operations that failed.
    pub failure: usize,
}

impl Summary {
    /// Record one successful operation.
    pub fn record_success(&mut self) {
        self.success += 1;
    }

    /// Record one failed operation.
    pub fn record_failure(&mut self) {
        self.failure += 1;
    }

    /// Fold another summary into this one.
    pub fn merge(&mut self, other: Self) {
        self.success += other.success;
        self.failure += other.failure;
    }

    /// Total operations attempted.
    #[must_use]
    pub const fn attempted(&self) -> usize {
        self.success + self.failure
    }

    /// True when nothing failed.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.failure == 0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn purge_request_omits_empty_fields() {
        let body = serde_json::to_value(PurgeRequest::hosts(vec![
            "api.example.com".to_string(),
        ]))
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "hosts": ["api.example.com"] })
        );

        let body = serde_json::to_value(PurgeRequest::everything()).unwrap();
        assert_eq!(body, serde_json::json!({ "purge_everything": true }));
    }

    #[test]
    fn purge_request_emptiness() {
        assert!(PurgeRequest::default().is_empty());
        assert!(!PurgeRequest::everything().is_empty());
        assert!(!PurgeRequest::tags(vec!["t1".to_string()]).is_empty());
    }

    #[test]
    fn zone_deserializes_without_status() {
        let zone: Zone =
            serde_json::from_value(serde_json::json!({ "id": "z1", "name": "example.com" }))
                .unwrap();
        assert_eq!(zone.status, "");
    }

    #[test]
    fn kv_key_metadata_is_optional() {
        let key: KvKey = serde_json::from_value(serde_json::json!({ "name": "k1" })).unwrap();
        assert!(key.metadata.is_none());
        assert!(key.expiration.is_none());

        let key: KvKey = serde_json::from_value(serde_json::json!({
            "name": "k2",
            "expiration": 1_700_000_000,
            "metadata": { "cache-tag": "product-123" }
        }))
        .unwrap();
        assert_eq!(key.expiration, Some(1_700_000_000));
        assert_eq!(
            key.metadata.unwrap()["cache-tag"],
            serde_json::json!("product-123")
        );
    }

    #[test]
    fn summary_merge_is_additive() {
        let mut summary = Summary::default();
        summary.record_success();
        summary.record_failure();
        summary.merge(Summary {
            success: 2,
            failure: 0,
        });
        assert_eq!(
            summary,
            Summary {
                success: 3,
                failure: 1
            }
        );
        assert_eq!(summary.attempted(), 4);
        assert!(!summary.is_clean());
    }
}
