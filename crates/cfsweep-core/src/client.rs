//! CDN API client: the [`CdnClient`] capability trait consumed by the purge
//! orchestrators, and [`ApiClient`], its HTTP implementation speaking the
//! `/client/v4` wire format.
//!
//! Every response arrives in a `{ success, errors[], result }` envelope; a
//! `success: false` envelope (or a non-JSON error body) is surfaced as
//! [`Error::Api`]. The client is built once per invocation with a request
//! timeout so a hung call cannot stall a run indefinitely.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::config::{AuthScheme, Credentials};
use crate::types::{KvKey, KvNamespace, PurgeRequest, Zone};
use crate::{Error, Result};

/// Production API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.cloudflare.com/client/v4";

/// The API accepts at most this many cache tags per purge call.
pub const PURGE_TAG_LIMIT: usize = 30;

/// Batch size for KV entry deletions; mirrors the purge tag limit and keeps
/// fan-out bounded to `ceil(n / 30)` concurrent tasks.
pub const KV_DELETE_BATCH_SIZE: usize = 30;

/// Query options for listing keys in a KV namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyListQuery {
    /// Only return keys whose name starts with this prefix.
    pub prefix: Option<String>,
    /// Maximum number of keys per page.
    pub limit: Option<u32>,
    /// Pagination cursor from a previous page.
    pub cursor: Option<String>,
}

/// One page of keys from a KV namespace listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyListPage {
    /// The keys on this page.
    pub keys: Vec<KvKey>,
    /// Cursor for the next page; `None` when this is the last page.
    pub cursor: Option<String>,
    /// Total key count in the namespace, when the API reports it.
    pub total: Option<u64>,
}

/// The capability interface the purge orchestrators require from the CDN.
///
/// [`ApiClient`] is the production implementation; tests substitute scripted
/// doubles.
#[async_trait]
pub trait CdnClient: Send + Sync {
    /// List all zones visible to the credentials.
    async fn list_zones(&self) -> Result<Vec<Zone>>;

    /// Purge the entire cache of one zone.
    async fn purge_everything(&self, zone_id: &str) -> Result<()>;

    /// Purge selected content (hosts, files, tags) from one zone.
    async fn purge_cache(&self, zone_id: &str, request: &PurgeRequest) -> Result<()>;

    /// List the account's KV namespaces.
    async fn list_kv_namespaces(&self) -> Result<Vec<KvNamespace>>;

    /// List one page of keys in a namespace.
    async fn list_kv_keys(&self, namespace_id: &str, query: &KeyListQuery) -> Result<KeyListPage>;

    /// Delete a single KV entry.
    async fn delete_kv_entry(&self, namespace_id: &str, key: &str) -> Result<()>;

    /// Create a KV namespace with the given title.
    async fn create_kv_namespace(&self, title: &str) -> Result<KvNamespace>;

    /// Rename a KV namespace.
    async fn rename_kv_namespace(&self, namespace_id: &str, title: &str) -> Result<()>;

    /// Drain every page of a namespace's key listing.
    async fn list_all_kv_keys(
        &self,
        namespace_id: &str,
        prefix: Option<&str>,
    ) -> Result<Vec<KvKey>> {
        let mut keys = Vec::new();
        let mut query = KeyListQuery {
            prefix: prefix.map(ToString::to_string),
            ..KeyListQuery::default()
        };
        loop {
            let page = self.list_kv_keys(namespace_id, &query).await?;
            keys.extend(page.keys);
            match page.cursor {
                Some(cursor) => query.cursor = Some(cursor),
                None => return Ok(keys),
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct ResultInfo {
    #[serde(default)]
    cursor: Option<String>,
    #[serde(default)]
    count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    #[serde(default)]
    errors: Vec<ApiErrorBody>,
    result: Option<T>,
    result_info: Option<ResultInfo>,
}

/// HTTP implementation of [`CdnClient`].
pub struct ApiClient {
    http: Client,
    base_url: Url,
    credentials: Credentials,
}

impl ApiClient {
    /// Creates a client against the production endpoint.
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::with_base_url(credentials, DEFAULT_BASE_URL)
    }

    /// Creates a client against a custom endpoint (tests, gateways).
    pub fn with_base_url(credentials: Credentials, base_url: &str) -> Result<Self> {
        credentials.validate()?;
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("invalid API base URL '{base_url}': {e}")))?;
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("cfsweep/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(Error::Network)?;
        Ok(Self {
            http,
            base_url,
            credentials,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::Config("API base URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> Result<RequestBuilder> {
        let builder = self.http.request(method, url);
        Ok(match self.credentials.auth_scheme()? {
            AuthScheme::Token(token) => builder.bearer_auth(token),
            AuthScheme::KeyEmail { key, email } => builder
                .header("X-Auth-Key", key)
                .header("X-Auth-Email", email),
        })
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<Envelope<T>> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        match serde_json::from_slice::<Envelope<T>>(&body) {
            Ok(envelope) if envelope.success => Ok(envelope),
            Ok(envelope) => Err(envelope_error(status, &envelope.errors)),
            Err(err) if status.is_success() => Err(Error::Serialization(format!(
                "unexpected response body: {err}"
            ))),
            Err(_) => Err(Error::Api {
                code: i64::from(status.as_u16()),
                message: format!("request failed with HTTP {status}"),
            }),
        }
    }

    async fn send_unit(&self, builder: RequestBuilder) -> Result<()> {
        self.send::<serde_json::Value>(builder).await.map(|_| ())
    }

    fn account_id(&self) -> Result<&str> {
        self.credentials.account_id()
    }
}

fn envelope_error(status: StatusCode, errors: &[ApiErrorBody]) -> Error {
    match errors.first() {
        Some(first) => Error::Api {
            code: first.code,
            message: errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; "),
        },
        None => Error::Api {
            code: i64::from(status.as_u16()),
            message: format!("request failed with HTTP {status}"),
        },
    }
}

#[async_trait]
impl CdnClient for ApiClient {
    async fn list_zones(&self) -> Result<Vec<Zone>> {
        let mut url = self.endpoint(&["zones"])?;
        if let Ok(account) = self.credentials.account_id() {
            url.query_pairs_mut().append_pair("account.id", account);
        }
        debug!(%url, "listing zones");
        let envelope = self.send::<Vec<Zone>>(self.request(Method::GET, url)?).await?;
        Ok(envelope.result.unwrap_or_default())
    }

    async fn purge_everything(&self, zone_id: &str) -> Result<()> {
        self.purge_cache(zone_id, &PurgeRequest::everything()).await
    }

    async fn purge_cache(&self, zone_id: &str, request: &PurgeRequest) -> Result<()> {
        let url = self.endpoint(&["zones", zone_id, "purge_cache"])?;
        debug!(zone = zone_id, "purging cache");
        self.send_unit(self.request(Method::POST, url)?.json(request))
            .await
    }

    async fn list_kv_namespaces(&self) -> Result<Vec<KvNamespace>> {
        let account = self.account_id()?;
        let url = self.endpoint(&["accounts", account, "storage", "kv", "namespaces"])?;
        let envelope = self
            .send::<Vec<KvNamespace>>(self.request(Method::GET, url)?)
            .await?;
        Ok(envelope.result.unwrap_or_default())
    }

    async fn list_kv_keys(&self, namespace_id: &str, query: &KeyListQuery) -> Result<KeyListPage> {
        let account = self.account_id()?;
        let mut url = self.endpoint(&[
            "accounts",
            account,
            "storage",
            "kv",
            "namespaces",
            namespace_id,
            "keys",
        ])?;
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(prefix) = &query.prefix {
                pairs.append_pair("prefix", prefix);
            }
            if let Some(limit) = query.limit {
                pairs.append_pair("limit", &limit.to_string());
            }
            if let Some(cursor) = &query.cursor {
                pairs.append_pair("cursor", cursor);
            }
        }
        let envelope = self
            .send::<Vec<KvKey>>(self.request(Method::GET, url)?)
            .await?;
        let info = envelope.result_info;
        Ok(KeyListPage {
            keys: envelope.result.unwrap_or_default(),
            // The API signals the last page with an empty or absent cursor.
            cursor: info
                .as_ref()
                .and_then(|i| i.cursor.clone())
                .filter(|c| !c.is_empty() && c != "null"),
            total: info.and_then(|i| i.count),
        })
    }

    async fn delete_kv_entry(&self, namespace_id: &str, key: &str) -> Result<()> {
        let account = self.account_id()?;
        // `values/<key>` goes through path_segments_mut so arbitrary key
        // names are percent-encoded correctly.
        let url = self.endpoint(&[
            "accounts",
            account,
            "storage",
            "kv",
            "namespaces",
            namespace_id,
            "values",
            key,
        ])?;
        self.send_unit(self.request(Method::DELETE, url)?).await
    }

    async fn create_kv_namespace(&self, title: &str) -> Result<KvNamespace> {
        let account = self.account_id()?;
        let url = self.endpoint(&["accounts", account, "storage", "kv", "namespaces"])?;
        let envelope = self
            .send::<KvNamespace>(
                self.request(Method::POST, url)?
                    .json(&serde_json::json!({ "title": title })),
            )
            .await?;
        envelope
            .result
            .ok_or_else(|| Error::Serialization("namespace creation returned no result".to_string()))
    }

    async fn rename_kv_namespace(&self, namespace_id: &str, title: &str) -> Result<()> {
        let account = self.account_id()?;
        let url = self.endpoint(&[
            "accounts",
            account,
            "storage",
            "kv",
            "namespaces",
            namespace_id,
        ])?;
        self.send_unit(
            self.request(Method::PUT, url)?
                .json(&serde_json::json!({ "title": title })),
        )
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn token_credentials() -> Credentials {
        Credentials {
            api_token: Some("test-token".to_string()),
            account_id: Some("acct-1".to_string()),
            ..Credentials::default()
        }
    }

    fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::with_base_url(token_credentials(), &server.uri()).unwrap()
    }

    fn success_body(result: serde_json::Value) -> serde_json::Value {
        serde_json::json!({ "success": true, "errors": [], "result": result })
    }

    #[tokio::test]
    async fn list_zones_sends_bearer_auth_and_parses_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/zones"))
            .and(header("authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body(
                serde_json::json!([
                    { "id": "z1", "name": "example.com", "status": "active" },
                    { "id": "z2", "name": "other.com", "status": "active" }
                ]),
            )))
            .mount(&server)
            .await;

        let zones = client_for(&server).list_zones().await.unwrap();
        assert_eq!(zones.len(), 2);
        assert_eq!(zones[0].name, "example.com");
    }

    #[tokio::test]
    async fn key_email_credentials_use_auth_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/zones"))
            .and(header("X-Auth-Key", "legacy-key"))
            .and(header("X-Auth-Email", "ops@example.com"))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body(
                serde_json::json!([]),
            )))
            .mount(&server)
            .await;

        let credentials = Credentials {
            api_key: Some("legacy-key".to_string()),
            email: Some("ops@example.com".to_string()),
            ..Credentials::default()
        };
        let client = ApiClient::with_base_url(credentials, &server.uri()).unwrap();
        assert!(client.list_zones().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn purge_cache_posts_expected_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/zones/z1/purge_cache"))
            .and(body_json(serde_json::json!({ "hosts": ["api.example.com"] })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(success_body(serde_json::json!({ "id": "z1" }))),
            )
            .mount(&server)
            .await;

        let request = PurgeRequest::hosts(vec!["api.example.com".to_string()]);
        client_for(&server).purge_cache("z1", &request).await.unwrap();
    }

    #[tokio::test]
    async fn error_envelope_maps_to_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/zones/z1/purge_cache"))
            .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
                "success": false,
                "errors": [
                    { "code": 10000, "message": "authentication error" },
                    { "code": 10001, "message": "token lacks permission" }
                ],
                "result": null
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .purge_everything("z1")
            .await
            .unwrap_err();
        match err {
            Error::Api { code, message } => {
                assert_eq!(code, 10000);
                assert!(message.contains("authentication error"));
                assert!(message.contains("token lacks permission"));
            },
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_json_error_body_maps_to_http_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/zones"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let err = client_for(&server).list_zones().await.unwrap_err();
        match err {
            Error::Api { code, .. } => assert_eq!(code, 502),
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn list_all_kv_keys_follows_cursor() {
        let server = MockServer::start().await;
        let keys_path = "/accounts/acct-1/storage/kv/namespaces/ns1/keys";

        Mock::given(method("GET"))
            .and(path(keys_path))
            .and(query_param("cursor", "next-page"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "errors": [],
                "result": [ { "name": "k3" } ],
                "result_info": { "count": 3, "cursor": "" }
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path(keys_path))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "errors": [],
                "result": [
                    { "name": "k1", "metadata": { "cache-tag": "t1" } },
                    { "name": "k2" }
                ],
                "result_info": { "count": 3, "cursor": "next-page" }
            })))
            .mount(&server)
            .await;

        let keys = client_for(&server)
            .list_all_kv_keys("ns1", None)
            .await
            .unwrap();
        assert_eq!(
            keys.iter().map(|k| k.name.as_str()).collect::<Vec<_>>(),
            vec!["k1", "k2", "k3"]
        );
    }

    #[tokio::test]
    async fn delete_kv_entry_percent_encodes_key() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path(
                "/accounts/acct-1/storage/kv/namespaces/ns1/values/cache%2Fpage%201",
            ))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(success_body(serde_json::json!(null))),
            )
            .mount(&server)
            .await;

        client_for(&server)
            .delete_kv_entry("ns1", "cache/page 1")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn kv_operations_require_account_id() {
        let credentials = Credentials {
            api_token: Some("test-token".to_string()),
            ..Credentials::default()
        };
        let client = ApiClient::with_base_url(credentials, "http://localhost:1").unwrap();
        assert!(matches!(
            client.list_kv_namespaces().await,
            Err(Error::Config(_))
        ));
    }

    #[tokio::test]
    async fn create_namespace_returns_new_namespace() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/accounts/acct-1/storage/kv/namespaces"))
            .and(body_json(serde_json::json!({ "title": "sessions" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body(
                serde_json::json!({ "id": "ns-new", "title": "sessions" }),
            )))
            .mount(&server)
            .await;

        let namespace = client_for(&server)
            .create_kv_namespace("sessions")
            .await
            .unwrap();
        assert_eq!(namespace.id, "ns-new");
        assert_eq!(namespace.title, "sessions");
    }
}
