//! End-to-end KV purge workflow against a mock API server, including the
//! dry-run guarantee that no mutating call is issued.

#![allow(missing_docs)]

use assert_cmd::Command;
use predicates::prelude::*;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn cfsweep(server: &MockServer) -> Command {
    let mut cmd = Command::cargo_bin("cfsweep").expect("binary builds");
    cmd.env_remove("CLOUDFLARE_API_KEY")
        .env_remove("CLOUDFLARE_EMAIL")
        .env("CLOUDFLARE_API_TOKEN", "test-token")
        .env("CLOUDFLARE_ACCOUNT_ID", "acct-1")
        .env("CLOUDFLARE_API_BASE", server.uri());
    cmd
}

fn success_body(result: serde_json::Value) -> serde_json::Value {
    serde_json::json!({ "success": true, "errors": [], "result": result })
}

async fn mount_kv_fixture(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/accounts/acct-1/storage/kv/namespaces"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_body(
            serde_json::json!([ { "id": "ns1", "title": "pages" } ]),
        )))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/accounts/acct-1/storage/kv/namespaces/ns1/keys"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "errors": [],
            "result": [
                { "name": "k1", "metadata": { "cache-tag": "product-123" } },
                { "name": "k2", "metadata": { "cache-tag": "product-123-variant" } },
                { "name": "k3", "metadata": { "cache-tag": "unrelated" } },
                { "name": "k4" }
            ],
            "result_info": { "count": 4, "cursor": "" }
        })))
        .mount(server)
        .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn dry_run_previews_matches_without_mutating() {
    let server = MockServer::start().await;
    mount_kv_fixture(&server).await;

    // Any DELETE or purge POST would violate the dry-run contract.
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    cfsweep(&server)
        .args([
            "kv",
            "purge",
            "--all-namespaces",
            "--tag",
            "product-123",
            "--dry-run",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("k1 (cache-tag: product-123)"))
        .stdout(predicate::str::contains(
            "k2 (cache-tag: product-123-variant)",
        ))
        .stdout(predicate::str::contains("k3").not())
        .stdout(predicate::str::contains(
            "Would purge 2 unique cache tag(s)",
        ));
}

#[tokio::test(flavor = "multi_thread")]
async fn real_run_deletes_matches_and_purges_tags_across_zones() {
    let server = MockServer::start().await;
    mount_kv_fixture(&server).await;

    for key in ["k1", "k2"] {
        Mock::given(method("DELETE"))
            .and(path(format!(
                "/accounts/acct-1/storage/kv/namespaces/ns1/values/{key}"
            )))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(success_body(serde_json::json!(null))),
            )
            .expect(1)
            .mount(&server)
            .await;
    }

    Mock::given(method("GET"))
        .and(path("/zones"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_body(
            serde_json::json!([ { "id": "z1", "name": "example.com", "status": "active" } ]),
        )))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/zones/z1/purge_cache"))
        .and(body_json(serde_json::json!({
            "tags": ["product-123", "product-123-variant"]
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(success_body(serde_json::json!({}))),
        )
        .expect(1)
        .mount(&server)
        .await;

    // 2 deletions + 1 tag purge call.
    cfsweep(&server)
        .args(["kv", "purge", "--namespace", "ns1", "--tag", "product-123"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Namespace ns1: 2 deleted, 0 failed"))
        .stdout(predicate::str::contains("Summary: 3 successful, 0 failed"));
}

#[tokio::test(flavor = "multi_thread")]
async fn kv_list_shows_namespaces_and_keys() {
    let server = MockServer::start().await;
    mount_kv_fixture(&server).await;

    cfsweep(&server)
        .args(["kv", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Available KV namespaces:"))
        .stdout(predicate::str::contains("pages"));

    cfsweep(&server)
        .args(["kv", "list", "--namespace", "ns1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("k1"))
        .stdout(predicate::str::contains("Showing 4/4 keys"));
}

#[tokio::test(flavor = "multi_thread")]
async fn kv_delete_with_tag_skips_cache_purge() {
    let server = MockServer::start().await;
    mount_kv_fixture(&server).await;

    for key in ["k1", "k2"] {
        Mock::given(method("DELETE"))
            .and(path(format!(
                "/accounts/acct-1/storage/kv/namespaces/ns1/values/{key}"
            )))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(success_body(serde_json::json!(null))),
            )
            .expect(1)
            .mount(&server)
            .await;
    }

    // kv delete must not touch the purge endpoint.
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    cfsweep(&server)
        .args(["kv", "delete", "--namespace", "ns1", "--tag", "product-123"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Summary: 2 successful, 0 failed"));
}
