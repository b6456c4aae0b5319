//! KV rename command implementation

use std::process::ExitCode;

use anyhow::{Context, Result};

use cfsweep_core::{ApiClient, CdnClient};

use crate::output;

/// Rename a KV namespace.
pub async fn execute(client: &ApiClient, namespace: &str, title: &str) -> Result<ExitCode> {
    client
        .rename_kv_namespace(namespace, title)
        .await
        .with_context(|| format!("failed to rename namespace {namespace}"))?;

    output::success(&format!("renamed namespace {namespace} to '{title}'"));
    Ok(ExitCode::SUCCESS)
}
