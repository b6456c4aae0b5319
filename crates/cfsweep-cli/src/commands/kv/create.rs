//! KV create command implementation

use std::process::ExitCode;

use anyhow::{Context, Result};

use cfsweep_core::{ApiClient, CdnClient};

use crate::output;

/// Create a KV namespace.
pub async fn execute(client: &ApiClient, title: &str) -> Result<ExitCode> {
    let namespace = client
        .create_kv_namespace(title)
        .await
        .with_context(|| format!("failed to create namespace '{title}'"))?;

    output::success(&format!(
        "created namespace '{}' ({})",
        namespace.title, namespace.id
    ));
    Ok(ExitCode::SUCCESS)
}
