//! KV delete command implementation

use std::process::ExitCode;

use anyhow::{bail, Context, Result};

use cfsweep_core::{run_kv_delete, ApiClient, CdnClient, KvDeleteOptions};

use crate::output;

/// Delete a single key, or every entry whose cache-tag metadata matches.
pub async fn execute(
    client: &ApiClient,
    namespaces: Vec<String>,
    all_namespaces: bool,
    tag: Option<String>,
    key: Option<String>,
    dry_run: bool,
) -> Result<ExitCode> {
    if let Some(key) = key {
        return delete_single_key(client, &namespaces, all_namespaces, &key, dry_run).await;
    }

    let Some(tag) = tag else {
        bail!("either --tag or --key is required for deletion");
    };

    let options = KvDeleteOptions {
        namespaces,
        all_namespaces,
        tag: tag.clone(),
        dry_run,
    };
    let report = run_kv_delete(client, &options).await?;

    super::print_sweep(&report, &tag);

    if report.dry_run {
        return Ok(ExitCode::SUCCESS);
    }

    output::print_summary(report.summary);
    Ok(output::summary_exit(report.summary))
}

async fn delete_single_key(
    client: &ApiClient,
    namespaces: &[String],
    all_namespaces: bool,
    key: &str,
    dry_run: bool,
) -> Result<ExitCode> {
    if all_namespaces {
        bail!("cannot use --all-namespaces with --key; specify a single namespace");
    }
    let [namespace] = namespaces else {
        bail!("specify exactly one namespace with --key");
    };

    if dry_run {
        println!("Dry run mode - would delete key '{key}' from namespace {namespace}");
        return Ok(ExitCode::SUCCESS);
    }

    client
        .delete_kv_entry(namespace, key)
        .await
        .with_context(|| format!("failed to delete key '{key}' in namespace {namespace}"))?;

    output::success(&format!("deleted key '{key}' from namespace {namespace}"));
    Ok(ExitCode::SUCCESS)
}
