//! KV list command implementation

use std::process::ExitCode;

use anyhow::{Context, Result};

use cfsweep_core::{ApiClient, CdnClient, KeyListQuery};

/// List namespaces, or the keys of one namespace.
pub async fn execute(
    client: &ApiClient,
    namespace: Option<&str>,
    verbose: bool,
    prefix: Option<&str>,
    limit: u32,
    cursor: Option<String>,
) -> Result<ExitCode> {
    match namespace {
        None => list_namespaces(client).await,
        Some(namespace) => list_keys(client, namespace, verbose, prefix, limit, cursor).await,
    }
}

async fn list_namespaces(client: &ApiClient) -> Result<ExitCode> {
    let namespaces = client
        .list_kv_namespaces()
        .await
        .context("failed to list KV namespaces")?;

    if namespaces.is_empty() {
        println!("No KV namespaces found in account");
        return Ok(ExitCode::SUCCESS);
    }

    println!("\nAvailable KV namespaces:");
    println!("{:<40} {:<34}", "Title", "Namespace ID");
    println!("{}", "-".repeat(80));
    for namespace in &namespaces {
        println!("{:<40} {:<34}", namespace.title, namespace.id);
    }

    Ok(ExitCode::SUCCESS)
}

async fn list_keys(
    client: &ApiClient,
    namespace: &str,
    verbose: bool,
    prefix: Option<&str>,
    limit: u32,
    cursor: Option<String>,
) -> Result<ExitCode> {
    let query = KeyListQuery {
        prefix: prefix.map(ToString::to_string),
        limit: Some(limit),
        cursor,
    };
    let page = client
        .list_kv_keys(namespace, &query)
        .await
        .with_context(|| format!("failed to list keys in namespace {namespace}"))?;

    println!("\nKeys in namespace {namespace}:");
    if verbose {
        println!("{:<40} {:<22} {}", "Key", "Expiration", "Metadata");
        println!("{}", "-".repeat(80));
        for key in &page.keys {
            let metadata = key
                .metadata
                .as_ref()
                .map_or_else(|| "none".to_string(), ToString::to_string);
            println!(
                "{:<40} {:<22} {}",
                key.name,
                format_expiration(key.expiration),
                metadata
            );
        }
    } else {
        for key in &page.keys {
            println!("{}", key.name);
        }
    }

    if let Some(cursor) = &page.cursor {
        println!("\nMore keys available. Use this cursor for the next page:");
        println!("  --cursor={cursor}");
    }

    match page.total {
        Some(total) => println!("\nShowing {}/{total} keys", page.keys.len()),
        None => println!("\nShowing {} keys", page.keys.len()),
    }

    Ok(ExitCode::SUCCESS)
}

fn format_expiration(expiration: Option<i64>) -> String {
    expiration
        .and_then(|ts| chrono::DateTime::from_timestamp(ts, 0))
        .map_or_else(
            || "never".to_string(),
            |at| at.format("%Y-%m-%d %H:%M:%S").to_string(),
        )
}
