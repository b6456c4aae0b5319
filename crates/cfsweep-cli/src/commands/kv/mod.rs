//! KV command implementations

mod create;
mod delete;
mod list;
mod purge;
mod rename;

use std::process::ExitCode;

use anyhow::Result;

use cfsweep_core::{Credentials, KvDeleteOptions, KvDeleteReport};

use crate::cli::KvCommands;
use crate::output;

/// Dispatch a `cfsweep kv` subcommand.
pub async fn execute(
    credentials: &Credentials,
    api_url: &str,
    command: KvCommands,
) -> Result<ExitCode> {
    let client = super::api_client(credentials, api_url)?;

    match command {
        KvCommands::List {
            namespace,
            verbose,
            prefix,
            limit,
            cursor,
        } => list::execute(&client, namespace.as_deref(), verbose, prefix.as_deref(), limit, cursor).await,

        KvCommands::Delete {
            namespace,
            all_namespaces,
            tag,
            key,
            dry_run,
        } => delete::execute(&client, namespace, all_namespaces, tag, key, dry_run).await,

        KvCommands::Purge {
            namespace,
            all_namespaces,
            tag,
            dry_run,
        } => {
            let options = KvDeleteOptions {
                namespaces: namespace,
                all_namespaces,
                tag,
                dry_run,
            };
            purge::execute(&client, &options).await
        },

        KvCommands::Create { title } => create::execute(&client, &title).await,

        KvCommands::Rename { namespace, title } => {
            rename::execute(&client, &namespace, &title).await
        },
    }
}

/// Print the per-namespace blocks of a deletion pass: matches, previews on
/// dry runs, deletion counts and failures otherwise.
fn print_sweep(report: &KvDeleteReport, tag: &str) {
    for outcome in &report.outcomes {
        println!("\nProcessing namespace: {}", outcome.namespace);

        if let Some(error) = &outcome.error {
            output::error(error);
            continue;
        }

        if outcome.matches.is_empty() {
            println!("No keys with cache-tag containing '{tag}'");
            continue;
        }

        println!(
            "Found {} key(s) with cache-tag containing '{tag}'",
            outcome.matches.len()
        );

        if report.dry_run {
            println!("Dry run mode - would delete:");
            for m in outcome.matches.iter() {
                println!("  {} (cache-tag: {})", m.key, m.tag);
            }
        } else {
            for warning in &outcome.deletion.warnings {
                output::error(warning);
            }
            println!(
                "Namespace {}: {} deleted, {} failed",
                outcome.namespace, outcome.deletion.success, outcome.deletion.failure
            );
        }
    }
}
