//! KV purge command implementation
//!
//! The combined workflow: delete every entry whose cache-tag metadata
//! matches, then purge the deduplicated tag set across all zones in the
//! account.

use std::process::ExitCode;

use anyhow::Result;

use cfsweep_core::{run_kv_purge, ApiClient, KvDeleteOptions};

use crate::output;

/// Execute the combined delete + tag purge workflow.
pub async fn execute(client: &ApiClient, options: &KvDeleteOptions) -> Result<ExitCode> {
    let report = run_kv_purge(client, options).await?;

    super::print_sweep(&report.delete, &options.tag);

    if options.dry_run {
        let tags = report.delete.matches.unique_tags();
        if !tags.is_empty() {
            println!(
                "\nWould purge {} unique cache tag(s) across all zones: {}",
                tags.len(),
                tags.join(", ")
            );
        }
        return Ok(ExitCode::SUCCESS);
    }

    if !report.purge_outcomes.is_empty() {
        output::header("Purging cache for matched tags");
        for outcome in &report.purge_outcomes {
            if outcome.ok {
                output::success(&outcome.detail);
            } else {
                output::error(&outcome.detail);
            }
        }
    }

    for warning in &report.warnings {
        output::error(warning);
    }

    output::print_summary(report.summary);
    Ok(output::summary_exit(report.summary))
}
