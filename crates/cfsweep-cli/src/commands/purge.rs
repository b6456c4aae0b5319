//! Purge command implementation

use std::process::ExitCode;

use anyhow::Result;

use cfsweep_core::{run_cache_purge, Credentials, PurgeOptions};

use crate::output;

/// Execute the purge command: resolve target zones, fan out the purge
/// calls, and report the aggregate outcome. `quiet` suppresses per-zone
/// success lines; failures and the summary always print.
pub async fn execute(
    credentials: &Credentials,
    api_url: &str,
    options: &PurgeOptions,
    quiet: bool,
) -> Result<ExitCode> {
    let client = super::api_client(credentials, api_url)?;
    let report = run_cache_purge(&client, options).await?;

    for warning in &report.warnings {
        output::warning(warning);
    }

    for outcome in &report.outcomes {
        if outcome.ok {
            if !quiet {
                output::success(&outcome.detail);
            }
        } else {
            output::error(&outcome.detail);
        }
    }

    output::print_summary(report.summary);
    Ok(output::summary_exit(report.summary))
}
