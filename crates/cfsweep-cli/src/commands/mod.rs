//! Command implementations for the cfsweep CLI
//!
//! Each command lives in its own submodule. Commands that perform
//! operations return the exit code derived from their run summary;
//! read-only commands return success unless the API call itself fails.

mod completions;
mod kv;
mod list;
mod purge;

pub use completions::execute as generate_completions;
pub use kv::execute as kv;
pub use list::execute as list_zones;
pub use purge::execute as purge;

use anyhow::Context;
use cfsweep_core::{ApiClient, Credentials};

/// Build the API client, validating credentials first so auth problems
/// surface before any network call.
fn api_client(credentials: &Credentials, api_url: &str) -> anyhow::Result<ApiClient> {
    ApiClient::with_base_url(credentials.clone(), api_url)
        .context("failed to create API client")
}
