//! List command implementation

use std::process::ExitCode;

use anyhow::{Context, Result};

use cfsweep_core::{CdnClient, Credentials};

/// Execute the list command: print every zone in the account.
pub async fn execute(credentials: &Credentials, api_url: &str) -> Result<ExitCode> {
    let client = super::api_client(credentials, api_url)?;
    let zones = client.list_zones().await.context("failed to list zones")?;

    if zones.is_empty() {
        println!("No zones found in account");
        return Ok(ExitCode::SUCCESS);
    }

    println!("\nAvailable zones:");
    println!("{:<40} {:<34} {}", "Domain", "Zone ID", "Status");
    println!("{}", "-".repeat(80));
    for zone in &zones {
        println!("{:<40} {:<34} {}", zone.name, zone.id, zone.status);
    }

    Ok(ExitCode::SUCCESS)
}
