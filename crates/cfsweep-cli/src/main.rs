//! cfsweep CLI - CDN cache purge and Workers KV management
//!
//! This is the main entry point for the cfsweep command-line interface.
//! Command implementations live in separate modules under `commands`; the
//! entry point only parses arguments, wires up logging, and maps the run's
//! outcome to an exit code: 0 when every operation succeeded, 1 when any
//! operation failed or a pre-flight check rejected the invocation.

use std::process::ExitCode;

use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod cli;
mod commands;
mod output;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = initialize_logging(&cli) {
        eprintln!("failed to initialize logging: {err}");
        return ExitCode::FAILURE;
    }

    match execute_command(cli).await {
        Ok(code) => code,
        Err(err) => {
            output::error(&format!("{err:#}"));
            ExitCode::FAILURE
        },
    }
}

fn initialize_logging(cli: &Cli) -> anyhow::Result<()> {
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };

    // Diagnostics go to stderr so tables and summaries stay pipeable.
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

async fn execute_command(cli: Cli) -> anyhow::Result<ExitCode> {
    let credentials = cli.credentials();
    let api_url = cli.api_url.clone();

    match cli.command {
        Commands::List => commands::list_zones(&credentials, &api_url).await,

        Commands::Purge {
            zones,
            hosts,
            urls,
            tags,
            all,
            everything,
            quiet,
        } => {
            let options = cfsweep_core::PurgeOptions {
                zones,
                hosts,
                urls,
                tags,
                all,
                everything,
            };
            commands::purge(&credentials, &api_url, &options, quiet).await
        },

        Commands::Kv(command) => commands::kv(&credentials, &api_url, command).await,

        Commands::Completions { shell } => {
            commands::generate_completions(shell);
            Ok(ExitCode::SUCCESS)
        },
    }
}
