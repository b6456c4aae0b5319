//! # CLI Structure and Argument Parsing
//!
//! The command-line interface for `cfsweep`, built with `clap` derive
//! macros. Global credential flags apply to every command and fall back to
//! the conventional environment variables, so CI jobs can export
//! `CLOUDFLARE_API_TOKEN` once and never pass flags:
//!
//! ```bash
//! # Purge everything from one zone
//! cfsweep purge --everything example.com
//!
//! # Purge specific hosts across all zones
//! cfsweep purge --all --hosts api.example.com,www.example.com
//!
//! # Delete tagged KV entries and purge their cache tags
//! cfsweep kv purge --all-namespaces --tag product-123 --dry-run
//! ```
//!
//! Comma-separated list flags (`--hosts`, `--urls`, `--tags`,
//! `--namespace`) are split by clap, so both `--hosts a,b` and repeated
//! `--hosts a --hosts b` work.

use clap::{Parser, Subcommand};
use clap_complete::Shell;

use cfsweep_core::{Credentials, DEFAULT_BASE_URL};

/// Main CLI structure for the `cfsweep` command.
#[derive(Parser, Debug)]
#[command(name = "cfsweep")]
#[command(version)]
#[command(about = "CDN cache purge and Workers KV management", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API token (Bearer authentication)
    #[arg(
        long = "token",
        global = true,
        env = "CLOUDFLARE_API_TOKEN",
        hide_env_values = true,
        value_name = "TOKEN"
    )]
    pub api_token: Option<String>,

    /// Legacy API key (requires --email)
    #[arg(
        long = "key",
        global = true,
        env = "CLOUDFLARE_API_KEY",
        hide_env_values = true,
        value_name = "KEY"
    )]
    pub api_key: Option<String>,

    /// Account email accompanying --key
    #[arg(long, global = true, env = "CLOUDFLARE_EMAIL", value_name = "EMAIL")]
    pub email: Option<String>,

    /// Account ID (required for KV operations)
    #[arg(
        long = "account",
        global = true,
        env = "CLOUDFLARE_ACCOUNT_ID",
        value_name = "ID"
    )]
    pub account_id: Option<String>,

    /// Override the API base URL (gateways, tests)
    #[arg(
        long = "api-url",
        global = true,
        env = "CLOUDFLARE_API_BASE",
        default_value = DEFAULT_BASE_URL,
        hide = true,
        value_name = "URL"
    )]
    pub api_url: String,

    /// Enable verbose logging output
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Collect the credential flags into the explicit struct the core
    /// client consumes.
    pub fn credentials(&self) -> Credentials {
        Credentials {
            api_token: self.api_token.clone(),
            api_key: self.api_key.clone(),
            email: self.email.clone(),
            account_id: self.account_id.clone(),
        }
    }
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List zones in the account
    List,

    /// Purge zone caches by host, URL, tag, or entirely
    Purge {
        /// Zone names or IDs to target
        #[arg(value_name = "ZONE")]
        zones: Vec<String>,

        /// Comma-separated hosts to purge
        #[arg(long, value_delimiter = ',', value_name = "HOST")]
        hosts: Vec<String>,

        /// Comma-separated URLs to purge
        #[arg(long, value_delimiter = ',', value_name = "URL")]
        urls: Vec<String>,

        /// Comma-separated cache tags to purge
        #[arg(long, value_delimiter = ',', value_name = "TAG")]
        tags: Vec<String>,

        /// Apply to all zones
        #[arg(long)]
        all: bool,

        /// Purge everything from the targeted zones
        #[arg(long, conflicts_with_all = ["hosts", "urls", "tags"])]
        everything: bool,

        /// Suppress per-zone success messages
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Manage Workers KV namespaces and entries
    #[command(subcommand)]
    Kv(KvCommands),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// `cfsweep kv` subcommands.
#[derive(Subcommand, Debug)]
pub enum KvCommands {
    /// List KV namespaces, or keys in a namespace
    List {
        /// Namespace ID to list keys from (lists namespaces when omitted)
        #[arg(long, value_name = "ID")]
        namespace: Option<String>,

        /// Display key expiration and metadata
        #[arg(long)]
        verbose: bool,

        /// Only list keys starting with this prefix
        #[arg(long, value_name = "PREFIX")]
        prefix: Option<String>,

        /// Maximum number of keys to return
        #[arg(long, default_value_t = 1000)]
        limit: u32,

        /// Pagination cursor from a previous page
        #[arg(long, value_name = "CURSOR")]
        cursor: Option<String>,
    },

    /// Delete KV entries by key or by cache-tag metadata
    Delete {
        /// Comma-separated namespace IDs
        #[arg(long, value_delimiter = ',', value_name = "ID")]
        namespace: Vec<String>,

        /// Apply to all KV namespaces
        #[arg(long)]
        all_namespaces: bool,

        /// Delete entries whose cache-tag metadata contains this value
        #[arg(long, value_name = "TAG")]
        tag: Option<String>,

        /// Specific key to delete
        #[arg(long, value_name = "KEY", conflicts_with = "tag")]
        key: Option<String>,

        /// Show what would be deleted without deleting
        #[arg(long)]
        dry_run: bool,
    },

    /// Delete tagged KV entries and purge their cache tags everywhere
    Purge {
        /// Comma-separated namespace IDs
        #[arg(long, value_delimiter = ',', value_name = "ID")]
        namespace: Vec<String>,

        /// Apply to all KV namespaces
        #[arg(long)]
        all_namespaces: bool,

        /// Cache-tag substring selecting the entries
        #[arg(long, required = true, value_name = "TAG")]
        tag: String,

        /// Preview without deleting or purging
        #[arg(long)]
        dry_run: bool,
    },

    /// Create a KV namespace
    Create {
        /// Title for the new namespace
        #[arg(long, required = true, value_name = "TITLE")]
        title: String,
    },

    /// Rename a KV namespace
    Rename {
        /// Namespace ID to rename
        #[arg(long, required = true, value_name = "ID")]
        namespace: String,

        /// New namespace title
        #[arg(long, required = true, value_name = "TITLE")]
        title: String,
    },
}
