//! # cfsweep-core
//!
//! Core functionality for cfsweep — a CLI for invalidating CDN cached
//! content and managing Workers KV storage.
//!
//! This crate holds everything below the command line: credential handling,
//! the HTTP API client behind the [`CdnClient`] capability trait, zone
//! resolution with longest-suffix host matching, bounded-concurrency batch
//! execution, cache-tag collection from KV metadata, and the purge
//! orchestrators that compose them.
//!
//! ## Architecture
//!
//! - **Resolution**: [`ZoneIndex`] is built once from the zone snapshot and
//!   answers exact and best-match queries; [`resolve`] turns raw zone
//!   arguments, hosts, and URLs into a target set with per-zone assignments.
//! - **Execution**: [`run_batches`] fans work out with one concurrent task
//!   per batch and merges per-task reports — no shared mutable state.
//! - **Orchestration**: [`run_cache_purge`] and [`run_kv_purge`] compose
//!   resolution, collection, and execution over a [`CdnClient`] and
//!   aggregate partial success/failure into a [`Summary`].
//!
//! ## Failure model
//!
//! Configuration errors ([`Error::Config`], [`Error::Auth`]) abort before
//! any network call. Everything after that is isolated: a failed purge call
//! or KV deletion is counted and reported while the run continues, and the
//! final [`Summary`] decides the process exit code.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use cfsweep_core::{ApiClient, Credentials, PurgeOptions, run_cache_purge};
//!
//! # async fn demo() -> cfsweep_core::Result<()> {
//! let credentials = Credentials {
//!     api_token: Some("token".to_string()),
//!     ..Credentials::default()
//! };
//! let client = ApiClient::new(credentials)?;
//! let options = PurgeOptions {
//!     hosts: vec!["api.example.com".to_string()],
//!     ..PurgeOptions::default()
//! };
//! let report = run_cache_purge(&client, &options).await?;
//! println!("{} ok, {} failed", report.summary.success, report.summary.failure);
//! # Ok(())
//! # }
//! ```

/// Bounded-concurrency batch execution.
pub mod batch;
/// CDN API client and capability trait.
pub mod client;
/// API credential handling.
pub mod config;
/// Error types and result aliases.
pub mod error;
/// Purge orchestration.
pub mod purge;
/// Zone resolution and host/URL assignment.
pub mod resolver;
/// Cache-tag collection from KV metadata.
pub mod tags;
/// Core data types.
pub mod types;

// Re-export commonly used types
pub use batch::{chunked, run_batches, BatchReport};
pub use client::{
    ApiClient, CdnClient, KeyListPage, KeyListQuery, DEFAULT_BASE_URL, KV_DELETE_BATCH_SIZE,
    PURGE_TAG_LIMIT,
};
pub use config::{AuthScheme, Credentials};
pub use error::{Error, Result};
pub use purge::{
    run_cache_purge, run_kv_delete, run_kv_purge, KvDeleteOptions, KvDeleteReport, KvPurgeReport,
    NamespaceOutcome, PurgeOptions, PurgeReport, ZoneOutcome,
};
pub use resolver::{resolve, Resolution, ResolveRequest, ZoneAssignment, ZoneIndex};
pub use tags::{collect_by_tag, TagMatch, TagMatches, CACHE_TAG_FIELD};
pub use types::{KvKey, KvNamespace, PurgeRequest, Summary, Zone};
