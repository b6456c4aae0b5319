//! Purge orchestration.
//!
//! Two workflows compose the resolver, batch executor, and tag collector on
//! top of a [`CdnClient`]:
//!
//! - [`run_cache_purge`] — resolve target zones, build per-zone payloads,
//!   fan the purge calls out with one concurrent task per zone, and merge
//!   the results into a [`Summary`] plus per-zone outcome lines.
//! - [`run_kv_purge`] / [`run_kv_delete`] — scan KV namespaces for entries
//!   carrying a matching cache tag, delete them in bounded-concurrency
//!   batches, and (for the purge variant) invalidate the deduplicated tag
//!   set across every zone in the account.
//!
//! Failure isolation is uniform: a failed call is counted and reported, and
//! every remaining call — in the same zone, the same tag chunk loop, or a
//! sibling batch — is still attempted. Only configuration errors abort
//! before work begins.

use futures::future::join_all;
use tracing::debug;

use crate::batch::{chunked, run_batches, BatchReport};
use crate::client::{CdnClient, KV_DELETE_BATCH_SIZE, PURGE_TAG_LIMIT};
use crate::resolver::{resolve, Resolution, ResolveRequest, ZoneAssignment, ZoneIndex};
use crate::tags::{collect_by_tag, TagMatches};
use crate::types::{PurgeRequest, Summary, Zone};
use crate::{Error, Result};

/// What to purge, as collected from the command line.
#[derive(Debug, Clone, Default)]
pub struct PurgeOptions {
    /// Explicit zone names or ids.
    pub zones: Vec<String>,
    /// Hosts to purge, assigned to zones by suffix match.
    pub hosts: Vec<String>,
    /// URLs to purge, assigned to zones by containment match.
    pub urls: Vec<String>,
    /// Cache tags to purge from every target zone.
    pub tags: Vec<String>,
    /// Target every zone in the account.
    pub all: bool,
    /// Purge entire zone caches instead of selective content.
    pub everything: bool,
}

impl PurgeOptions {
    fn is_unscoped(&self) -> bool {
        self.zones.is_empty()
            && !self.all
            && self.hosts.is_empty()
            && self.urls.is_empty()
            && self.tags.is_empty()
    }
}

/// The result of one purge call against one zone, for operator display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneOutcome {
    /// Zone name the call targeted.
    pub zone: String,
    /// Whether the call succeeded.
    pub ok: bool,
    /// Human-readable description of what happened.
    pub detail: String,
}

impl ZoneOutcome {
    fn ok(zone: &Zone, detail: String) -> Self {
        Self {
            zone: zone.name.clone(),
            ok: true,
            detail,
        }
    }

    fn failed(zone: &Zone, detail: String) -> Self {
        Self {
            zone: zone.name.clone(),
            ok: false,
            detail,
        }
    }
}

/// Aggregate result of a cache purge run.
#[derive(Debug, Clone, Default)]
pub struct PurgeReport {
    /// Success/failure counts across every purge call.
    pub summary: Summary,
    /// One entry per purge call, grouped by zone in target order.
    pub outcomes: Vec<ZoneOutcome>,
    /// Resolution warnings (unknown zones, unmatched hosts/URLs).
    pub warnings: Vec<String>,
}

/// Resolve target zones and purge them.
///
/// Fails fast (before any purge call) when nothing selects a target: no
/// zone arguments, no `--all`, and no hosts/URLs/tags — or when resolution
/// produces an empty target set.
pub async fn run_cache_purge<C>(client: &C, options: &PurgeOptions) -> Result<PurgeReport>
where
    C: CdnClient + ?Sized,
{
    if options.is_unscoped() {
        return Err(Error::Config(
            "specify at least one zone, use --all, or provide hosts/urls/tags".to_string(),
        ));
    }

    let zones = client.list_zones().await?;
    let index = ZoneIndex::new(zones);
    let Resolution {
        targets,
        assignments,
        warnings,
    } = resolve(
        &index,
        &ResolveRequest {
            zone_args: &options.zones,
            hosts: &options.hosts,
            urls: &options.urls,
            tags: &options.tags,
            all: options.all,
        },
    );

    for warning in &warnings {
        debug!("{warning}");
    }

    if targets.is_empty() {
        let mut message = "no target zones resolved".to_string();
        if !warnings.is_empty() {
            message = format!("{message} ({})", warnings.join("; "));
        }
        return Err(Error::Config(message));
    }

    let tasks = targets.iter().map(|zone| {
        purge_zone(
            client,
            zone,
            assignments.get(&zone.name),
            options.everything,
        )
    });
    let results = join_all(tasks).await;

    let mut report = PurgeReport {
        warnings,
        ..PurgeReport::default()
    };
    for (summary, outcomes) in results {
        report.summary.merge(summary);
        report.outcomes.extend(outcomes);
    }
    Ok(report)
}

/// Purge one zone: a single purge-all call, or one call per payload kind
/// (hosts, URLs, then tag chunks of [`PURGE_TAG_LIMIT`]). A zone with no
/// assigned payload issues no call at all and contributes nothing to the
/// summary. A failed tag chunk does not abort the remaining chunks.
async fn purge_zone<C>(
    client: &C,
    zone: &Zone,
    assignment: Option<&ZoneAssignment>,
    everything: bool,
) -> (Summary, Vec<ZoneOutcome>)
where
    C: CdnClient + ?Sized,
{
    let mut summary = Summary::default();
    let mut outcomes = Vec::new();

    if everything {
        match client.purge_everything(&zone.id).await {
            Ok(()) => {
                summary.record_success();
                outcomes.push(ZoneOutcome::ok(
                    zone,
                    format!("purged everything from {}", zone.name),
                ));
            },
            Err(err) => {
                summary.record_failure();
                outcomes.push(ZoneOutcome::failed(
                    zone,
                    format!("failed to purge everything from {}: {err}", zone.name),
                ));
            },
        }
        return (summary, outcomes);
    }

    let Some(assignment) = assignment else {
        return (summary, outcomes);
    };
    if assignment.is_empty() {
        return (summary, outcomes);
    }

    if !assignment.hosts.is_empty() {
        let request = PurgeRequest::hosts(assignment.hosts.clone());
        record_call(
            client.purge_cache(&zone.id, &request).await,
            zone,
            &format!("hosts from {}: {}", zone.name, assignment.hosts.join(", ")),
            &mut summary,
            &mut outcomes,
        );
    }

    if !assignment.urls.is_empty() {
        let request = PurgeRequest::files(assignment.urls.clone());
        record_call(
            client.purge_cache(&zone.id, &request).await,
            zone,
            &format!("URLs from {}: {}", zone.name, assignment.urls.join(", ")),
            &mut summary,
            &mut outcomes,
        );
    }

    for chunk in chunked(assignment.tags.clone(), PURGE_TAG_LIMIT) {
        let request = PurgeRequest::tags(chunk.clone());
        record_call(
            client.purge_cache(&zone.id, &request).await,
            zone,
            &format!("tags from {}: {}", zone.name, chunk.join(", ")),
            &mut summary,
            &mut outcomes,
        );
    }

    (summary, outcomes)
}

fn record_call(
    result: Result<()>,
    zone: &Zone,
    what: &str,
    summary: &mut Summary,
    outcomes: &mut Vec<ZoneOutcome>,
) {
    match result {
        Ok(()) => {
            summary.record_success();
            outcomes.push(ZoneOutcome::ok(zone, format!("purged {what}")));
        },
        Err(err) => {
            summary.record_failure();
            outcomes.push(ZoneOutcome::failed(
                zone,
                format!("failed to purge {what}: {err}"),
            ));
        },
    }
}

/// Options for the tag-driven KV deletion pass.
#[derive(Debug, Clone, Default)]
pub struct KvDeleteOptions {
    /// Namespace ids to process.
    pub namespaces: Vec<String>,
    /// Process every namespace in the account instead.
    pub all_namespaces: bool,
    /// Cache-tag substring selecting the entries to delete.
    pub tag: String,
    /// Preview matches without deleting anything.
    pub dry_run: bool,
}

/// Per-namespace result of a KV deletion pass.
#[derive(Debug, Clone, Default)]
pub struct NamespaceOutcome {
    /// The namespace id.
    pub namespace: String,
    /// Entries whose cache tag matched the filter.
    pub matches: TagMatches,
    /// Deletion counts; empty on dry runs and when nothing matched.
    pub deletion: BatchReport,
    /// Set when the namespace's key listing itself failed.
    pub error: Option<String>,
}

/// Aggregate result of a KV deletion pass.
#[derive(Debug, Clone, Default)]
pub struct KvDeleteReport {
    /// One entry per processed namespace, in input order.
    pub outcomes: Vec<NamespaceOutcome>,
    /// Every match across all namespaces, for previews and tag purging.
    pub matches: TagMatches,
    /// Deletion counts; listing failures count as failed operations so the
    /// exit code reflects them.
    pub summary: Summary,
    /// Warnings from failed deletions and listings.
    pub warnings: Vec<String>,
    /// Whether this was a preview run.
    pub dry_run: bool,
}

/// Aggregate result of the combined KV delete + cache purge workflow.
#[derive(Debug, Clone, Default)]
pub struct KvPurgeReport {
    /// The deletion pass.
    pub delete: KvDeleteReport,
    /// One entry per tag purge call, grouped by zone.
    pub purge_outcomes: Vec<ZoneOutcome>,
    /// Problems in the purge phase itself (e.g. the zone listing failed).
    pub warnings: Vec<String>,
    /// Combined counts: deletions plus tag purge calls.
    pub summary: Summary,
}

/// Delete KV entries matching a cache tag across the requested namespaces.
pub async fn run_kv_delete<C>(client: &C, options: &KvDeleteOptions) -> Result<KvDeleteReport>
where
    C: CdnClient + ?Sized,
{
    if options.tag.is_empty() {
        return Err(Error::Config(
            "a cache tag is required for deletion".to_string(),
        ));
    }
    let namespace_ids = resolve_namespaces(client, &options.namespaces, options.all_namespaces)
        .await?;
    Ok(sweep_namespaces(client, &namespace_ids, &options.tag, options.dry_run).await)
}

/// Delete matching KV entries, then purge their deduplicated cache tags
/// across every zone in the account.
///
/// Dry runs exercise all of the matching logic — the reported key and tag
/// sets are exactly what a real run would act on — but issue no delete or
/// purge call.
pub async fn run_kv_purge<C>(client: &C, options: &KvDeleteOptions) -> Result<KvPurgeReport>
where
    C: CdnClient + ?Sized,
{
    let delete = run_kv_delete(client, options).await?;
    let mut report = KvPurgeReport {
        summary: delete.summary,
        delete,
        purge_outcomes: Vec::new(),
        warnings: Vec::new(),
    };

    if options.dry_run || report.delete.matches.is_empty() {
        return Ok(report);
    }

    let tags = report.delete.matches.unique_tags();
    match client.list_zones().await {
        Ok(zones) => {
            let (purge_summary, outcomes) = purge_tags_across_zones(client, &zones, &tags).await;
            report.summary.merge(purge_summary);
            report.purge_outcomes = outcomes;
        },
        Err(err) => {
            // The deletions already happened; surface the skipped purge as a
            // counted failure rather than aborting.
            debug!("failed to list zones for cache purge: {err}");
            report.summary.record_failure();
            report
                .warnings
                .push(format!("failed to list zones for cache purge: {err}"));
        },
    }

    Ok(report)
}

async fn resolve_namespaces<C>(
    client: &C,
    namespaces: &[String],
    all_namespaces: bool,
) -> Result<Vec<String>>
where
    C: CdnClient + ?Sized,
{
    match (namespaces.is_empty(), all_namespaces) {
        (false, true) => Err(Error::Config(
            "--namespace and --all-namespaces are mutually exclusive".to_string(),
        )),
        (true, false) => Err(Error::Config(
            "either a namespace ID or --all-namespaces is required".to_string(),
        )),
        (false, false) => Ok(namespaces.to_vec()),
        (true, true) => {
            let all = client.list_kv_namespaces().await?;
            if all.is_empty() {
                return Err(Error::NotFound(
                    "no KV namespaces found in account".to_string(),
                ));
            }
            Ok(all.into_iter().map(|ns| ns.id).collect())
        },
    }
}

async fn sweep_namespaces<C>(
    client: &C,
    namespace_ids: &[String],
    tag: &str,
    dry_run: bool,
) -> KvDeleteReport
where
    C: CdnClient + ?Sized,
{
    let mut report = KvDeleteReport {
        dry_run,
        ..KvDeleteReport::default()
    };

    // Namespaces are processed in order; concurrency lives inside the
    // per-namespace deletion batches.
    for namespace in namespace_ids {
        let keys = match client.list_all_kv_keys(namespace, None).await {
            Ok(keys) => keys,
            Err(err) => {
                let warning = format!("failed to list keys in namespace {namespace}: {err}");
                debug!("{warning}");
                report.summary.record_failure();
                report.warnings.push(warning.clone());
                report.outcomes.push(NamespaceOutcome {
                    namespace: namespace.clone(),
                    error: Some(warning),
                    ..NamespaceOutcome::default()
                });
                continue;
            },
        };

        let matches = collect_by_tag(&keys, tag);
        let mut outcome = NamespaceOutcome {
            namespace: namespace.clone(),
            matches: matches.clone(),
            ..NamespaceOutcome::default()
        };

        if !dry_run && !matches.is_empty() {
            let deletion = run_batches(matches.keys(), KV_DELETE_BATCH_SIZE, |key| async move {
                client
                    .delete_kv_entry(namespace, &key)
                    .await
                    .map_err(|err| {
                        format!("failed to delete key '{key}' in namespace {namespace}: {err}")
                    })
            })
            .await;
            report.summary.merge(deletion.summary());
            report.warnings.extend(deletion.warnings.clone());
            outcome.deletion = deletion;
        }

        report.matches.extend(matches);
        report.outcomes.push(outcome);
    }

    report
}

/// Purge `tags` from every given zone, [`PURGE_TAG_LIMIT`] tags per call,
/// one concurrent task per zone. Chunk failures are isolated.
async fn purge_tags_across_zones<C>(
    client: &C,
    zones: &[Zone],
    tags: &[String],
) -> (Summary, Vec<ZoneOutcome>)
where
    C: CdnClient + ?Sized,
{
    let chunks: Vec<Vec<String>> = chunked(tags.to_vec(), PURGE_TAG_LIMIT);

    let tasks = zones.iter().map(|zone| {
        let chunks = &chunks;
        async move {
            let mut summary = Summary::default();
            let mut outcomes = Vec::new();
            for chunk in chunks {
                let request = PurgeRequest::tags(chunk.clone());
                record_call(
                    client.purge_cache(&zone.id, &request).await,
                    zone,
                    &format!("{} tag(s) from {}", chunk.len(), zone.name),
                    &mut summary,
                    &mut outcomes,
                );
            }
            (summary, outcomes)
        }
    });

    let mut summary = Summary::default();
    let mut outcomes = Vec::new();
    for (zone_summary, zone_outcomes) in join_all(tasks).await {
        summary.merge(zone_summary);
        outcomes.extend(zone_outcomes);
    }
    (summary, outcomes)
}
