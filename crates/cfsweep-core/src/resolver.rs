//! Zone resolution: turning raw zone arguments, hosts, and URLs into a
//! concrete target set with per-zone assignments.
//!
//! The resolver works against a [`ZoneIndex`], an immutable index built once
//! from the zone snapshot fetched at command start. It answers exact lookups
//! (by zone name or id) and best-match queries (which zone does this host or
//! URL belong to), so nothing rebuilds lookup maps per operation.
//!
//! Matching rules:
//!
//! - a host matches a zone when the zone name is a suffix of the host;
//! - a URL matches a zone when the URL contains the zone name anywhere
//!   (deliberate looseness — a path segment that happens to contain a zone
//!   name can mis-assign, see [`ZoneIndex::best_url_match`]);
//! - when several zones match, the one with the longest name wins, so
//!   `api.example.com` resolves to a registered `api.example.com` zone over
//!   its parent `example.com`;
//! - each host/URL is assigned to at most one zone and is never retried
//!   against another.

use std::collections::{BTreeMap, HashMap};

use crate::types::Zone;

/// Immutable lookup structure over the zone snapshot.
#[derive(Debug, Clone)]
pub struct ZoneIndex {
    zones: Vec<Zone>,
    exact: HashMap<String, usize>,
}

impl ZoneIndex {
    /// Build the index from a zone snapshot. Zones are queryable by exact
    /// name, exact id, and host/URL best-match.
    #[must_use]
    pub fn new(zones: Vec<Zone>) -> Self {
        let mut exact = HashMap::with_capacity(zones.len() * 2);
        for (position, zone) in zones.iter().enumerate() {
            exact.insert(zone.name.clone(), position);
            exact.insert(zone.id.clone(), position);
        }
        Self { zones, exact }
    }

    /// All zones, in snapshot order.
    #[must_use]
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// True when the snapshot holds no zones.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Exact lookup by zone name or zone id.
    #[must_use]
    pub fn exact(&self, name_or_id: &str) -> Option<&Zone> {
        self.exact.get(name_or_id).map(|&position| &self.zones[position])
    }

    /// The zone whose name is the longest suffix of `host`, if any.
    #[must_use]
    pub fn best_host_match(&self, host: &str) -> Option<&Zone> {
        best_host_match(&self.zones, host)
    }

    /// The zone whose name is the longest substring of `url`, if any.
    ///
    /// Substring containment rather than proper domain parsing: a URL whose
    /// path happens to contain a zone name (`https://cdn.io/example.com-page`)
    /// will match that zone. Known looseness, kept for parity with host
    /// matching being driven purely by zone names.
    #[must_use]
    pub fn best_url_match(&self, url: &str) -> Option<&Zone> {
        best_url_match(&self.zones, url)
    }
}

fn best_host_match<'z>(zones: &'z [Zone], host: &str) -> Option<&'z Zone> {
    zones
        .iter()
        .filter(|zone| host.ends_with(&zone.name))
        .max_by_key(|zone| zone.name.len())
}

fn best_url_match<'z>(zones: &'z [Zone], url: &str) -> Option<&'z Zone> {
    zones
        .iter()
        .filter(|zone| url.contains(&zone.name))
        .max_by_key(|zone| zone.name.len())
}

/// What the caller asked to resolve.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveRequest<'a> {
    /// Explicit zone names or ids.
    pub zone_args: &'a [String],
    /// Hosts to assign to zones.
    pub hosts: &'a [String],
    /// URLs to assign to zones.
    pub urls: &'a [String],
    /// Cache tags; account-wide, attached to every target zone.
    pub tags: &'a [String],
    /// Target every zone in the account.
    pub all: bool,
}

/// Per-zone accumulator of the hosts, URLs, and tags to purge from it.
///
/// Created lazily the first time something matches the zone; consumed by the
/// orchestrator to build purge payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneAssignment {
    /// The zone this assignment targets.
    pub zone: Zone,
    /// Hosts assigned to this zone.
    pub hosts: Vec<String>,
    /// URLs assigned to this zone.
    pub urls: Vec<String>,
    /// Tags to purge from this zone.
    pub tags: Vec<String>,
}

impl ZoneAssignment {
    fn new(zone: Zone) -> Self {
        Self {
            zone,
            hosts: Vec::new(),
            urls: Vec::new(),
            tags: Vec::new(),
        }
    }

    /// True when the assignment would produce an empty purge payload.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty() && self.urls.is_empty() && self.tags.is_empty()
    }
}

/// The outcome of zone resolution.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Target zones, in snapshot order (explicit-argument order when zones
    /// were named explicitly).
    pub targets: Vec<Zone>,
    /// Per-zone assignments, keyed by zone name.
    pub assignments: BTreeMap<String, ZoneAssignment>,
    /// Non-fatal problems: unknown zone arguments, unmatched hosts/URLs.
    pub warnings: Vec<String>,
}

/// Resolve the target zone set and per-zone assignments.
///
/// Target selection, in priority order: `all` takes every zone; explicit
/// `zone_args` resolve by exact name/id match (unknown arguments warn and
/// are skipped, never fatal); otherwise the targets are exactly the zones
/// that win a host or URL. Hosts and URLs are then assigned to their single
/// best-matching zone *within the target set*; tags attach to every target.
#[must_use]
pub fn resolve(index: &ZoneIndex, request: &ResolveRequest<'_>) -> Resolution {
    let mut warnings = Vec::new();

    let targets: Vec<Zone> = if request.all {
        index.zones().to_vec()
    } else if request.zone_args.is_empty() {
        matched_targets(index, request)
    } else {
        explicit_targets(index, request.zone_args, &mut warnings)
    };

    let mut assignments: BTreeMap<String, ZoneAssignment> = BTreeMap::new();

    for host in request.hosts {
        match best_host_match(&targets, host) {
            Some(zone) => assignment_entry(&mut assignments, zone)
                .hosts
                .push(host.clone()),
            None => warnings.push(format!("no zone matches host '{host}'")),
        }
    }

    for url in request.urls {
        match best_url_match(&targets, url) {
            Some(zone) => assignment_entry(&mut assignments, zone)
                .urls
                .push(url.clone()),
            None => warnings.push(format!("no zone matches URL '{url}'")),
        }
    }

    // Tags are account-wide, not host-scoped: every target gets them.
    if !request.tags.is_empty() {
        for zone in &targets {
            assignment_entry(&mut assignments, zone).tags = request.tags.to_vec();
        }
    }

    Resolution {
        targets,
        assignments,
        warnings,
    }
}

fn assignment_entry<'m>(
    assignments: &'m mut BTreeMap<String, ZoneAssignment>,
    zone: &Zone,
) -> &'m mut ZoneAssignment {
    assignments
        .entry(zone.name.clone())
        .or_insert_with(|| ZoneAssignment::new(zone.clone()))
}

fn explicit_targets(
    index: &ZoneIndex,
    zone_args: &[String],
    warnings: &mut Vec<String>,
) -> Vec<Zone> {
    let mut targets: Vec<Zone> = Vec::with_capacity(zone_args.len());
    for arg in zone_args {
        match index.exact(arg) {
            Some(zone) => {
                // The same zone can be named twice (by name and by id).
                if !targets.iter().any(|t| t.id == zone.id) {
                    targets.push(zone.clone());
                }
            },
            None => warnings.push(format!("zone '{arg}' not found")),
        }
    }
    targets
}

/// Targets for the hosts/URLs-only path: the zones that win at least one
/// host or URL, in snapshot order. Warnings for unmatched items are emitted
/// by the assignment pass, not here.
fn matched_targets(index: &ZoneIndex, request: &ResolveRequest<'_>) -> Vec<Zone> {
    let zones = index.zones();
    let mut matched: Vec<bool> = vec![false; zones.len()];

    for host in request.hosts {
        if let Some(winner) = best_host_match(zones, host) {
            if let Some(position) = zones.iter().position(|z| z.id == winner.id) {
                matched[position] = true;
            }
        }
    }
    for url in request.urls {
        if let Some(winner) = best_url_match(zones, url) {
            if let Some(position) = zones.iter().position(|z| z.id == winner.id) {
                matched[position] = true;
            }
        }
    }

    zones
        .iter()
        .zip(matched)
        .filter_map(|(zone, hit)| hit.then(|| zone.clone()))
        .collect()
}
