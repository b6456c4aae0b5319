//! Cache-tag collection from KV entry metadata.
//!
//! Stored entries carry their cache tag in a `cache-tag` metadata field.
//! [`collect_by_tag`] scans a key listing and selects every entry whose tag
//! *contains* the filter as a substring — deliberately loose so a filter of
//! `product-123` also catches composite tags like `product-123-variant`.
//! Entries without metadata, or without the field, are untagged content and
//! are skipped silently.

use std::collections::HashSet;

use crate::types::KvKey;

/// Metadata field holding an entry's cache tag.
pub const CACHE_TAG_FIELD: &str = "cache-tag";

/// A single matched entry: its key name and the raw tag value it carried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagMatch {
    /// The KV key name.
    pub key: String,
    /// The raw `cache-tag` value on that key.
    pub tag: String,
}

/// Ordered collection of matched entries, accumulated across namespaces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagMatches {
    matches: Vec<TagMatch>,
}

impl TagMatches {
    /// Number of matched entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    /// True when nothing matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Iterate the matches in collection order.
    pub fn iter(&self) -> impl Iterator<Item = &TagMatch> {
        self.matches.iter()
    }

    /// The matched key names, in collection order.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.matches.iter().map(|m| m.key.clone()).collect()
    }

    /// The matched tag values deduplicated, preserving first-seen order.
    ///
    /// Many keys share a tag; purging each tag once is enough.
    #[must_use]
    pub fn unique_tags(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.matches
            .iter()
            .filter(|m| seen.insert(m.tag.as_str()))
            .map(|m| m.tag.clone())
            .collect()
    }

    /// Append another collection (e.g. from the next namespace).
    pub fn extend(&mut self, other: Self) {
        self.matches.extend(other.matches);
    }
}

impl FromIterator<TagMatch> for TagMatches {
    fn from_iter<I: IntoIterator<Item = TagMatch>>(iter: I) -> Self {
        Self {
            matches: iter.into_iter().collect(),
        }
    }
}

/// Select every entry whose `cache-tag` metadata contains `filter`.
#[must_use]
pub fn collect_by_tag(keys: &[KvKey], filter: &str) -> TagMatches {
    keys.iter()
        .filter_map(|entry| {
            let tag = entry.metadata.as_ref()?.get(CACHE_TAG_FIELD)?.as_str()?;
            tag.contains(filter).then(|| TagMatch {
                key: entry.name.clone(),
                tag: tag.to_string(),
            })
        })
        .collect()
}
