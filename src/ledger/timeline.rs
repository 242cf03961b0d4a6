//! Per-node value history
//!
//! Ordered map version → value. A lookup for version V returns the value
//! recorded at the largest key ≤ V ("last write wins until superseded").

use std::collections::BTreeMap;

use super::Version;

/// Append-only history of one node's aggregate
#[derive(Debug, Clone)]
pub struct Timeline<V> {
    entries: BTreeMap<Version, Option<V>>,
}

impl<V: Clone> Timeline<V> {
    /// Timeline whose first entry is `value` at `version`
    pub fn starting_at(version: Version, value: Option<V>) -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(version, value);
        Self { entries }
    }

    /// Append `value` at `version`.
    ///
    /// Keys must be strictly increasing.
    pub fn record(&mut self, version: Version, value: Option<V>) {
        debug_assert!(
            self.last_version().map_or(true, |last| version > last),
            "timeline version {version} not after {:?}",
            self.last_version()
        );
        self.entries.insert(version, value);
    }

    /// Value current at `version`; `None` if `version` precedes the first entry
    pub fn at(&self, version: Version) -> Option<V> {
        self.entries
            .range(..=version)
            .next_back()
            .and_then(|(_, value)| value.clone())
    }

    /// Most recently recorded value
    pub fn latest(&self) -> Option<V> {
        self.entries
            .last_key_value()
            .and_then(|(_, value)| value.clone())
    }

    /// Version of the most recent entry
    pub fn last_version(&self) -> Option<Version> {
        self.entries.keys().next_back().copied()
    }

    /// Number of recorded entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
