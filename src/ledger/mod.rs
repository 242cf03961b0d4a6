//! Version bookkeeping
//!
//! Shared by both persistence variants:
//! - [`VersionLedger`]: append-only version → root list (full persistence)
//! - [`VersionClock`]: one global monotonic counter (partial persistence)
//! - [`Timeline`]: per-node version → value history with predecessor lookup

mod timeline;

pub use timeline::Timeline;

use crate::TreeError;

/// Version number; 0 is the state produced by construction
pub type Version = usize;

/// Append-only list of roots, indexed by version
#[derive(Debug, Clone)]
pub struct VersionLedger<R> {
    roots: Vec<R>,
}

impl<R: Copy> VersionLedger<R> {
    /// Ledger whose version 0 is `initial`
    pub fn new(initial: R) -> Self {
        Self {
            roots: vec![initial],
        }
    }

    /// Record a new root and return its version.
    pub fn push(&mut self, root: R) -> Version {
        self.roots.push(root);
        self.last_version()
    }

    /// Root of `version`
    pub fn get(&self, version: Version) -> Result<R, TreeError> {
        self.roots
            .get(version)
            .copied()
            .ok_or(TreeError::UnknownVersion {
                version,
                latest: self.last_version(),
            })
    }

    /// Most recently appended version
    pub fn last_version(&self) -> Version {
        self.roots.len() - 1
    }

    /// Number of versions (never zero)
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Always false: version 0 exists from construction
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

/// Global monotonic version counter
#[derive(Debug, Clone, Default)]
pub struct VersionClock {
    current: Version,
}

impl VersionClock {
    /// Clock at version 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance and return the new version.
    pub fn tick(&mut self) -> Version {
        self.current += 1;
        self.current
    }

    /// Latest issued version
    pub fn current(&self) -> Version {
        self.current
    }
}
