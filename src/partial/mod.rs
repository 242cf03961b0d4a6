//! Partial persistence via per-node timelines
//!
//! One mutable tree shape; each node keeps an append-only
//! [`Timeline`] of its aggregate keyed by global version. A point update
//! takes the next version from a single [`VersionClock`] and appends one
//! entry to every node on the root-to-leaf path. Nodes off the path keep
//! reporting their last recorded value.
//!
//! Only the latest state is writable; every version is readable.

use tracing::{debug, trace};

use crate::{
    algebra::Operators,
    fail_fast,
    ledger::{Timeline, Version, VersionClock},
    tree::{left_child, right_child, validate_span, Span},
    TreeConfig, TreeError,
};

#[derive(Debug, Clone)]
struct TimelineNode<V> {
    span: Span,
    timeline: Timeline<V>,
}

/// Point-update tree whose every past state stays queryable
#[derive(Debug, Clone)]
pub struct PartialTree<V, O> {
    ops: O,
    slots: Vec<Option<TimelineNode<V>>>,
    clock: VersionClock,
    config: TreeConfig,
}

impl<V: Clone, O: Operators<V>> PartialTree<V, O> {
    /// Build over `values`; the build state is version 0.
    pub fn new(values: Vec<V>, ops: O) -> Result<Self, TreeError> {
        let config = TreeConfig::for_len(values.len())?;
        Self::with_config(values, ops, config)
    }

    /// Build with an explicit configuration.
    ///
    /// Only `len` and `verbose` are honored: the slots always use the
    /// compact layout and `node_capacity` is ignored, since the node count
    /// is fixed at build time.
    pub fn with_config(values: Vec<V>, ops: O, config: TreeConfig) -> Result<Self, TreeError> {
        if values.is_empty() {
            return Err(TreeError::EmptyInput);
        }
        if values.len() != config.len {
            return Err(TreeError::LengthMismatch {
                expected: config.len,
                actual: values.len(),
            });
        }

        let mut leaves: Vec<Option<V>> = values.into_iter().map(Some).collect();
        let mut tree = Self {
            ops,
            slots: (0..4 * config.len).map(|_| None).collect(),
            clock: VersionClock::new(),
            config,
        };
        tree.build(0, Span::root(tree.config.len), &mut leaves);

        debug!(len = tree.config.len, "built partially persistent tree");
        Ok(tree)
    }

    fn build(&mut self, slot: usize, span: Span, leaves: &mut [Option<V>]) {
        let aggregate = if span.is_leaf() {
            leaves[span.lo].take()
        } else {
            let (left, right) = span.children();
            self.build(left_child(slot), left, leaves);
            self.build(right_child(slot), right, leaves);
            self.ops
                .combine(self.latest(left_child(slot)), self.latest(right_child(slot)))
        };

        self.slots[slot] = Some(TimelineNode {
            span,
            timeline: Timeline::starting_at(0, aggregate),
        });
    }

    /// Number of positions N
    pub fn len(&self) -> usize {
        self.config.len
    }

    /// Always false: construction rejects empty input
    pub fn is_empty(&self) -> bool {
        self.config.len == 0
    }

    /// Configuration the tree was built with
    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Most recently issued version (0 = initial build)
    pub fn last_version(&self) -> Version {
        self.clock.current()
    }

    /// Fold `value` into `position` via `compose`; returns the new version.
    ///
    /// Panics if `position` is out of range.
    pub fn update(&mut self, position: usize, value: V) -> Version {
        fail_fast(self.checked_update(position, value))
    }

    /// Point update reporting out-of-range positions as errors.
    pub fn checked_update(&mut self, position: usize, value: V) -> Result<Version, TreeError> {
        if position >= self.len() {
            return Err(TreeError::PositionOutOfRange {
                position,
                len: self.len(),
            });
        }

        let version = self.clock.tick();
        self.update_slot(0, position, &value, version);

        if self.config.verbose {
            debug!(position, version, "recorded point update");
        } else {
            trace!(position, version, "recorded point update");
        }
        Ok(version)
    }

    /// Range-shaped update: `l > r` is a no-op, `l != r` is rejected.
    pub fn checked_update_range(
        &mut self,
        l: usize,
        r: usize,
        value: V,
    ) -> Result<Option<Version>, TreeError> {
        if l > r {
            return Ok(None);
        }
        if l != r {
            return Err(TreeError::PointUpdateOnly { l, r });
        }
        self.checked_update(l, value).map(Some)
    }

    /// Aggregate over `[l, r]` in the latest state.
    pub fn query(&self, l: usize, r: usize) -> Option<V> {
        self.query_at(Version::MAX, l, r)
    }

    /// Aggregate over `[l, r]` as of `version`.
    ///
    /// [`Version::MAX`] reads the latest state.
    /// Panics if `r` is out of range or `version` was never issued.
    pub fn query_at(&self, version: Version, l: usize, r: usize) -> Option<V> {
        fail_fast(self.checked_query_at(version, l, r))
    }

    /// Versioned query reporting unknown versions and bad positions as errors.
    pub fn checked_query_at(
        &self,
        version: Version,
        l: usize,
        r: usize,
    ) -> Result<Option<V>, TreeError> {
        let latest = self.last_version();
        if version > latest && version != Version::MAX {
            return Err(TreeError::UnknownVersion { version, latest });
        }
        if validate_span(l, r, self.len())?.is_none() {
            return Ok(None);
        }
        Ok(self.query_slot(0, l, r, version))
    }

    /// Value at `position` as of `version`
    pub fn get_at(&self, version: Version, position: usize) -> Option<V> {
        self.query_at(version, position, position)
    }

    /// Number of timeline entries recorded at `position`'s leaf
    pub fn timeline_len(&self, position: usize) -> usize {
        let mut slot = 0;
        while let Some(node) = self.node(slot) {
            if node.span.is_leaf() {
                return node.timeline.len();
            }
            let (left, _) = node.span.children();
            slot = if left.contains(position) {
                left_child(slot)
            } else {
                right_child(slot)
            };
        }
        0
    }

    fn update_slot(&mut self, slot: usize, position: usize, value: &V, version: Version) {
        let Some(span) = self.node(slot).map(|node| node.span) else {
            return;
        };

        let next = if span.is_leaf() {
            Some(self.ops.compose(self.latest(slot), value.clone()))
        } else {
            let (left, _) = span.children();
            if left.contains(position) {
                self.update_slot(left_child(slot), position, value, version);
            } else {
                self.update_slot(right_child(slot), position, value, version);
            }
            self.ops
                .combine(self.latest(left_child(slot)), self.latest(right_child(slot)))
        };

        if let Some(node) = self.slots.get_mut(slot).and_then(Option::as_mut) {
            node.timeline.record(version, next);
        }
    }

    fn query_slot(&self, slot: usize, l: usize, r: usize, version: Version) -> Option<V> {
        if l > r {
            return None;
        }
        let node = self.node(slot)?;
        if node.span.matches(l, r) {
            return node.timeline.at(version);
        }

        let ((ll, lr), (rl, rr)) = node.span.clip(l, r);
        self.ops.combine(
            self.query_slot(left_child(slot), ll, lr, version),
            self.query_slot(right_child(slot), rl, rr, version),
        )
    }

    fn node(&self, slot: usize) -> Option<&TimelineNode<V>> {
        self.slots.get(slot)?.as_ref()
    }

    fn latest(&self, slot: usize) -> Option<V> {
        self.node(slot)?.timeline.latest()
    }
}
