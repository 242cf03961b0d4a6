//! Full persistence via path copying
//!
//! Nodes live in an append-only arena addressed by [`NodeId`]. An update
//! clones every node it visits into a fresh slot and links the clones into
//! a new root; untouched subtrees are shared by id between versions.
//! Published nodes are never written again.
//!
//! Two read paths:
//! - [`PersistentTree::query`]: read-only, folds each node's pending tag
//!   into the partial result on the way back up
//! - [`PersistentTree::query_materialized`]: pushes pending tags during the
//!   read by copy-on-write and caches the pushed clone, so later reads of
//!   the same version skip the work. `roots[version]` is never replaced.

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::{
    algebra::Operators,
    fail_fast,
    ledger::{Version, VersionLedger},
    tree::{validate_span, Span},
    TreeConfig, TreeError,
};

/// Arena slot of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct Node<V> {
    span: Span,
    aggregate: Option<V>,
    pending: Option<V>,
    left: Option<NodeId>,
    right: Option<NodeId>,
}

impl<V> Node<V> {
    /// Node synthesized on first touch (sparse domains)
    fn empty(span: Span) -> Self {
        Self {
            span,
            aggregate: None,
            pending: None,
            left: None,
            right: None,
        }
    }
}

/// Fully persistent lazy tree; every update returns a new version
#[derive(Debug, Clone)]
pub struct PersistentTree<V, O> {
    ops: O,
    arena: Vec<Node<V>>,
    versions: VersionLedger<NodeId>,
    /// Original node → clone with its pending tag pushed
    materialized: FxHashMap<NodeId, NodeId>,
    config: TreeConfig,
}

impl<V: Clone, O: Operators<V>> PersistentTree<V, O> {
    /// Build version 0 over `values`.
    pub fn new(values: Vec<V>, ops: O) -> Result<Self, TreeError> {
        let config = TreeConfig::for_len(values.len())?;
        Self::with_config(values, ops, config)
    }

    /// Build version 0 over `values` with an explicit configuration.
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

        let mut tree = Self::empty_arena(ops, config);
        let mut leaves: Vec<Option<V>> = values.into_iter().map(Some).collect();
        let root = tree.build(Span::root(tree.config.len), &mut leaves);
        tree.versions = VersionLedger::new(root);

        debug!(len = tree.config.len, nodes = tree.arena.len(), "built persistent tree");
        Ok(tree)
    }

    /// Version 0 over `len` unpopulated positions; nodes appear on first touch.
    pub fn sparse(len: usize, ops: O) -> Result<Self, TreeError> {
        Self::sparse_with_config(ops, TreeConfig::for_len(len)?)
    }

    /// Sparse construction with an explicit configuration.
    pub fn sparse_with_config(ops: O, config: TreeConfig) -> Result<Self, TreeError> {
        if config.len == 0 {
            return Err(TreeError::EmptyInput);
        }
        let mut tree = Self::empty_arena(ops, config);
        let root = tree.alloc(Node::empty(Span::root(tree.config.len)));
        tree.versions = VersionLedger::new(root);

        debug!(len = tree.config.len, "built sparse persistent tree");
        Ok(tree)
    }

    fn empty_arena(ops: O, config: TreeConfig) -> Self {
        Self {
            ops,
            arena: Vec::with_capacity(config.node_capacity),
            versions: VersionLedger::new(NodeId(0)),
            materialized: FxHashMap::default(),
            config,
        }
    }

    fn build(&mut self, span: Span, leaves: &mut [Option<V>]) -> NodeId {
        if span.is_leaf() {
            let mut node = Node::empty(span);
            node.aggregate = leaves[span.lo].take();
            return self.alloc(node);
        }

        let (left_span, right_span) = span.children();
        let left = self.build(left_span, leaves);
        let right = self.build(right_span, leaves);
        let aggregate = self
            .ops
            .combine(self.aggregate_of(Some(left)), self.aggregate_of(Some(right)));

        self.alloc(Node {
            span,
            aggregate,
            pending: None,
            left: Some(left),
            right: Some(right),
        })
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

    /// Most recently created version (0 = initial build)
    pub fn last_version(&self) -> Version {
        self.versions.last_version()
    }

    /// Number of versions, including version 0
    pub fn version_count(&self) -> usize {
        self.versions.len()
    }

    /// Nodes allocated across all versions
    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    /// Nodes whose pending tag has been pushed by a materializing read
    pub fn materialized_count(&self) -> usize {
        self.materialized.len()
    }

    /// Root node of `version`
    pub fn root(&self, version: Version) -> Result<NodeId, TreeError> {
        self.versions.get(version)
    }

    /// Apply `value` over `[l, r]` on top of `version`; returns the new version.
    ///
    /// An empty range still appends a version sharing the parent's root.
    /// Panics on an unknown version or out-of-range position.
    pub fn update(&mut self, version: Version, l: usize, r: usize, value: V) -> Version {
        fail_fast(self.checked_update(version, l, r, value))
    }

    /// Range update reporting unknown versions and bad positions as errors.
    pub fn checked_update(
        &mut self,
        version: Version,
        l: usize,
        r: usize,
        value: V,
    ) -> Result<Version, TreeError> {
        let root = self.versions.get(version)?;
        let before = self.arena.len();

        let new_root = match validate_span(l, r, self.len())? {
            Some(_) => self
                .update_node(Some(root), Span::root(self.len()), l, r, &value)
                .unwrap_or(root),
            None => root,
        };
        let created = self.versions.push(new_root);

        let allocated = self.arena.len() - before;
        if self.config.verbose {
            debug!(parent = version, version = created, l, r, allocated, "created version");
        } else {
            trace!(parent = version, version = created, l, r, allocated, "created version");
        }
        Ok(created)
    }

    /// Apply `value` over `[l, r]` on top of the latest version.
    pub fn update_latest(&mut self, l: usize, r: usize, value: V) -> Version {
        self.update(self.last_version(), l, r, value)
    }

    /// Aggregate over `[l, r]` as of `version`, without allocating.
    ///
    /// Panics on an unknown version or out-of-range position.
    pub fn query(&self, version: Version, l: usize, r: usize) -> Option<V> {
        fail_fast(self.checked_query(version, l, r))
    }

    /// Read-only query reporting unknown versions and bad positions as errors.
    pub fn checked_query(
        &self,
        version: Version,
        l: usize,
        r: usize,
    ) -> Result<Option<V>, TreeError> {
        let root = self.versions.get(version)?;
        if validate_span(l, r, self.len())?.is_none() {
            return Ok(None);
        }
        Ok(self.query_node(Some(root), l, r))
    }

    /// Aggregate over `[l, r]` as of `version`, materializing pushed tags.
    pub fn query_materialized(&mut self, version: Version, l: usize, r: usize) -> Option<V> {
        fail_fast(self.checked_query_materialized(version, l, r))
    }

    /// Materializing query reporting unknown versions and bad positions as errors.
    pub fn checked_query_materialized(
        &mut self,
        version: Version,
        l: usize,
        r: usize,
    ) -> Result<Option<V>, TreeError> {
        let root = self.versions.get(version)?;
        if validate_span(l, r, self.len())?.is_none() {
            return Ok(None);
        }
        Ok(self.query_cached(Some(root), l, r))
    }

    /// Value at `position` as of `version`
    pub fn get(&self, version: Version, position: usize) -> Option<V> {
        self.query(version, position, position)
    }

    /// Every node reachable from `version`'s root
    pub fn reachable_nodes(&self, version: Version) -> Result<Vec<NodeId>, TreeError> {
        let mut stack = vec![self.versions.get(version)?];
        let mut seen = Vec::new();
        while let Some(id) = stack.pop() {
            seen.push(id);
            let node = self.node(id);
            stack.extend(node.left);
            stack.extend(node.right);
        }
        seen.sort_unstable();
        Ok(seen)
    }

    /// Copy-on-write descent; returns the clone that replaces `id`.
    ///
    /// Empty ranges leave the child untouched and shared.
    fn update_node(
        &mut self,
        id: Option<NodeId>,
        span: Span,
        l: usize,
        r: usize,
        tag: &V,
    ) -> Option<NodeId> {
        if l > r {
            return id;
        }
        let mut fresh = match id {
            Some(id) => self.node(self.resolve(id)).clone(),
            None => Node::empty(span),
        };

        if span.matches(l, r) {
            self.apply_to(&mut fresh, tag.clone());
            return Some(self.alloc(fresh));
        }

        // only the clone loses its tag; the original keeps it for older versions
        if let Some(pending) = fresh.pending.take() {
            self.push_into(&mut fresh, &pending);
        }

        let (left_span, right_span) = span.children();
        let ((ll, lr), (rl, rr)) = span.clip(l, r);
        fresh.left = self.update_node(fresh.left, left_span, ll, lr, tag);
        fresh.right = self.update_node(fresh.right, right_span, rl, rr, tag);
        fresh.aggregate = self
            .ops
            .combine(self.aggregate_of(fresh.left), self.aggregate_of(fresh.right));

        Some(self.alloc(fresh))
    }

    /// Push `pending` into both children of `node` through the copy-on-write path.
    fn push_into(&mut self, node: &mut Node<V>, pending: &V) {
        let (left_span, right_span) = node.span.children();
        node.left = self.update_node(node.left, left_span, left_span.lo, left_span.hi, pending);
        node.right = self.update_node(node.right, right_span, right_span.lo, right_span.hi, pending);
    }

    fn apply_to(&self, node: &mut Node<V>, tag: V) {
        let Span { lo, hi } = node.span;
        node.aggregate = Some(self.ops.apply(node.aggregate.take(), tag.clone(), lo, hi));
        if !node.span.is_leaf() {
            node.pending = Some(self.ops.compose(node.pending.take(), tag));
        }
    }

    fn query_node(&self, id: Option<NodeId>, l: usize, r: usize) -> Option<V> {
        if l > r {
            return None;
        }
        let node = self.node(id?);
        if node.span.matches(l, r) {
            return node.aggregate.clone();
        }

        let ((ll, lr), (rl, rr)) = node.span.clip(l, r);
        let partial = self
            .ops
            .combine(self.query_node(node.left, ll, lr), self.query_node(node.right, rl, rr));

        // the tag is newer than everything below it
        match &node.pending {
            Some(tag) => Some(self.ops.apply(partial, tag.clone(), l, r)),
            None => partial,
        }
    }

    fn query_cached(&mut self, id: Option<NodeId>, l: usize, r: usize) -> Option<V> {
        if l > r {
            return None;
        }
        let mut id = self.resolve(id?);
        let span = self.node(id).span;
        if span.matches(l, r) {
            return self.node(id).aggregate.clone();
        }
        if self.node(id).pending.is_some() {
            id = self.materialize(id);
        }

        let (left, right) = (self.node(id).left, self.node(id).right);
        let ((ll, lr), (rl, rr)) = span.clip(l, r);
        let left = self.query_cached(left, ll, lr);
        let right = self.query_cached(right, rl, rr);
        self.ops.combine(left, right)
    }

    /// Clone `id` with its pending tag pushed and remember the clone.
    fn materialize(&mut self, id: NodeId) -> NodeId {
        let mut fresh = self.node(id).clone();
        if let Some(pending) = fresh.pending.take() {
            self.push_into(&mut fresh, &pending);
        }
        let clone = self.alloc(fresh);
        self.materialized.insert(id, clone);

        trace!(node = id.0, clone = clone.0, "materialized pending tag");
        clone
    }

    fn resolve(&self, id: NodeId) -> NodeId {
        self.materialized.get(&id).copied().unwrap_or(id)
    }

    fn alloc(&mut self, node: Node<V>) -> NodeId {
        let id = NodeId(self.arena.len());
        self.arena.push(node);
        id
    }

    fn node(&self, id: NodeId) -> &Node<V> {
        &self.arena[id.0]
    }

    fn aggregate_of(&self, id: Option<NodeId>) -> Option<V> {
        id.and_then(|id| self.node(id).aggregate.clone())
    }
}
