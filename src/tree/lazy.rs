//! Lazy-propagating static tree
//!
//! Range updates stop at the first node whose span equals the requested
//! range, fold the tag into that node's aggregate via `expand` and park it
//! in `pending`. Any later descent past the node pushes the tag down first.

use tracing::{debug, trace};

use super::{left_child, right_child, validate_span, Layout, Span};
use crate::{algebra::Operators, fail_fast, TreeConfig, TreeError};

/// One array slot: span identity, aggregate, deferred tag
#[derive(Debug, Clone)]
struct Slot<V> {
    span: Span,
    aggregate: Option<V>,
    /// Never set on leaves
    pending: Option<V>,
}

/// Mutable lazy-propagation tree over a dense slot array
///
/// Single writer: queries also push pending tags, so both reads and
/// writes take `&mut self`.
#[derive(Debug, Clone)]
pub struct StaticTree<V, O> {
    ops: O,
    slots: Vec<Option<Slot<V>>>,
    config: TreeConfig,
}

impl<V: Clone, O: Operators<V>> StaticTree<V, O> {
    /// Build over `values` with the compact `4N` layout.
    pub fn new(values: Vec<V>, ops: O) -> Result<Self, TreeError> {
        let config = TreeConfig::for_len(values.len())?;
        Self::with_config(values, ops, config)
    }

    /// Build over `values` with an explicit configuration.
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

        let padded = config.padded_len();
        let mut leaves: Vec<Option<V>> = values.into_iter().map(Some).collect();
        leaves.resize_with(padded, || None);

        let mut tree = Self {
            ops,
            slots: (0..config.slot_count()).map(|_| None).collect(),
            config,
        };
        tree.build(0, Span::root(padded), &mut leaves);

        debug!(
            len = tree.config.len,
            slots = tree.slots.len(),
            layout = ?tree.config.layout,
            "built static tree"
        );
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
                .combine(self.aggregate(left_child(slot)), self.aggregate(right_child(slot)))
        };

        self.slots[slot] = Some(Slot {
            span,
            aggregate,
            pending: None,
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

    /// Active configuration
    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Operator triple
    pub fn ops(&self) -> &O {
        &self.ops
    }

    /// Apply `value` to every position in `[l, r]`.
    ///
    /// `l > r` is a no-op. Panics if `r` is out of range.
    pub fn update(&mut self, l: usize, r: usize, value: V) {
        fail_fast(self.checked_update(l, r, value))
    }

    /// Range update reporting out-of-range positions as errors.
    pub fn checked_update(&mut self, l: usize, r: usize, value: V) -> Result<(), TreeError> {
        if validate_span(l, r, self.len())?.is_some() {
            self.log_op("update", l, r);
            self.update_slot(0, l, r, &value);
        }
        Ok(())
    }

    /// Aggregate over `[l, r]`, `None` when `l > r`.
    ///
    /// Panics if `r` is out of range.
    pub fn query(&mut self, l: usize, r: usize) -> Option<V> {
        fail_fast(self.checked_query(l, r))
    }

    /// Range query reporting out-of-range positions as errors.
    pub fn checked_query(&mut self, l: usize, r: usize) -> Result<Option<V>, TreeError> {
        if validate_span(l, r, self.len())?.is_none() {
            return Ok(None);
        }
        self.log_op("query", l, r);
        Ok(self.query_slot(0, l, r))
    }

    /// Current value at `position`
    pub fn get(&mut self, position: usize) -> Option<V> {
        self.query(position, position)
    }

    /// Current value of every position, left to right
    pub fn snapshot(&mut self) -> Vec<Option<V>> {
        (0..self.len()).map(|position| self.query_slot(0, position, position)).collect()
    }

    fn update_slot(&mut self, slot: usize, l: usize, r: usize, tag: &V) {
        if l > r {
            return;
        }
        let Some(span) = self.span(slot) else {
            return;
        };
        if span.matches(l, r) {
            self.apply(slot, tag.clone());
            return;
        }

        self.push_down(slot);
        let ((ll, lr), (rl, rr)) = span.clip(l, r);
        self.update_slot(left_child(slot), ll, lr, tag);
        self.update_slot(right_child(slot), rl, rr, tag);
        self.pull(slot);
    }

    fn query_slot(&mut self, slot: usize, l: usize, r: usize) -> Option<V> {
        if l > r {
            return None;
        }
        let span = self.span(slot)?;
        self.push_down(slot);
        if span.matches(l, r) {
            return self.aggregate(slot);
        }

        let ((ll, lr), (rl, rr)) = span.clip(l, r);
        let left = self.query_slot(left_child(slot), ll, lr);
        let right = self.query_slot(right_child(slot), rl, rr);
        self.ops.combine(left, right)
    }

    /// Fold `tag` into the slot's aggregate and, for internal nodes, its pending tag.
    fn apply(&mut self, slot: usize, tag: V) {
        let ops = &self.ops;
        let Some(node) = self.slots.get_mut(slot).and_then(Option::as_mut) else {
            return;
        };

        let aggregate = node.aggregate.take();
        node.aggregate = Some(ops.apply(aggregate, tag.clone(), node.span.lo, node.span.hi));
        if !node.span.is_leaf() {
            node.pending = Some(ops.compose(node.pending.take(), tag));
        }
    }

    /// Push the slot's pending tag to both children and clear it.
    pub(crate) fn push_down(&mut self, slot: usize) {
        let Some(tag) = self
            .slots
            .get_mut(slot)
            .and_then(Option::as_mut)
            .and_then(|node| node.pending.take())
        else {
            return;
        };

        self.apply(left_child(slot), tag.clone());
        self.apply(right_child(slot), tag);
    }

    fn pull(&mut self, slot: usize) {
        let aggregate = self
            .ops
            .combine(self.aggregate(left_child(slot)), self.aggregate(right_child(slot)));
        if let Some(node) = self.slots.get_mut(slot).and_then(Option::as_mut) {
            node.aggregate = aggregate;
        }
    }

    pub(crate) fn span(&self, slot: usize) -> Option<Span> {
        self.slots.get(slot)?.as_ref().map(|node| node.span)
    }

    pub(crate) fn aggregate(&self, slot: usize) -> Option<V> {
        self.slots.get(slot)?.as_ref()?.aggregate.clone()
    }

    fn pending(&self, slot: usize) -> Option<&V> {
        self.slots.get(slot)?.as_ref()?.pending.as_ref()
    }

    /// Number of slots still carrying a deferred tag
    pub fn pending_count(&self) -> usize {
        (0..self.slots.len()).filter(|&slot| self.pending(slot).is_some()).count()
    }

    /// Whether the tree was laid out over a power-of-two leaf count
    pub(crate) fn is_power_of_two_layout(&self) -> bool {
        self.config.layout == Layout::PowerOfTwo
    }

    fn log_op(&self, op: &'static str, l: usize, r: usize) {
        if self.config.verbose {
            debug!(op, l, r, "static tree operation");
        } else {
            trace!(op, l, r, "static tree operation");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::{MinAssign, SumAdd, SumAssign};

    #[test]
    fn test_build_aggregates() {
        let mut tree = StaticTree::new(vec![1i64, 2, 3, 4, 5], SumAdd).unwrap();
        assert_eq!(tree.query(0, 4), Some(15));
        assert_eq!(tree.query(1, 3), Some(9));
        assert_eq!(tree.get(4), Some(5));
    }

    #[test]
    fn test_reference_scenario() {
        let mut tree = StaticTree::new(vec![0i64; 8], SumAdd).unwrap();
        tree.update(2, 5, 3);
        assert_eq!(tree.query(0, 7), Some(12));
        tree.update(0, 3, 2);
        assert_eq!(tree.query(2, 5), Some(16));
    }

    #[test]
    fn test_exact_match_defers_tag() {
        let mut tree = StaticTree::new(vec![0i64; 8], SumAdd).unwrap();
        tree.update(0, 7, 1);
        // root span matched: only the root carries the tag
        assert_eq!(tree.pending_count(), 1);
        assert_eq!(tree.aggregate(0), Some(8));
        assert_eq!(tree.aggregate(1), Some(0));
    }

    #[test]
    fn test_push_down_idempotent() {
        let mut tree = StaticTree::new(vec![1i64; 6], SumAdd).unwrap();
        tree.update(0, 5, 4);

        tree.push_down(0);
        let after_first = (tree.aggregate(0), tree.aggregate(1), tree.aggregate(2));
        tree.push_down(0);
        let after_second = (tree.aggregate(0), tree.aggregate(1), tree.aggregate(2));

        assert_eq!(after_first, after_second);
        assert_eq!(after_first, (Some(30), Some(15), Some(15)));
        assert!(tree.pending(0).is_none());
    }

    #[test]
    fn test_assign_after_partial_overlap() {
        let mut tree = StaticTree::new(vec![5i64; 7], SumAssign).unwrap();
        tree.update(0, 6, 1);
        tree.update(2, 4, 9);
        assert_eq!(tree.snapshot(), vec![Some(1), Some(1), Some(9), Some(9), Some(9), Some(1), Some(1)]);
        assert_eq!(tree.query(0, 6), Some(31));
    }

    #[test]
    fn test_min_assign() {
        let mut tree = StaticTree::new(vec![7i64, 3, 9, 4], MinAssign).unwrap();
        assert_eq!(tree.query(0, 3), Some(3));
        tree.update(1, 2, 8);
        assert_eq!(tree.query(0, 3), Some(4));
        assert_eq!(tree.query(1, 2), Some(8));
    }

    #[test]
    fn test_empty_range_is_noop() {
        let mut tree = StaticTree::new(vec![1i64, 2, 3], SumAdd).unwrap();
        tree.update(2, 1, 100);
        assert_eq!(tree.query(2, 1), None);
        assert_eq!(tree.query(0, 2), Some(6));
    }

    #[test]
    fn test_out_of_range_is_error() {
        let mut tree = StaticTree::new(vec![1i64, 2, 3], SumAdd).unwrap();
        assert_eq!(
            tree.checked_query(0, 3),
            Err(TreeError::PositionOutOfRange { position: 3, len: 3 })
        );
        assert!(tree.checked_update(1, 5, 1).is_err());
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_unchecked_out_of_range_panics() {
        let mut tree = StaticTree::new(vec![1i64], SumAdd).unwrap();
        tree.query(0, 1);
    }

    #[test]
    fn test_single_position() {
        let mut tree = StaticTree::new(vec![4i64], SumAdd).unwrap();
        tree.update(0, 0, 3);
        assert_eq!(tree.query(0, 0), Some(7));
        assert_eq!(tree.pending_count(), 0);
    }

    #[test]
    fn test_length_mismatch() {
        let config = TreeConfig::for_len(4).unwrap();
        let err = StaticTree::with_config(vec![1i64, 2], SumAdd, config).unwrap_err();
        assert_eq!(err, TreeError::LengthMismatch { expected: 4, actual: 2 });
    }
}
