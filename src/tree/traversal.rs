//! Iterative dyadic traversal
//!
//! Over a power-of-two layout with P leaves, every aligned block
//! `[l, l + s - 1]` (s a power of two, `l % s == 0`) is exactly one node,
//! found by arithmetic: slot = P/s - 1 + l/s.
//!
//! A query walks `[l, r]` left to right with a block size `s`:
//! - Ascend: while `l` is aligned to `2s` and `2s` still fits, double `s`
//! - Take block `[l, l + s - 1]` if it fits, else switch to descend
//! - Descend: halve `s` until the block fits; never ascend again
//!
//! Both phases are bounded by the tree height.

use tracing::trace;

use super::{left_child, right_child, validate_span, Layout, Span, StaticTree};
use crate::{algebra::Operators, fail_fast, TreeConfig, TreeError};

/// Allocation-free iterator over the aligned blocks covering `[l, r]`
#[derive(Debug, Clone)]
pub struct DyadicBlocks {
    l: usize,
    r: usize,
    size: usize,
    leaves: usize,
    ascending: bool,
    done: bool,
}

impl DyadicBlocks {
    /// Blocks covering `[l, r]` in a tree with `leaves` (power of two) leaves
    pub fn new(l: usize, r: usize, leaves: usize) -> Self {
        debug_assert!(leaves.is_power_of_two());
        Self {
            l,
            r,
            size: 1,
            leaves,
            ascending: true,
            done: l > r,
        }
    }
}

impl Iterator for DyadicBlocks {
    type Item = Span;

    fn next(&mut self) -> Option<Span> {
        if self.done {
            return None;
        }

        if self.ascending {
            while self.size < self.leaves
                && self.l & ((self.size << 1) - 1) == 0
                && self.l + (self.size << 1) - 1 <= self.r
            {
                self.size <<= 1;
            }
        }

        // size 1 always fits while l <= r, so this terminates
        while self.l + self.size - 1 > self.r {
            self.ascending = false;
            self.size >>= 1;
        }

        let block = Span::new(self.l, self.l + self.size - 1);
        if block.hi >= self.r {
            self.done = true;
        } else {
            self.l = block.hi + 1;
        }
        Some(block)
    }
}

/// Static tree over a power-of-two layout answering queries without recursion
///
/// Updates go through the recursive lazy descent; queries push pending tags
/// along the two boundary paths and then read aligned blocks directly.
#[derive(Debug, Clone)]
pub struct IterativeTree<V, O> {
    inner: StaticTree<V, O>,
    leaves: usize,
}

impl<V: Clone, O: Operators<V>> IterativeTree<V, O> {
    /// Build over `values`, rounding N up to a power of two.
    pub fn new(values: Vec<V>, ops: O) -> Result<Self, TreeError> {
        let config = TreeConfig::for_len(values.len())?;
        Self::with_config(values, ops, config)
    }

    /// Build with an explicit configuration; the layout is forced to
    /// [`Layout::PowerOfTwo`].
    pub fn with_config(values: Vec<V>, ops: O, config: TreeConfig) -> Result<Self, TreeError> {
        let config = config.with_layout(Layout::PowerOfTwo);
        let leaves = config.padded_len();
        let inner = StaticTree::with_config(values, ops, config)?;
        debug_assert!(inner.is_power_of_two_layout());
        Ok(Self { inner, leaves })
    }

    /// Number of positions N
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Always false: construction rejects empty input
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Configuration the tree was built with (layout is always power-of-two)
    pub fn config(&self) -> &TreeConfig {
        self.inner.config()
    }

    /// Leaf count after rounding up to a power of two
    pub fn padded_len(&self) -> usize {
        self.leaves
    }

    /// Range update (recursive lazy descent).
    pub fn update(&mut self, l: usize, r: usize, value: V) {
        self.inner.update(l, r, value)
    }

    /// Range update reporting out-of-range positions as errors.
    pub fn checked_update(&mut self, l: usize, r: usize, value: V) -> Result<(), TreeError> {
        self.inner.checked_update(l, r, value)
    }

    /// Aggregate over `[l, r]` via the iterative block walk.
    pub fn query(&mut self, l: usize, r: usize) -> Option<V> {
        fail_fast(self.checked_query(l, r))
    }

    /// Iterative query reporting out-of-range positions as errors.
    pub fn checked_query(&mut self, l: usize, r: usize) -> Result<Option<V>, TreeError> {
        if validate_span(l, r, self.len())?.is_none() {
            return Ok(None);
        }
        Ok(self.query_blocks(l, r))
    }

    /// Aggregate over `[l, r]` via the recursive descent.
    pub fn query_recursive(&mut self, l: usize, r: usize) -> Option<V> {
        self.inner.query(l, r)
    }

    /// Current value at `position`
    pub fn get(&mut self, position: usize) -> Option<V> {
        self.query(position, position)
    }

    /// Aligned blocks a query over `[l, r]` would read
    pub fn blocks(&self, l: usize, r: usize) -> DyadicBlocks {
        DyadicBlocks::new(l, r, self.leaves)
    }

    /// Slot of the node covering an aligned block
    fn block_slot(&self, block: Span) -> usize {
        let size = block.length();
        debug_assert!(size.is_power_of_two() && block.lo % size == 0);
        self.leaves / size - 1 + block.lo / size
    }

    /// Push pending tags along the root-to-leaf path of `position`.
    ///
    /// Every block in the decomposition of `[l, r]` has its ancestors on the
    /// paths of `l` or `r`, so pushing both paths makes every block current.
    fn push_path(&mut self, position: usize) {
        let mut slot = 0;
        let mut span = Span::root(self.leaves);
        while !span.is_leaf() {
            self.inner.push_down(slot);
            let (left, right) = span.children();
            if left.contains(position) {
                slot = left_child(slot);
                span = left;
            } else {
                slot = right_child(slot);
                span = right;
            }
        }
    }

    fn query_blocks(&mut self, l: usize, r: usize) -> Option<V> {
        self.push_path(l);
        self.push_path(r);

        let mut answer = None;
        let mut steps = 0usize;
        for block in self.blocks(l, r) {
            let slot = self.block_slot(block);
            debug_assert_eq!(self.inner.span(slot), Some(block));
            self.inner.push_down(slot);
            let value = self.inner.aggregate(slot);
            answer = self.inner.ops().combine(answer, value);
            steps += 1;
        }

        let bound = 2 * self.config().height_bound().max(1);
        debug_assert!(steps <= bound, "{steps} blocks for [{l}, {r}]");
        trace!(l, r, steps, bound, "iterative query");
        answer
    }
}
