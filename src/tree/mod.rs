//! Static range-aggregation trees
//!
//! Implicit complete-binary addressing: slot `i` has children
//! `2i + 1` and `2i + 2`, root at slot 0. Each slot remembers the
//! span it covers so the descent never recomputes endpoints.

mod lazy;
mod node;
mod traversal;

pub use lazy::StaticTree;
pub use node::Span;
pub use traversal::{DyadicBlocks, IterativeTree};

use crate::TreeError;

/// Slot layout for array-backed trees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub enum Layout {
    /// Root spans `[0, N-1]`, `4N` slots
    #[default]
    Compact,

    /// Root spans `[0, nextPow2(N)-1]`, `2 * nextPow2(N)` slots
    PowerOfTwo,
}

#[inline]
pub(crate) fn left_child(slot: usize) -> usize {
    (slot << 1) + 1
}

#[inline]
pub(crate) fn right_child(slot: usize) -> usize {
    (slot << 1) + 2
}

/// Validate a query/update range against `len` positions.
///
/// Returns `Ok(None)` for the empty range `l > r`, which is never an error.
pub fn validate_span(l: usize, r: usize, len: usize) -> Result<Option<Span>, TreeError> {
    if l > r {
        return Ok(None);
    }
    if r >= len {
        return Err(TreeError::PositionOutOfRange { position: r, len });
    }
    Ok(Some(Span::new(l, r)))
}
