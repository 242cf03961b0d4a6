//! Operator contract
//!
//! Every tree variant is generic over three operators:
//! - `combine(a, b)`: associative merge of sibling aggregates
//! - `compose(a, b)`: fold a new deferred tag `b` onto prior state `a`
//! - `expand(tag, first, last)`: aggregate effect of `tag` over `[first, last]`
//!
//! Absence is a first-class operand. `combine(None, x) == x` and
//! `combine(None, None) == None`; `compose(None, b)` means "no-op so far".

mod combiner;
mod presets;

pub use combiner::FnOperators;
pub use presets::{MaxAdd, MaxAssign, MinAdd, MinAssign, Preset, SumAdd, SumAssign};

/// The combine / compose / expand triple
pub trait Operators<V> {
    /// Merge two sibling aggregates.
    fn combine(&self, a: Option<V>, b: Option<V>) -> Option<V>;

    /// Fold deferred operation `b` onto `a` (a pending tag or a stored value).
    fn compose(&self, a: Option<V>, b: V) -> V;

    /// Convert a per-element tag into its effect over `[first, last]`.
    fn expand(&self, tag: V, first: usize, last: usize) -> V;

    /// Apply `tag` to an aggregate covering `[first, last]`.
    #[inline]
    fn apply(&self, aggregate: Option<V>, tag: V, first: usize, last: usize) -> V {
        self.compose(aggregate, self.expand(tag, first, last))
    }
}

impl<V, O: Operators<V> + ?Sized> Operators<V> for &O {
    fn combine(&self, a: Option<V>, b: Option<V>) -> Option<V> {
        (**self).combine(a, b)
    }

    fn compose(&self, a: Option<V>, b: V) -> V {
        (**self).compose(a, b)
    }

    fn expand(&self, tag: V, first: usize, last: usize) -> V {
        (**self).expand(tag, first, last)
    }
}

/// Identity-aware merge: present operand wins, both present go through `op`.
#[inline]
pub fn merge_present<V>(a: Option<V>, b: Option<V>, op: impl FnOnce(V, V) -> V) -> Option<V> {
    match (a, b) {
        (Some(a), Some(b)) => Some(op(a, b)),
        (a, None) => a,
        (None, b) => b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_present_identity() {
        let add = |a: i64, b: i64| a + b;
        assert_eq!(merge_present(Some(2), Some(3), add), Some(5));
        assert_eq!(merge_present(None, Some(3), add), Some(3));
        assert_eq!(merge_present(Some(2), None, add), Some(2));
        assert_eq!(merge_present(None, None, add), None);
    }

    #[test]
    fn test_apply_uses_expand_then_compose() {
        let ops = SumAdd;
        assert_eq!(ops.apply(Some(10), 3, 2, 5), 22);
        assert_eq!(ops.apply(None, 3, 2, 5), 12);
    }
}
