//! Node identity: an inclusive interval of positions
//!
//! Span = [lo, hi]
//! Children computed via midpoint: m = ⌊(lo + hi) / 2⌋
//!   Left child: [lo, m]
//!   Right child: [m+1, hi]

use std::fmt;

/// Inclusive interval `[lo, hi]` represented by a tree node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub struct Span {
    /// First position (inclusive)
    pub lo: usize,

    /// Last position (inclusive)
    pub hi: usize,
}

impl Span {
    /// Create span `[lo, hi]`
    pub fn new(lo: usize, hi: usize) -> Self {
        debug_assert!(lo <= hi, "empty span [{lo}, {hi}]");
        Self { lo, hi }
    }

    /// Root span over `len` positions: `[0, len - 1]`
    pub fn root(len: usize) -> Self {
        Self::new(0, len - 1)
    }

    /// Check if leaf (unit interval)
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.lo == self.hi
    }

    /// Interval length
    #[inline]
    pub fn length(&self) -> usize {
        self.hi - self.lo + 1
    }

    /// Split point: m = ⌊(lo + hi) / 2⌋
    #[inline]
    pub fn midpoint(&self) -> usize {
        (self.lo + self.hi) / 2
    }

    /// Whether this span is exactly `[l, r]`
    #[inline]
    pub fn matches(&self, l: usize, r: usize) -> bool {
        self.lo == l && self.hi == r
    }

    /// Whether `position` lies inside the span
    #[inline]
    pub fn contains(&self, position: usize) -> bool {
        self.lo <= position && position <= self.hi
    }

    /// Get children via midpoint split
    ///
    /// Returns: ([lo, mid], [mid+1, hi])
    pub fn children(&self) -> (Span, Span) {
        debug_assert!(!self.is_leaf(), "Leaf has no children");

        let mid = self.midpoint();
        (Span::new(self.lo, mid), Span::new(mid + 1, self.hi))
    }

    /// Clip `[l, r]` to the left and right halves
    ///
    /// Either side may come back empty (`l > r`), which callers treat as a no-op.
    #[inline]
    pub fn clip(&self, l: usize, r: usize) -> ((usize, usize), (usize, usize)) {
        let mid = self.midpoint();
        ((l, r.min(mid)), (l.max(mid + 1), r))
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_leaf() {
            write!(f, "[{}]", self.lo)
        } else {
            write!(f, "[{}, {}]", self.lo, self.hi)
        }
    }
}
