//! # Range-aggregation trees
//!
//! A generic segment-tree engine over `N` ordered positions supporting
//! range updates, range aggregation, and retrieval of historical states.
//!
//! ## Variants
//!
//! 1. **Lazy propagation** ([`StaticTree`]): mutable array-backed tree with deferred range updates
//! 2. **Iterative traversal** ([`IterativeTree`]): the same tree over a power-of-two layout,
//!    queried without recursion using aligned dyadic blocks
//! 3. **Full persistence** ([`PersistentTree`]): path copying, every update yields a new version
//! 4. **Partial persistence** ([`PartialTree`]): per-node timelines, point updates only
//!
//! All variants are parameterized by an [`Operators`] triple
//! (combine, compose, expand) and never inspect values themselves.
//!
//! ## Usage Example
//!
//! ```
//! use rangeagg::{PersistentTree, SumAdd};
//!
//! let mut tree = PersistentTree::new(vec![0i64; 8], SumAdd).unwrap();
//! let v1 = tree.update(0, 2, 5, 3);
//! assert_eq!(tree.query(v1, 0, 7), Some(12));
//! let v2 = tree.update(v1, 0, 3, 2);
//! assert_eq!(tree.query(v2, 2, 5), Some(16));
//! assert_eq!(tree.query(v1, 0, 7), Some(12));
//! ```

#![warn(missing_docs, missing_debug_implementations)]

pub mod algebra;    // Operator contract and presets
pub mod tree;       // Spans, lazy tree, iterative traversal
pub mod persistent; // Path-copying full persistence
pub mod partial;    // Timeline-based partial persistence
pub mod ledger;     // Version and timeline bookkeeping
pub mod script;     // Command scripts replayed against any variant

// Re-exports for convenience
pub use algebra::{
    FnOperators, MaxAdd, MaxAssign, MinAdd, MinAssign, Operators, Preset, SumAdd, SumAssign,
};
pub use ledger::{Timeline, Version, VersionClock, VersionLedger};
pub use partial::PartialTree;
pub use persistent::{NodeId, PersistentTree};
pub use tree::{IterativeTree, Layout, Span, StaticTree};

use thiserror::Error;

/// Configuration parameters shared by every tree variant
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub struct TreeConfig {
    /// Number of positions N
    pub len: usize,

    /// Slot layout for array-backed variants
    pub layout: Layout,

    /// Arena reservation hint for persistent trees
    pub node_capacity: usize,

    /// Raise per-operation events from `trace` to `debug`
    pub verbose: bool,
}

impl TreeConfig {
    /// Default configuration for `len` positions
    pub fn for_len(len: usize) -> Result<Self, TreeError> {
        if len == 0 {
            return Err(TreeError::EmptyInput);
        }
        Ok(Self {
            len,
            layout: Layout::Compact,
            node_capacity: 2 * len,
            verbose: false,
        })
    }

    /// Select slot layout.
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    /// Reserve room for `capacity` arena nodes up front.
    pub fn with_node_capacity(mut self, capacity: usize) -> Self {
        self.node_capacity = capacity;
        self
    }

    /// Enable verbose per-operation logging.
    pub fn with_verbose(mut self, enabled: bool) -> Self {
        self.verbose = enabled;
        self
    }

    /// Number of leaves the layout builds (N, or N rounded up to a power of two)
    pub fn padded_len(&self) -> usize {
        match self.layout {
            Layout::Compact => self.len,
            Layout::PowerOfTwo => self.len.next_power_of_two(),
        }
    }

    /// Array slots required by the layout: `4N` or `2 * nextPow2(N)`
    pub fn slot_count(&self) -> usize {
        match self.layout {
            Layout::Compact => 4 * self.len,
            Layout::PowerOfTwo => 2 * self.len.next_power_of_two(),
        }
    }

    /// Height bound: ⌈log2 N⌉
    pub fn height_bound(&self) -> usize {
        self.padded_len().next_power_of_two().trailing_zeros() as usize
    }
}

/// Errors surfaced by checked operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// Trees need at least one position
    #[error("cannot build a tree over an empty sequence")]
    EmptyInput,

    /// Configured length disagrees with the supplied values
    #[error("config expects {expected} positions, got {actual} values")]
    LengthMismatch {
        /// Length recorded in the configuration
        expected: usize,
        /// Number of values supplied
        actual: usize,
    },

    /// Position outside `[0, len - 1]`
    #[error("position {position} out of range for {len} positions")]
    PositionOutOfRange {
        /// Offending position
        position: usize,
        /// Number of positions in the tree
        len: usize,
    },

    /// Version never produced by construction or update
    #[error("unknown version {version} (latest is {latest})")]
    UnknownVersion {
        /// Requested version
        version: Version,
        /// Most recently created version
        latest: Version,
    },

    /// Partial persistence only accepts point updates
    #[error("range update [{l}, {r}] on a point-update tree")]
    PointUpdateOnly {
        /// Left bound
        l: usize,
        /// Right bound
        r: usize,
    },

    /// Malformed command script
    #[error("script line {line}: {message}")]
    Script {
        /// 1-indexed line number
        line: usize,
        /// Description of the problem
        message: String,
    },
}

/// Fail fast on a programming error surfaced by a checked operation.
#[track_caller]
pub(crate) fn fail_fast<T>(result: Result<T, TreeError>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => panic!("{err}"),
    }
}
