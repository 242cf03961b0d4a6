//! Ready-made operator triples over `i64`
//!
//! Sums, adds and span scaling wrap on overflow (two's complement), so the
//! sum presets answer with the wrapping left-to-right fold whatever the tree
//! shape. `MinAdd`/`MaxAdd` only agree with the element-wise fold while the
//! added values stay within `i64`: min and max do not commute with a wrap.

use std::fmt;
use std::str::FromStr;

use super::{merge_present, Operators};

#[inline]
fn span_len(first: usize, last: usize) -> i64 {
    (last - first + 1) as i64
}

/// Sum aggregate, add-to-range updates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SumAdd;

impl Operators<i64> for SumAdd {
    fn combine(&self, a: Option<i64>, b: Option<i64>) -> Option<i64> {
        merge_present(a, b, i64::wrapping_add)
    }

    fn compose(&self, a: Option<i64>, b: i64) -> i64 {
        a.unwrap_or(0).wrapping_add(b)
    }

    fn expand(&self, tag: i64, first: usize, last: usize) -> i64 {
        tag.wrapping_mul(span_len(first, last))
    }
}

/// Sum aggregate, assign-to-range updates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SumAssign;

impl Operators<i64> for SumAssign {
    fn combine(&self, a: Option<i64>, b: Option<i64>) -> Option<i64> {
        merge_present(a, b, i64::wrapping_add)
    }

    fn compose(&self, _a: Option<i64>, b: i64) -> i64 {
        b
    }

    fn expand(&self, tag: i64, first: usize, last: usize) -> i64 {
        tag.wrapping_mul(span_len(first, last))
    }
}

/// Minimum aggregate, add-to-range updates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MinAdd;

impl Operators<i64> for MinAdd {
    fn combine(&self, a: Option<i64>, b: Option<i64>) -> Option<i64> {
        merge_present(a, b, i64::min)
    }

    fn compose(&self, a: Option<i64>, b: i64) -> i64 {
        a.unwrap_or(0).wrapping_add(b)
    }

    fn expand(&self, tag: i64, _first: usize, _last: usize) -> i64 {
        tag
    }
}

/// Minimum aggregate, assign-to-range updates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MinAssign;

impl Operators<i64> for MinAssign {
    fn combine(&self, a: Option<i64>, b: Option<i64>) -> Option<i64> {
        merge_present(a, b, i64::min)
    }

    fn compose(&self, _a: Option<i64>, b: i64) -> i64 {
        b
    }

    fn expand(&self, tag: i64, _first: usize, _last: usize) -> i64 {
        tag
    }
}

/// Maximum aggregate, add-to-range updates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaxAdd;

impl Operators<i64> for MaxAdd {
    fn combine(&self, a: Option<i64>, b: Option<i64>) -> Option<i64> {
        merge_present(a, b, i64::max)
    }

    fn compose(&self, a: Option<i64>, b: i64) -> i64 {
        a.unwrap_or(0).wrapping_add(b)
    }

    fn expand(&self, tag: i64, _first: usize, _last: usize) -> i64 {
        tag
    }
}

/// Maximum aggregate, assign-to-range updates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaxAssign;

impl Operators<i64> for MaxAssign {
    fn combine(&self, a: Option<i64>, b: Option<i64>) -> Option<i64> {
        merge_present(a, b, i64::max)
    }

    fn compose(&self, _a: Option<i64>, b: i64) -> i64 {
        b
    }

    fn expand(&self, tag: i64, _first: usize, _last: usize) -> i64 {
        tag
    }
}

/// Named preset, selectable at runtime (CLI, scripts)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub enum Preset {
    /// See [`SumAdd`]
    SumAdd,
    /// See [`SumAssign`]
    SumAssign,
    /// See [`MinAdd`]
    MinAdd,
    /// See [`MinAssign`]
    MinAssign,
    /// See [`MaxAdd`]
    MaxAdd,
    /// See [`MaxAssign`]
    MaxAssign,
}

impl Preset {
    /// All presets, in display order
    pub const ALL: [Preset; 6] = [
        Preset::SumAdd,
        Preset::SumAssign,
        Preset::MinAdd,
        Preset::MinAssign,
        Preset::MaxAdd,
        Preset::MaxAssign,
    ];

    /// Kebab-case name used on the command line
    pub fn name(&self) -> &'static str {
        match self {
            Preset::SumAdd => "sum-add",
            Preset::SumAssign => "sum-assign",
            Preset::MinAdd => "min-add",
            Preset::MinAssign => "min-assign",
            Preset::MaxAdd => "max-add",
            Preset::MaxAssign => "max-assign",
        }
    }

    /// Apply a new update value on top of an existing element value
    ///
    /// Element-wise semantics of the preset, used by brute-force models.
    pub fn apply_to_element(&self, current: i64, value: i64) -> i64 {
        match self {
            Preset::SumAdd | Preset::MinAdd | Preset::MaxAdd => current.wrapping_add(value),
            Preset::SumAssign | Preset::MinAssign | Preset::MaxAssign => value,
        }
    }
}

impl Operators<i64> for Preset {
    fn combine(&self, a: Option<i64>, b: Option<i64>) -> Option<i64> {
        match self {
            Preset::SumAdd => SumAdd.combine(a, b),
            Preset::SumAssign => SumAssign.combine(a, b),
            Preset::MinAdd => MinAdd.combine(a, b),
            Preset::MinAssign => MinAssign.combine(a, b),
            Preset::MaxAdd => MaxAdd.combine(a, b),
            Preset::MaxAssign => MaxAssign.combine(a, b),
        }
    }

    fn compose(&self, a: Option<i64>, b: i64) -> i64 {
        match self {
            Preset::SumAdd => SumAdd.compose(a, b),
            Preset::SumAssign => SumAssign.compose(a, b),
            Preset::MinAdd => MinAdd.compose(a, b),
            Preset::MinAssign => MinAssign.compose(a, b),
            Preset::MaxAdd => MaxAdd.compose(a, b),
            Preset::MaxAssign => MaxAssign.compose(a, b),
        }
    }

    fn expand(&self, tag: i64, first: usize, last: usize) -> i64 {
        match self {
            Preset::SumAdd => SumAdd.expand(tag, first, last),
            Preset::SumAssign => SumAssign.expand(tag, first, last),
            Preset::MinAdd => MinAdd.expand(tag, first, last),
            Preset::MinAssign => MinAssign.expand(tag, first, last),
            Preset::MaxAdd => MaxAdd.expand(tag, first, last),
            Preset::MaxAssign => MaxAssign.expand(tag, first, last),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preset::ALL
            .into_iter()
            .find(|preset| preset.name() == s)
            .ok_or_else(|| format!("unknown operator preset '{s}'"))
    }
}
