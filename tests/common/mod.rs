//! Brute-force reference model shared by integration tests

#![allow(dead_code)]

use rangeagg::{Operators, Preset};

/// Plain vector with element-by-element update semantics
#[derive(Debug, Clone)]
pub struct Model {
    pub preset: Preset,
    pub values: Vec<i64>,
}

impl Model {
    pub fn new(preset: Preset, values: Vec<i64>) -> Self {
        Self { preset, values }
    }

    pub fn update(&mut self, l: usize, r: usize, value: i64) {
        if l > r {
            return;
        }
        for slot in &mut self.values[l..=r] {
            *slot = self.preset.apply_to_element(*slot, value);
        }
    }

    /// Left-to-right `combine` fold over `[l, r]`
    pub fn query(&self, l: usize, r: usize) -> Option<i64> {
        if l > r {
            return None;
        }
        self.values[l..=r]
            .iter()
            .fold(None, |acc, &value| self.preset.combine(acc, Some(value)))
    }
}

/// Order two raw indices into a range inside `[0, len)`
pub fn range_in(a: usize, b: usize, len: usize) -> (usize, usize) {
    let (a, b) = (a % len, b % len);
    (a.min(b), a.max(b))
}
