//! Inclusive ranges over a single symbolic dimension.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An inclusive `[min, max]` range of one dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DimRange {
    pub min: i64,
    pub max: i64,
}

impl DimRange {
    pub fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    /// A range holding a single value.
    pub fn single(value: i64) -> Self {
        Self::new(value, value)
    }

    pub fn is_well_formed(&self) -> bool {
        self.min <= self.max
    }

    /// Number of integer values in the range, 0 when malformed.
    pub fn len(&self) -> i64 {
        if self.is_well_formed() {
            self.max - self.min + 1
        } else {
            0
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, value: i64) -> bool {
        self.min <= value && value <= self.max
    }

    pub fn overlap(&self, other: &DimRange) -> Option<DimRange> {
        let inter = DimRange::new(self.min.max(other.min), self.max.min(other.max));
        inter.is_well_formed().then_some(inter)
    }

    /// `self \ cut` as at most two ranges, lower piece first.
    pub fn subtract(&self, cut: &DimRange) -> Vec<DimRange> {
        let mut pieces = Vec::with_capacity(2);
        if cut.min > self.min {
            pieces.push(DimRange::new(self.min, (cut.min - 1).min(self.max)));
        }
        if cut.max < self.max {
            pieces.push(DimRange::new((cut.max + 1).max(self.min), self.max));
        }
        pieces
    }

    pub fn midpoint(&self) -> i64 {
        self.min + (self.max - self.min) / 2
    }
}

impl fmt::Display for DimRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

/// The part of `target` not covered by any of `ranges`.
pub fn uncovered_ranges<'a, I>(target: &DimRange, ranges: I) -> Vec<DimRange>
where
    I: IntoIterator<Item = &'a DimRange>,
{
    let mut rest = vec![*target];
    for range in ranges {
        rest = rest
            .iter()
            .flat_map(|r| {
                if r.overlap(range).is_some() {
                    r.subtract(range)
                } else {
                    vec![*r]
                }
            })
            .collect();
    }
    rest
}
