//! Integer geometry over the symbolic shape space.
//!
//! This module provides the pure building blocks the selectors work with:
//! - Shape points
//! - Inclusive dimension ranges (1-D)
//! - Inclusive rectangles with intersection and difference (2-D)

pub mod interval;
pub mod rect;

pub use interval::{uncovered_ranges, DimRange};
pub use rect::{contains, overlap, subtract, uncovered, Rect};

use serde::{Deserialize, Serialize};
use std::fmt;

/// A concrete `(h, w)` shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    pub h: i64,
    pub w: i64,
}

impl Point {
    pub fn new(h: i64, w: i64) -> Self {
        Self { h, w }
    }

    /// The same value on both axes.
    pub fn splat(v: i64) -> Self {
        Self { h: v, w: v }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.h, self.w)
    }
}
