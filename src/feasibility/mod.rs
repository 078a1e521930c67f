//! Feasibility window oracle.
//!
//! Operators plug in their own resource model through [`FeasibilityOracle`].
//! The selectors only ever ask for a plan's coverage window: the region
//! around a representative point where the plan is both resource-feasible
//! and close enough to where it was validated to perform acceptably.

pub mod window;

pub use window::{clamp_capacity, clamp_locality, coverage_window, grid_search, raw_window};

use crate::config::TilingConfig;
use crate::geometry::{Point, Rect};

/// Operator-specific feasibility tests for a plan.
pub trait FeasibilityOracle<P> {
    /// Smallest `(h, w)` for which the plan's geometry is well defined.
    fn minimal_bound(&self, plan: &P) -> Point;

    /// Whether the on-chip footprint of `plan` at `size` fits the hardware budget.
    fn is_feasible(&self, plan: &P, size: Point) -> bool;

    /// Hard `h * w <= C` bound imposed by the plan's buffering, if any.
    fn capacity_bound(&self, _plan: &P) -> Option<i64> {
        None
    }

    /// Coverage window of `plan` around `anchor`.
    ///
    /// Always contains `anchor`. Recomputed on every call.
    fn coverage_window(&self, plan: &P, anchor: Point, config: &TilingConfig) -> Rect {
        window::coverage_window(self, plan, anchor, config)
    }
}
