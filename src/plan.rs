//! Tiling plans and seeds.
//!
//! A plan is an operator-specific record of block sizes, buffer partitions
//! and parallelism factors. The selectors never look inside a plan beyond
//! [`TilingPlan::primary_parallelism`]; everything else goes through the
//! operator's feasibility oracle.

use crate::geometry::Point;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque, shape-specialized execution plan.
pub trait TilingPlan: Clone + fmt::Debug {
    /// The plan's main parallelism factor (e.g. cores along batch).
    ///
    /// Breaks ties between seeds sharing a batch anchor.
    fn primary_parallelism(&self) -> i64;
}

/// A previously validated plan together with the shape it was validated at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seed<P, A = Point> {
    pub plan: P,
    pub anchor: A,
}

impl<P, A> Seed<P, A> {
    pub fn new(plan: P, anchor: A) -> Self {
        Self { plan, anchor }
    }
}

/// Seed anchored at an `(h, w)` point.
pub type SpatialSeed<P> = Seed<P, Point>;

/// Seed anchored at a batch value.
pub type BatchSeed<P> = Seed<P, i64>;
