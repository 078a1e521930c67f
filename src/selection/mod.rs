//! Seed selection.
//!
//! - [`cover`]: greedy rectangle cover for symbolic H/W
//! - [`interval`]: interval walk for a symbolic batch

pub mod cover;
pub mod interval;

pub use cover::{select_cover, RestArea, SpatialAssignment, SpatialSelection};
pub use interval::{select_intervals, BatchAssignment};
