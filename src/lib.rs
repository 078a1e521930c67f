//! # dyntile - Tiling case selection for dynamic-shape operators
//!
//! An operator whose input height/width (or batch) is only known at run time
//! still has to be compiled ahead of time into a finite set of tiling plans.
//! This crate partitions the symbolic shape space into regions and binds one
//! plan to each region:
//! - Coverage windows of plans from a resource-feasibility oracle
//! - Greedy rectangle cover of the `(h, w)` space by repository seeds
//! - Interval cover of the batch dimension
//! - Cost-model fallback for whatever the seeds leave uncovered
//! - Publication of the `{case key: region}` map for runtime dispatch
//!
//! ## Architecture
//!
//! ```text
//! ShapeDescriptor → mode ┬→ select_cover ──→ fill_uncovered ┬→ TilingCase[] → MetadataSink
//!                        └→ select_intervals ───────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use dyntile::prelude::*;
//! use dyntile::ops::conv2d::{Conv2dCostModel, Conv2dFeasibility, Conv2dParams, OP_TYPE};
//!
//! let params = Conv2dParams::default();
//! let feasibility = Conv2dFeasibility::new(params.clone());
//! let cost_model = Conv2dCostModel::new(params);
//! let seeds = InMemoryRepository::new();
//!
//! let shape = ShapeDescriptor::spatial(OP_TYPE, 1, DimRange::new(1, 512), DimRange::new(1, 512));
//! let cases = dyntile::calc_tiling(&shape, &feasibility, &cost_model, &seeds, TilingConfig::default())?;
//! ```

#![warn(clippy::all)]

pub mod case;
pub mod config;
pub mod driver;
pub mod fallback;
pub mod feasibility;
pub mod geometry;
pub mod metadata;
pub mod ops;
pub mod plan;
pub mod repository;
pub mod selection;
pub mod shape;
pub mod utils;

// Re-export commonly used types
pub mod prelude {
    //! Convenient re-exports of commonly used types and traits.

    pub use crate::case::{dispatch, CaseSource, Region, TilingCase};
    pub use crate::config::TilingConfig;
    pub use crate::driver::{calc_tiling, TilingDriver};
    pub use crate::fallback::{fill_uncovered, SynthesisOracle};
    pub use crate::feasibility::FeasibilityOracle;
    pub use crate::geometry::{DimRange, Point, Rect};
    pub use crate::metadata::{InMemorySink, MetadataSink};
    pub use crate::plan::{BatchSeed, Seed, SpatialSeed, TilingPlan};
    pub use crate::repository::{InMemoryRepository, SeedRepository};
    pub use crate::selection::{select_cover, select_intervals};
    pub use crate::shape::{Dim, ShapeDescriptor, ShapePoint, TilingMode};
    pub use crate::utils::errors::*;
}

pub use driver::calc_tiling;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
