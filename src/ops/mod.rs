//! Operator resource models.
//!
//! Each operator supplies a plan type, a [`FeasibilityOracle`](crate::feasibility::FeasibilityOracle)
//! and a [`SynthesisOracle`](crate::fallback::SynthesisOracle).

pub mod conv2d;

pub use conv2d::{Conv2dCostModel, Conv2dFeasibility, Conv2dJob, Conv2dParams, Conv2dTiling};
