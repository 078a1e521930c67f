//! Utility modules.
//!
//! - Error types
//! - Text coverage maps

pub mod coverage_map;
pub mod errors;

// Re-exports
pub use coverage_map::{count_gaps, render_coverage};
pub use errors::*;
