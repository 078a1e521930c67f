//! Tiling selection configuration

use crate::geometry::Point;
use serde::{Deserialize, Serialize};

/// Largest spatial dimension the window search will ever step to.
pub const MAX_DIM: i64 = 4096;

/// Configuration for coverage-window computation and case assembly
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TilingConfig {
    /// Grid-search increment per axis
    pub step: Point,

    /// Hard ceiling per axis; the grid search stops here even if the plan
    /// is still feasible
    pub ceiling: Point,

    /// Locality half-width per axis: a window never reaches further than
    /// this from the point it was computed for
    pub locality: Point,

    /// Drop cases whose assigned region has no area
    pub drop_degenerate: bool,

    /// Re-check full coverage of the target before returning cases
    pub verify_coverage: bool,
}

impl Default for TilingConfig {
    fn default() -> Self {
        Self {
            step: Point::splat(4),
            ceiling: Point::splat(MAX_DIM),
            locality: Point::splat(64),
            drop_degenerate: true,
            verify_coverage: true,
        }
    }
}

impl TilingConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the grid-search step on both axes
    pub fn step(mut self, step: i64) -> Self {
        self.step = Point::splat(step.max(1));
        self
    }

    /// Set the search ceiling on both axes
    pub fn ceiling(mut self, ceiling: i64) -> Self {
        self.ceiling = Point::splat(ceiling.max(1));
        self
    }

    /// Set the locality half-width on both axes
    pub fn locality(mut self, l: i64) -> Self {
        self.locality = Point::splat(l.max(0));
        self
    }

    /// Set the locality half-width per axis
    pub fn locality_hw(mut self, h: i64, w: i64) -> Self {
        self.locality = Point::new(h.max(0), w.max(0));
        self
    }

    /// Enable/disable the final coverage check
    pub fn verify_coverage(mut self, v: bool) -> Self {
        self.verify_coverage = v;
        self
    }

    /// Enable/disable dropping zero-area cases
    pub fn drop_degenerate(mut self, v: bool) -> Self {
        self.drop_degenerate = v;
        self
    }

    /// Tight windows: more cases, each close to where its plan was validated
    pub fn compact() -> Self {
        Self {
            step: Point::splat(1),
            locality: Point::splat(16),
            ..Default::default()
        }
    }

    /// Wide windows: fewer cases, plans stretched further from their anchor
    pub fn wide() -> Self {
        Self {
            step: Point::splat(16),
            locality: Point::splat(512),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = TilingConfig::new().step(8).locality_hw(10, 20).ceiling(1024);
        assert_eq!(config.step, Point::splat(8));
        assert_eq!(config.locality, Point::new(10, 20));
        assert_eq!(config.ceiling, Point::splat(1024));
        assert!(config.verify_coverage);
    }

    #[test]
    fn test_builder_clamps_nonsense() {
        let config = TilingConfig::new().step(0).locality(-3);
        assert_eq!(config.step, Point::splat(1));
        assert_eq!(config.locality, Point::splat(0));
    }

    #[test]
    fn test_partial_json() {
        let config: TilingConfig = serde_json::from_str(r#"{"locality": {"h": 8, "w": 8}}"#).unwrap();
        assert_eq!(config.locality, Point::splat(8));
        assert_eq!(config.step, TilingConfig::default().step);
    }

    #[test]
    fn test_presets() {
        let compact = TilingConfig::compact();
        let wide = TilingConfig::wide();
        assert_eq!(compact.step, Point::splat(1));
        assert!(compact.locality.h < TilingConfig::default().locality.h);
        assert!(wide.locality.h > TilingConfig::default().locality.h);
        assert_eq!(wide.ceiling, Point::splat(MAX_DIM));
    }
}
