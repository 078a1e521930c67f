//! Tiling cases: the final `{key, plan, region}` records.

use crate::geometry::{DimRange, Rect};
use crate::shape::{ShapePoint, VAR_BATCH, VAR_HEIGHT, VAR_WIDTH};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Region of the shape space assigned to one case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    /// `(h, w)` rectangle for spatial tiling
    Rect(Rect),
    /// Batch interval
    Interval(DimRange),
}

impl Region {
    pub fn area(&self) -> i64 {
        match self {
            Region::Rect(r) => r.area(),
            Region::Interval(i) => i.len(),
        }
    }

    pub fn contains(&self, point: ShapePoint) -> bool {
        match (self, point) {
            (Region::Rect(r), ShapePoint::Spatial(p)) => r.contains(p),
            (Region::Interval(i), ShapePoint::Batch(b)) => i.contains(b),
            _ => false,
        }
    }

    pub fn as_rect(&self) -> Option<&Rect> {
        match self {
            Region::Rect(r) => Some(r),
            Region::Interval(_) => None,
        }
    }

    pub fn as_interval(&self) -> Option<&DimRange> {
        match self {
            Region::Interval(i) => Some(i),
            Region::Rect(_) => None,
        }
    }

    /// Bindings of each symbolic variable to its range inside the region.
    pub fn var_range(&self) -> BTreeMap<String, DimRange> {
        let mut vars = BTreeMap::new();
        match self {
            Region::Rect(r) => {
                vars.insert(VAR_HEIGHT.to_string(), r.h_range());
                vars.insert(VAR_WIDTH.to_string(), r.w_range());
            }
            Region::Interval(i) => {
                vars.insert(VAR_BATCH.to_string(), *i);
            }
        }
        vars
    }

    /// Inclusive `[min, max]` bounds per symbolic dimension, in dimension order.
    pub fn bounds(&self) -> Vec<[i64; 2]> {
        match self {
            Region::Rect(r) => vec![[r.top, r.bottom], [r.left, r.right]],
            Region::Interval(i) => vec![[i.min, i.max]],
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Region::Rect(r) => write!(f, "{}", r),
            Region::Interval(i) => write!(f, "{}", i),
        }
    }
}

/// Where a case's plan came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseSource {
    /// A repository seed validated at `anchor`
    Seed { anchor: ShapePoint },
    /// Synthesized by the cost model for `point`
    CostModel { point: ShapePoint },
}

impl fmt::Display for CaseSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaseSource::Seed { anchor } => write!(f, "seed@{}", anchor),
            CaseSource::CostModel { point } => write!(f, "cost-model@{}", point),
        }
    }
}

/// One finalized plan-to-region binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TilingCase<P> {
    /// Unique key within the driver that produced the case
    pub key: u64,
    pub plan: P,
    pub region: Region,
    /// Symbolic variable bindings over `region`
    pub var_range: BTreeMap<String, DimRange>,
    pub source: CaseSource,
}

impl<P> TilingCase<P> {
    pub fn new(key: u64, plan: P, region: Region, source: CaseSource) -> Self {
        Self {
            key,
            plan,
            var_range: region.var_range(),
            region,
            source,
        }
    }

    /// The anchor of a seeded case.
    pub fn anchor(&self) -> Option<ShapePoint> {
        match self.source {
            CaseSource::Seed { anchor } => Some(anchor),
            CaseSource::CostModel { .. } => None,
        }
    }
}

/// First case whose region contains `point`, in emission order.
pub fn dispatch<P>(cases: &[TilingCase<P>], point: ShapePoint) -> Option<&TilingCase<P>> {
    cases.iter().find(|c| c.region.contains(point))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    #[test]
    fn test_var_range() {
        let region = Region::Rect(Rect::new(1, 10, 20, 30));
        let vars = region.var_range();
        assert_eq!(vars["h"], DimRange::new(1, 10));
        assert_eq!(vars["w"], DimRange::new(20, 30));

        let vars = Region::Interval(DimRange::new(1, 8)).var_range();
        assert_eq!(vars.len(), 1);
        assert_eq!(vars["batch"], DimRange::new(1, 8));
    }

    #[test]
    fn test_contains_mismatched_point() {
        let region = Region::Interval(DimRange::new(1, 8));
        assert!(region.contains(ShapePoint::Batch(8)));
        assert!(!region.contains(ShapePoint::Spatial(Point::new(1, 1))));
    }

    #[test]
    fn test_dispatch_first_match() {
        let cases = vec![
            TilingCase::new(0, "a", Region::Rect(Rect::new(1, 10, 1, 10)), CaseSource::Seed {
                anchor: ShapePoint::Spatial(Point::new(5, 5)),
            }),
            TilingCase::new(1, "b", Region::Rect(Rect::new(1, 20, 1, 20)), CaseSource::CostModel {
                point: ShapePoint::Spatial(Point::new(15, 15)),
            }),
        ];
        let hit = |h, w| dispatch(&cases, ShapePoint::Spatial(Point::new(h, w))).map(|c| c.plan);
        assert_eq!(hit(10, 10), Some("a"));
        assert_eq!(hit(11, 10), Some("b"));
        assert_eq!(hit(21, 1), None);
        assert_eq!(cases[0].anchor(), Some(ShapePoint::Spatial(Point::new(5, 5))));
        assert_eq!(cases[1].anchor(), None);
    }

    #[test]
    fn test_case_json() {
        let case = TilingCase::new(3, 42u32, Region::Interval(DimRange::new(11, 1000)), CaseSource::Seed {
            anchor: ShapePoint::Batch(50),
        });
        let json = serde_json::to_value(&case).unwrap();
        assert_eq!(json["key"], 3);
        assert_eq!(json["region"]["interval"]["max"], 1000);
        assert_eq!(json["var_range"]["batch"]["min"], 11);
    }
}
