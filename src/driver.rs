//! Tiling driver.
//!
//! [`TilingDriver::calc_tiling`] classifies a shape's symbolic dimensions,
//! runs the matching selector, sends leftover area to the cost model and
//! assembles the final list of tiling cases. Case keys come from a counter
//! owned by the driver, so they are unique across every shape one driver
//! handles.

use crate::case::{CaseSource, Region, TilingCase};
use crate::config::TilingConfig;
use crate::fallback::{fill_uncovered, SynthesisOracle};
use crate::feasibility::FeasibilityOracle;
use crate::geometry::{uncovered, uncovered_ranges, DimRange, Rect};
use crate::metadata::{MetadataSink, NullSink, TILING_MODE, TILING_RANGE};
use crate::plan::TilingPlan;
use crate::repository::SeedRepository;
use crate::selection::{select_cover, select_intervals};
use crate::shape::{ShapeDescriptor, ShapePoint, TilingMode};
use crate::utils::errors::{TilingError, TilingResult};
use log::{debug, info, warn};
use serde_json::{json, Map, Value};

/// A case waiting for its key.
type Pending<P> = (P, Region, CaseSource);

/// Computes tiling cases for shapes with symbolic dimensions.
pub struct TilingDriver<'a, P> {
    feasibility: &'a dyn FeasibilityOracle<P>,
    synthesis: &'a dyn SynthesisOracle<P>,
    repository: &'a dyn SeedRepository<P>,
    config: TilingConfig,
    next_key: u64,
}

impl<'a, P: TilingPlan> TilingDriver<'a, P> {
    /// Create a driver with the default configuration.
    pub fn new(
        feasibility: &'a dyn FeasibilityOracle<P>,
        synthesis: &'a dyn SynthesisOracle<P>,
        repository: &'a dyn SeedRepository<P>,
    ) -> Self {
        Self {
            feasibility,
            synthesis,
            repository,
            config: TilingConfig::default(),
            next_key: 0,
        }
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: TilingConfig) -> Self {
        self.config = config;
        self
    }

    /// Start case keys at `key` instead of 0.
    pub fn with_first_key(mut self, key: u64) -> Self {
        self.next_key = key;
        self
    }

    pub fn config(&self) -> &TilingConfig {
        &self.config
    }

    /// Compute the tiling cases for `shape`.
    pub fn calc_tiling(&mut self, shape: &ShapeDescriptor) -> TilingResult<Vec<TilingCase<P>>> {
        self.calc_tiling_with_sink(shape, &mut NullSink)
    }

    /// Compute the tiling cases for `shape` and publish the region mapping to `sink`.
    pub fn calc_tiling_with_sink(
        &mut self,
        shape: &ShapeDescriptor,
        sink: &mut dyn MetadataSink,
    ) -> TilingResult<Vec<TilingCase<P>>> {
        let mode = shape.mode()?;
        debug!("{}: {} tiling", shape, mode.name());

        let cases = match mode {
            TilingMode::Spatial { h, w } => self.tile_spatial(shape, Rect::from_ranges(h, w))?,
            TilingMode::Batch(batch) => self.tile_batch(shape, batch)?,
        };

        publish(sink, mode, &cases);
        let seeded = cases.iter().filter(|c| matches!(c.source, CaseSource::Seed { .. })).count();
        info!(
            "{}: {} tiling case(s), {} from seeds, {} from the cost model",
            shape,
            cases.len(),
            seeded,
            cases.len() - seeded
        );
        Ok(cases)
    }

    fn tile_spatial(&mut self, shape: &ShapeDescriptor, target: Rect) -> TilingResult<Vec<TilingCase<P>>> {
        let seeds = self.repository.spatial_seeds(shape);
        let selection = select_cover(target, seeds, self.feasibility, &self.config);
        if !selection.uncovered.is_empty() {
            debug!("{} rectangle(s) left for the cost model", selection.uncovered.len());
        }
        let synthesized = fill_uncovered(shape, selection.uncovered, self.feasibility, self.synthesis, &self.config)?;

        let mut pending = Vec::with_capacity(selection.assigned.len() + synthesized.len());
        for a in selection.assigned {
            let source = CaseSource::Seed { anchor: ShapePoint::Spatial(a.anchor) };
            pending.push((a.plan, Region::Rect(a.region), source));
        }
        for a in synthesized {
            let source = CaseSource::CostModel { point: ShapePoint::Spatial(a.point) };
            pending.push((a.plan, Region::Rect(a.region), source));
        }
        let pending = self.drop_degenerate(pending);

        if self.config.verify_coverage {
            let gaps = uncovered(&target, pending.iter().filter_map(|(_, r, _)| r.as_rect()));
            if !gaps.is_empty() {
                return Err(TilingError::Internal(format!(
                    "{} rectangle(s) of {} left uncovered, first {}",
                    gaps.len(),
                    target,
                    gaps[0]
                )));
            }
        }
        Ok(self.assign_keys(pending))
    }

    fn tile_batch(&mut self, shape: &ShapeDescriptor, target: DimRange) -> TilingResult<Vec<TilingCase<P>>> {
        let seeds = self.repository.batch_seeds(shape);
        let assigned = select_intervals(shape, target, seeds, self.synthesis)?;

        let mut pending = Vec::with_capacity(assigned.len());
        for a in assigned {
            let source = match (a.anchor, a.synthesized_at) {
                (Some(anchor), _) => CaseSource::Seed { anchor: ShapePoint::Batch(anchor) },
                (None, point) => CaseSource::CostModel { point: ShapePoint::Batch(point.unwrap_or(target.midpoint())) },
            };
            pending.push((a.plan, Region::Interval(a.range), source));
        }
        let pending = self.drop_degenerate(pending);

        if self.config.verify_coverage {
            let gaps = uncovered_ranges(&target, pending.iter().filter_map(|(_, r, _)| r.as_interval()));
            if !gaps.is_empty() {
                return Err(TilingError::Internal(format!(
                    "batch {} left uncovered in {}",
                    gaps[0], target
                )));
            }
        }
        Ok(self.assign_keys(pending))
    }

    fn drop_degenerate(&self, pending: Vec<Pending<P>>) -> Vec<Pending<P>> {
        if !self.config.drop_degenerate {
            return pending;
        }
        pending
            .into_iter()
            .filter(|(_, region, source)| {
                let keep = region.area() > 0;
                if !keep {
                    warn!("dropping empty region {} from {}", region, source);
                }
                keep
            })
            .collect()
    }

    /// Key the verified cases in emission order.
    fn assign_keys(&mut self, pending: Vec<Pending<P>>) -> Vec<TilingCase<P>> {
        pending
            .into_iter()
            .map(|(plan, region, source)| {
                let key = self.next_key;
                self.next_key += 1;
                TilingCase::new(key, plan, region, source)
            })
            .collect()
    }
}

/// Record the mode and the `{key: bounds}` mapping of `cases`.
fn publish<P>(sink: &mut dyn MetadataSink, mode: TilingMode, cases: &[TilingCase<P>]) {
    let ranges: Map<String, Value> = cases
        .iter()
        .map(|c| (c.key.to_string(), json!(c.region.bounds())))
        .collect();
    sink.record(TILING_MODE, json!(mode.name()));
    sink.record(TILING_RANGE, Value::Object(ranges));
}

/// One-shot tiling with a fresh driver.
pub fn calc_tiling<P: TilingPlan>(
    shape: &ShapeDescriptor,
    feasibility: &dyn FeasibilityOracle<P>,
    synthesis: &dyn SynthesisOracle<P>,
    repository: &dyn SeedRepository<P>,
    config: TilingConfig,
) -> TilingResult<Vec<TilingCase<P>>> {
    TilingDriver::new(feasibility, synthesis, repository)
        .with_config(config)
        .calc_tiling(shape)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::metadata::InMemorySink;
    use crate::repository::InMemoryRepository;

    #[derive(Debug, Clone, PartialEq)]
    struct Plan {
        half: i64,
    }

    impl TilingPlan for Plan {
        fn primary_parallelism(&self) -> i64 {
            1
        }
    }

    /// Feasible within `half` of the anchor on each axis.
    struct Around;

    impl FeasibilityOracle<Plan> for Around {
        fn minimal_bound(&self, _plan: &Plan) -> Point {
            Point::splat(1)
        }

        fn is_feasible(&self, _plan: &Plan, _size: Point) -> bool {
            true
        }

        fn coverage_window(&self, plan: &Plan, anchor: Point, _config: &TilingConfig) -> Rect {
            Rect::new(anchor.h - plan.half, anchor.h + plan.half, anchor.w - plan.half, anchor.w + plan.half)
        }
    }

    fn synth(_: &ShapeDescriptor, _: ShapePoint) -> TilingResult<Plan> {
        Ok(Plan { half: 16 })
    }

    #[test]
    fn test_spatial_keys_and_metadata() {
        let mut repo = InMemoryRepository::new();
        repo.add_spatial("op", Plan { half: 30 }, Point::new(50, 50));
        let shape = ShapeDescriptor::spatial("op", 1, DimRange::new(1, 100), DimRange::new(1, 100));

        let mut driver = TilingDriver::new(&Around, &synth, &repo);
        let mut sink = InMemorySink::new();
        let cases = driver.calc_tiling_with_sink(&shape, &mut sink).unwrap();

        assert_eq!(cases[0].region, Region::Rect(Rect::new(20, 80, 20, 80)));
        assert!(cases.len() > 1);
        for (i, c) in cases.iter().enumerate() {
            assert_eq!(c.key, i as u64);
        }
        assert_eq!(sink.get(TILING_MODE), Some(&json!("dynamic_hw")));
        assert_eq!(sink.get(TILING_RANGE).unwrap()["0"], json!([[20, 80], [20, 80]]));

        // Keys keep counting on the next shape.
        let again = driver.calc_tiling(&shape).unwrap();
        assert_eq!(again[0].key, cases.len() as u64);
    }

    #[test]
    fn test_batch_without_seeds() {
        let repo = InMemoryRepository::<Plan>::new();
        let shape = ShapeDescriptor::batched("op", DimRange::new(1, 1000), 32, 32);
        let cases = calc_tiling(&shape, &Around, &synth, &repo, TilingConfig::default()).unwrap();
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].region, Region::Interval(DimRange::new(1, 1000)));
        assert_eq!(cases[0].source, CaseSource::CostModel { point: ShapePoint::Batch(500) });
    }

    #[test]
    fn test_unsupported_pattern() {
        let repo = InMemoryRepository::<Plan>::new();
        let mut shape = ShapeDescriptor::batched("op", DimRange::new(1, 8), 32, 32);
        shape.height = crate::shape::Dim::Dynamic(DimRange::new(1, 64));
        let err = calc_tiling(&shape, &Around, &synth, &repo, TilingConfig::default()).unwrap_err();
        assert!(matches!(err, TilingError::UnsupportedPattern(_)));
    }

    #[test]
    fn test_failed_call_keeps_keys() {
        use std::cell::Cell;

        let mut repo = InMemoryRepository::new();
        repo.add_spatial("op", Plan { half: 30 }, Point::new(50, 50));
        let shape = ShapeDescriptor::spatial("op", 1, DimRange::new(1, 100), DimRange::new(1, 100));

        // Fails on the first fallback request only.
        let calls = Cell::new(0);
        let flaky = |_: &ShapeDescriptor, _: ShapePoint| -> TilingResult<Plan> {
            calls.set(calls.get() + 1);
            if calls.get() == 1 {
                Err(TilingError::synthesis("cost model offline"))
            } else {
                Ok(Plan { half: 16 })
            }
        };

        let mut driver = TilingDriver::new(&Around, &flaky, &repo).with_first_key(7);
        assert!(driver.calc_tiling(&shape).is_err());
        let cases = driver.calc_tiling(&shape).unwrap();
        assert_eq!(cases[0].key, 7);
        for (i, c) in cases.iter().enumerate() {
            assert_eq!(c.key, 7 + i as u64);
        }
    }

    #[test]
    fn test_assign_keys_after_pending_built() {
        let repo = InMemoryRepository::<Plan>::new();
        let mut driver = TilingDriver::new(&Around, &synth, &repo);
        let source = CaseSource::CostModel { point: ShapePoint::Batch(1) };
        let pending = vec![
            (Plan { half: 1 }, Region::Interval(DimRange::new(1, 4)), source),
            (Plan { half: 2 }, Region::Interval(DimRange::new(5, 8)), source),
        ];
        let cases = driver.assign_keys(driver.drop_degenerate(pending));
        assert_eq!(cases.iter().map(|c| c.key).collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(driver.next_key, 2);
    }
}
