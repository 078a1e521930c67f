//! Cost-model fallback for area no seed covers.
//!
//! Uncovered rectangles are processed generation by generation: each
//! generation takes exactly the rectangles queued when it started, asks the
//! cost model for a plan at each rectangle's midpoint, assigns the part the
//! plan's window covers, and queues the leftover fragments for the next
//! generation. Every step assigns at least one cell, so the loop ends.

use crate::config::TilingConfig;
use crate::feasibility::FeasibilityOracle;
use crate::geometry::{Point, Rect};
use crate::shape::{ShapeDescriptor, ShapePoint};
use crate::utils::errors::{TilingError, TilingResult};
use log::{debug, trace};
use std::collections::VecDeque;

/// On-demand plan synthesis (the cost model).
pub trait SynthesisOracle<P> {
    /// Produce a plan tuned for `point` of `shape`.
    fn synthesize(&self, shape: &ShapeDescriptor, point: ShapePoint) -> TilingResult<P>;
}

impl<P, F> SynthesisOracle<P> for F
where
    F: Fn(&ShapeDescriptor, ShapePoint) -> TilingResult<P>,
{
    fn synthesize(&self, shape: &ShapeDescriptor, point: ShapePoint) -> TilingResult<P> {
        self(shape, point)
    }
}

/// A plan synthesized for part of an uncovered rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesizedAssignment<P> {
    pub plan: P,
    /// Point the plan was synthesized for
    pub point: Point,
    pub region: Rect,
}

/// Cover every rectangle in `uncovered` with synthesized plans.
///
/// Fails without partial output if the oracle fails or if a synthesized
/// plan's window misses the rectangle it was made for.
pub fn fill_uncovered<P, O, S>(
    shape: &ShapeDescriptor,
    uncovered: Vec<Rect>,
    feasibility: &O,
    synthesis: &S,
    config: &TilingConfig,
) -> TilingResult<Vec<SynthesizedAssignment<P>>>
where
    O: FeasibilityOracle<P> + ?Sized,
    S: SynthesisOracle<P> + ?Sized,
{
    let mut queue: VecDeque<Rect> = uncovered.into();
    let mut assigned = Vec::new();
    let mut generation = 0usize;

    while !queue.is_empty() {
        let batch = queue.len();
        debug!("fallback generation {}: {} rectangle(s)", generation, batch);

        for _ in 0..batch {
            let rect = match queue.pop_front() {
                Some(r) => r,
                None => break,
            };
            let point = rect.midpoint();
            let plan = synthesis.synthesize(shape, ShapePoint::Spatial(point))?;
            let window = feasibility.coverage_window(&plan, point, config);

            let region = match rect.overlap(&window) {
                Some(r) => r,
                None => return Err(TilingError::SynthesisInconsistency { rect, window }),
            };
            trace!("synthesized plan at {} covers {} of {}", point, region, rect);

            queue.extend(rect.subtract(&window));
            assigned.push(SynthesizedAssignment { plan, point, region });
        }

        generation += 1;
    }

    Ok(assigned)
}
