//! Interval selection over a single symbolic dimension (batch).
//!
//! Seeds are sorted by anchor and each one covers from the running lower
//! bound up to its own anchor. The last seed takes the tail, so the target
//! is always fully covered when any seed exists.

use crate::fallback::SynthesisOracle;
use crate::geometry::DimRange;
use crate::plan::{BatchSeed, TilingPlan};
use crate::shape::{ShapeDescriptor, ShapePoint};
use crate::utils::errors::TilingResult;
use log::{debug, trace};

/// A plan bound to a batch interval.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchAssignment<P> {
    pub plan: P,
    /// Seed anchor, or `None` for a synthesized plan
    pub anchor: Option<i64>,
    /// Point the plan was synthesized for, if synthesized
    pub synthesized_at: Option<i64>,
    pub range: DimRange,
}

/// Cover `target` with `seeds`, synthesizing one plan if there are none.
pub fn select_intervals<P, S>(
    shape: &ShapeDescriptor,
    target: DimRange,
    mut seeds: Vec<BatchSeed<P>>,
    synthesis: &S,
) -> TilingResult<Vec<BatchAssignment<P>>>
where
    P: TilingPlan,
    S: SynthesisOracle<P> + ?Sized,
{
    if seeds.is_empty() {
        let point = target.midpoint();
        debug!("no batch seeds, synthesizing one plan at batch={}", point);
        let plan = synthesis.synthesize(shape, ShapePoint::Batch(point))?;
        return Ok(vec![BatchAssignment {
            plan,
            anchor: None,
            synthesized_at: Some(point),
            range: target,
        }]);
    }

    seeds.sort_by_key(|s| (s.anchor, s.plan.primary_parallelism()));

    let mut assigned = Vec::new();
    let mut lower = target.min;
    let last = seeds.len() - 1;
    let mut reached_max = false;

    for i in 0..last {
        let seed = &seeds[i];
        if seed.anchor == seeds[i + 1].anchor || seed.anchor < lower {
            trace!("skip batch seed at {} (lower bound {})", seed.anchor, lower);
            continue;
        }

        let range = DimRange::new(lower, seed.anchor.min(target.max));
        assigned.push(BatchAssignment {
            plan: seed.plan.clone(),
            anchor: Some(seed.anchor),
            synthesized_at: None,
            range,
        });
        lower = seed.anchor + 1;

        if seed.anchor >= target.max {
            reached_max = true;
            break;
        }
    }

    if !reached_max {
        let tail = &seeds[last];
        assigned.push(BatchAssignment {
            plan: tail.plan.clone(),
            anchor: Some(tail.anchor),
            synthesized_at: None,
            range: DimRange::new(lower, target.max),
        });
    }

    debug!("{} batch interval(s) over {}", assigned.len(), target);
    Ok(assigned)
}
