//! Greedy seed selection over a target rectangle.
//!
//! Seeds whose anchors fall inside the target are ranked by how much of the
//! target their coverage window overlaps. Each seed, in rank order, claims
//! whatever part of the still-unassigned rest area its window covers. The
//! claimed pieces decide the seed's region; the rest area left at the end is
//! handed to the cost-model fallback.

use crate::config::TilingConfig;
use crate::feasibility::FeasibilityOracle;
use crate::geometry::{Point, Rect};
use crate::plan::{SpatialSeed, TilingPlan};
use log::{debug, trace};
use std::cmp::Reverse;
use std::collections::HashSet;

/// Pairwise-disjoint rectangles not yet assigned to any case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestArea {
    rects: Vec<Rect>,
}

impl RestArea {
    pub fn new(target: Rect) -> Self {
        Self { rects: vec![target] }
    }

    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn area(&self) -> i64 {
        self.rects.iter().map(Rect::area).sum()
    }

    /// Remove everything `window` covers and return the removed pieces.
    ///
    /// Every rectangle of the current snapshot that meets `window` is
    /// replaced by its fragments outside the window; untouched rectangles
    /// carry over unchanged.
    pub fn cut(&mut self, window: &Rect) -> Vec<Rect> {
        let snapshot = std::mem::take(&mut self.rects);
        let mut pieces = Vec::new();
        let mut next = Vec::with_capacity(snapshot.len() + 3);

        for r in snapshot {
            match r.overlap(window) {
                Some(piece) => {
                    pieces.push(piece);
                    next.extend(r.subtract(window));
                }
                None => next.push(r),
            }
        }

        self.rects = next;
        pieces
    }

    pub fn into_rects(self) -> Vec<Rect> {
        self.rects
    }
}

/// A seed that claimed part of the target.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialAssignment<P> {
    pub plan: P,
    pub anchor: Point,
    pub window: Rect,
    /// Bounding rectangle of the claimed pieces, extended to the anchor
    pub region: Rect,
    /// Area actually claimed from the rest area
    pub claimed: i64,
}

/// Outcome of the greedy selection.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialSelection<P> {
    /// Assignments in selection order
    pub assigned: Vec<SpatialAssignment<P>>,
    /// Rest area no seed covered
    pub uncovered: Vec<Rect>,
}

struct Candidate<P> {
    seed: SpatialSeed<P>,
    window: Rect,
    score: i64,
}

/// Cover `target` greedily with `seeds`.
pub fn select_cover<P, O>(target: Rect, seeds: Vec<SpatialSeed<P>>, oracle: &O, config: &TilingConfig) -> SpatialSelection<P>
where
    P: TilingPlan,
    O: FeasibilityOracle<P> + ?Sized,
{
    let mut seen = HashSet::new();
    let mut candidates: Vec<Candidate<P>> = seeds
        .into_iter()
        .filter(|s| target.contains(s.anchor) && seen.insert(s.anchor))
        .map(|seed| {
            let window = oracle.coverage_window(&seed.plan, seed.anchor, config);
            let score = target.overlap_area(&window);
            trace!("candidate at {}: window {} scores {}", seed.anchor, window, score);
            Candidate { seed, window, score }
        })
        .collect();

    // Stable: equal scores keep repository order.
    candidates.sort_by_key(|c| Reverse(c.score));
    debug!("{} candidate seed(s) inside {}", candidates.len(), target);

    let mut rest = RestArea::new(target);
    let mut assigned = Vec::new();

    for Candidate { seed, window, .. } in candidates {
        let pieces = rest.cut(&window);
        if pieces.is_empty() {
            trace!("seed at {} claims nothing", seed.anchor);
            continue;
        }

        let claimed = pieces.iter().map(Rect::area).sum();
        let region = pieces
            .iter()
            .fold(Rect::point(seed.anchor), |acc, piece| acc.bounding(piece));
        debug!("seed at {} claims {} cell(s) in {} piece(s), region {}", seed.anchor, claimed, pieces.len(), region);

        assigned.push(SpatialAssignment {
            plan: seed.plan,
            anchor: seed.anchor,
            window,
            region,
            claimed,
        });
    }

    SpatialSelection {
        assigned,
        uncovered: rest.into_rects(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::uncovered;
    use std::collections::HashMap;

    #[derive(Debug, Clone, PartialEq)]
    struct Plan(u32);

    impl TilingPlan for Plan {
        fn primary_parallelism(&self) -> i64 {
            1
        }
    }

    /// Returns a fixed window per plan id.
    struct FixedWindows(HashMap<u32, Rect>);

    impl FeasibilityOracle<Plan> for FixedWindows {
        fn minimal_bound(&self, _plan: &Plan) -> Point {
            Point::splat(1)
        }

        fn is_feasible(&self, _plan: &Plan, _size: Point) -> bool {
            true
        }

        fn coverage_window(&self, plan: &Plan, anchor: Point, _config: &TilingConfig) -> Rect {
            self.0.get(&plan.0).copied().unwrap_or(Rect::point(anchor))
        }
    }

    fn assert_disjoint(rects: &[Rect]) {
        for (i, a) in rects.iter().enumerate() {
            for b in &rects[i + 1..] {
                assert_eq!(a.overlap_area(b), 0, "{} overlaps {}", a, b);
            }
        }
    }

    #[test]
    fn test_rest_area_cut() {
        let mut rest = RestArea::new(Rect::new(1, 100, 1, 100));
        let pieces = rest.cut(&Rect::new(20, 80, 20, 80));
        assert_eq!(pieces, vec![Rect::new(20, 80, 20, 80)]);
        assert_eq!(rest.rects().len(), 4);
        assert_disjoint(rest.rects());
        assert_eq!(rest.area(), 100 * 100 - 61 * 61);

        // A window spanning two fragments claims a piece from each.
        let pieces = rest.cut(&Rect::new(1, 30, 1, 10));
        assert_eq!(pieces.len(), 2);
        assert_disjoint(rest.rects());
        assert_eq!(rest.area(), 100 * 100 - 61 * 61 - 300);
    }

    #[test]
    fn test_single_seed_leaves_four_strips() {
        let oracle = FixedWindows(HashMap::from([(1, Rect::new(20, 80, 20, 80))]));
        let target = Rect::new(1, 100, 1, 100);
        let seeds = vec![SpatialSeed::new(Plan(1), Point::new(50, 50))];

        let sel = select_cover(target, seeds, &oracle, &TilingConfig::default());
        assert_eq!(sel.assigned.len(), 1);
        assert_eq!(sel.assigned[0].region, Rect::new(20, 80, 20, 80));
        assert_eq!(sel.uncovered.len(), 4);
        assert_disjoint(&sel.uncovered);

        let mut regions: Vec<&Rect> = sel.uncovered.iter().collect();
        regions.push(&sel.assigned[0].region);
        assert!(uncovered(&target, regions).is_empty());
    }

    #[test]
    fn test_no_seeds_leaves_target() {
        let oracle = FixedWindows(HashMap::new());
        let target = Rect::new(1, 64, 1, 64);
        let sel = select_cover::<Plan, _>(target, vec![], &oracle, &TilingConfig::default());
        assert!(sel.assigned.is_empty());
        assert_eq!(sel.uncovered, vec![target]);
    }

    #[test]
    fn test_anchor_outside_target_ignored() {
        let oracle = FixedWindows(HashMap::from([(1, Rect::new(1, 100, 1, 100))]));
        let target = Rect::new(1, 50, 1, 50);
        let seeds = vec![SpatialSeed::new(Plan(1), Point::new(60, 10))];
        let sel = select_cover(target, seeds, &oracle, &TilingConfig::default());
        assert!(sel.assigned.is_empty());
        assert_eq!(sel.uncovered, vec![target]);
    }

    #[test]
    fn test_duplicate_anchor_keeps_first() {
        let oracle = FixedWindows(HashMap::from([
            (1, Rect::new(1, 10, 1, 10)),
            (2, Rect::new(1, 20, 1, 20)),
        ]));
        let target = Rect::new(1, 20, 1, 20);
        let seeds = vec![
            SpatialSeed::new(Plan(1), Point::new(5, 5)),
            SpatialSeed::new(Plan(2), Point::new(5, 5)),
        ];
        let sel = select_cover(target, seeds, &oracle, &TilingConfig::default());
        assert_eq!(sel.assigned.len(), 1);
        assert_eq!(sel.assigned[0].plan, Plan(1));
        assert_eq!(sel.uncovered.len(), 2);
    }

    #[test]
    fn test_larger_window_selected_first() {
        let oracle = FixedWindows(HashMap::from([
            (1, Rect::new(1, 10, 1, 10)),
            (2, Rect::new(1, 40, 1, 40)),
        ]));
        let target = Rect::new(1, 40, 1, 40);
        let seeds = vec![
            SpatialSeed::new(Plan(1), Point::new(5, 5)),
            SpatialSeed::new(Plan(2), Point::new(30, 30)),
        ];
        let sel = select_cover(target, seeds, &oracle, &TilingConfig::default());
        // The big window consumes everything; the small one is a no-op.
        assert_eq!(sel.assigned.len(), 1);
        assert_eq!(sel.assigned[0].plan, Plan(2));
        assert!(sel.uncovered.is_empty());
    }

    #[test]
    fn test_region_includes_anchor() {
        // Seed 2's window sits entirely inside seed 1's, except the far column.
        let oracle = FixedWindows(HashMap::from([
            (1, Rect::new(1, 30, 1, 30)),
            (2, Rect::new(10, 20, 10, 31)),
        ]));
        let target = Rect::new(1, 30, 1, 31);
        let seeds = vec![
            SpatialSeed::new(Plan(1), Point::new(15, 15)),
            SpatialSeed::new(Plan(2), Point::new(15, 20)),
        ];
        let sel = select_cover(target, seeds, &oracle, &TilingConfig::default());
        assert_eq!(sel.assigned.len(), 2);
        let second = &sel.assigned[1];
        assert_eq!(second.claimed, 11);
        assert!(second.region.contains(second.anchor));
        assert_eq!(second.region, Rect::new(10, 20, 20, 31));
        assert_eq!(sel.uncovered.len(), 2);
    }
}
