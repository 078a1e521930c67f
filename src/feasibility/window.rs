//! Coverage-window computation.
//!
//! A window starts as the raw feasible region found by an outward grid
//! search from the anchor, is then clamped to a locality box around the
//! anchor, and finally shrunk so an `H * W <= C` capacity bound holds at
//! every point inside it.

use crate::config::TilingConfig;
use crate::feasibility::FeasibilityOracle;
use crate::geometry::{DimRange, Point, Rect};
use log::trace;

/// Outward grid search along one axis.
///
/// Steps up from `anchor` by `step` while `feasible` holds, never past
/// `ceiling`, then steps down the same way, never below `floor`. The last
/// feasible value in each direction becomes the bound. The anchor itself is
/// always part of the result.
pub fn grid_search<F>(anchor: i64, step: i64, floor: i64, ceiling: i64, mut feasible: F) -> DimRange
where
    F: FnMut(i64) -> bool,
{
    let step = step.max(1);
    let floor = floor.min(anchor);
    let ceiling = ceiling.max(anchor);

    let mut upper = anchor;
    while upper < ceiling {
        let next = (upper + step).min(ceiling);
        if !feasible(next) {
            break;
        }
        upper = next;
    }

    let mut lower = anchor;
    while lower > floor {
        let next = (lower - step).max(floor);
        if !feasible(next) {
            break;
        }
        lower = next;
    }

    DimRange::new(lower, upper)
}

/// The feasible window of `plan` around `anchor`, before any clamping.
///
/// H is searched with W held at the anchor, and W with H held at the anchor.
pub fn raw_window<P, O>(oracle: &O, plan: &P, anchor: Point, config: &TilingConfig) -> Rect
where
    O: FeasibilityOracle<P> + ?Sized,
{
    let min = oracle.minimal_bound(plan);
    let h = grid_search(anchor.h, config.step.h, min.h.max(1), config.ceiling.h, |h| {
        oracle.is_feasible(plan, Point::new(h, anchor.w))
    });
    let w = grid_search(anchor.w, config.step.w, min.w.max(1), config.ceiling.w, |w| {
        oracle.is_feasible(plan, Point::new(anchor.h, w))
    });
    Rect::from_ranges(h, w)
}

/// Clamp `window` to `[anchor - L, anchor + L]` on each axis.
pub fn clamp_locality(window: Rect, anchor: Point, locality: Point) -> Rect {
    Rect::new(
        window.top.max(anchor.h - locality.h),
        window.bottom.min(anchor.h + locality.h),
        window.left.max(anchor.w - locality.w),
        window.right.min(anchor.w + locality.w),
    )
}

/// Shrink `window` so that `h * w <= capacity` everywhere inside it.
///
/// The product peaks at the bottom-right corner. One axis is shrunk when
/// that alone keeps the anchor inside, picking the axis that keeps more
/// area. Otherwise H is cut back to the anchor row and W shrunk to fit.
/// An anchor that itself breaks the bound collapses the window to the
/// anchor point.
pub fn clamp_capacity(window: Rect, anchor: Point, capacity: i64) -> Rect {
    if window.bottom * window.right <= capacity {
        return window;
    }
    if anchor.h * anchor.w > capacity {
        return Rect::point(anchor);
    }

    let by_width = {
        let right = capacity / window.bottom;
        (right >= anchor.w).then_some(Rect { right, ..window })
    };
    let by_height = {
        let bottom = capacity / window.right;
        (bottom >= anchor.h).then_some(Rect { bottom, ..window })
    };

    match (by_width, by_height) {
        (Some(a), Some(b)) => {
            if a.area() >= b.area() {
                a
            } else {
                b
            }
        }
        (Some(a), None) => a,
        (None, Some(b)) => b,
        (None, None) => Rect {
            bottom: anchor.h,
            right: (capacity / anchor.h).min(window.right),
            ..window
        },
    }
}

/// Full coverage window: raw search, locality clamp, then capacity clamp.
pub fn coverage_window<P, O>(oracle: &O, plan: &P, anchor: Point, config: &TilingConfig) -> Rect
where
    O: FeasibilityOracle<P> + ?Sized,
{
    let raw = raw_window(oracle, plan, anchor, config);
    let local = clamp_locality(raw, anchor, config.locality);
    let window = match oracle.capacity_bound(plan) {
        Some(capacity) => clamp_capacity(local, anchor, capacity),
        None => local,
    };
    trace!("window at {}: raw {} -> local {} -> final {}", anchor, raw, local, window);
    window
}
