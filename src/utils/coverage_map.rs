//! Text rendering of which case owns each part of a target rectangle.
//!
//! The target is sampled on a grid of at most `max_cols x max_rows` cells;
//! each cell shows the glyph of the first case (in dispatch order) whose
//! region contains the sampled point, or `·` if none does.

use crate::case::{dispatch, TilingCase};
use crate::geometry::{Point, Rect};
use crate::shape::ShapePoint;
use std::fmt::Write;

const GLYPHS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Glyph used for the case at `index` in the case list.
pub fn glyph(index: usize) -> char {
    GLYPHS[index % GLYPHS.len()] as char
}

/// Sample coordinate `i` of `cells` evenly spread over `[lo, hi]`.
fn sample(lo: i64, hi: i64, i: i64, cells: i64) -> i64 {
    if cells <= 1 {
        lo
    } else {
        lo + (hi - lo) * i / (cells - 1)
    }
}

/// Render the coverage of `target` by `cases` (H down, W across).
pub fn render_coverage<P>(target: &Rect, cases: &[TilingCase<P>], max_cols: usize, max_rows: usize) -> String {
    let cols = target.width().min(max_cols.max(1) as i64);
    let rows = target.height().min(max_rows.max(1) as i64);
    let width = cols as usize + 10;
    let mut out = String::new();

    let _ = writeln!(out, "╔{}╗", "═".repeat(width));
    let _ = writeln!(out, "║ {:<w$}║", format!("h {} x w {}", target.h_range(), target.w_range()), w = width - 1);
    let _ = writeln!(out, "╠{}╣", "═".repeat(width));

    for r in 0..rows {
        let h = sample(target.top, target.bottom, r, rows);
        let mut line = String::with_capacity(cols as usize);
        for c in 0..cols {
            let w = sample(target.left, target.right, c, cols);
            let owner = cases
                .iter()
                .position(|case| case.region.contains(ShapePoint::Spatial(Point::new(h, w))));
            line.push(owner.map_or('·', glyph));
        }
        let _ = writeln!(out, "║ {:>6} {} ║", h, line);
    }

    let _ = writeln!(out, "╠{}╣", "═".repeat(width));
    for (i, case) in cases.iter().enumerate() {
        let _ = writeln!(out, "  {} key={:<4} {} ({})", glyph(i), case.key, case.region, case.source);
    }
    let _ = write!(out, "╚{}╝", "═".repeat(width));
    out
}

/// Count sampled cells not owned by any case.
pub fn count_gaps<P>(target: &Rect, cases: &[TilingCase<P>]) -> usize {
    let mut gaps = 0;
    for h in target.top..=target.bottom {
        for w in target.left..=target.right {
            if dispatch(cases, ShapePoint::Spatial(Point::new(h, w))).is_none() {
                gaps += 1;
            }
        }
    }
    gaps
}
