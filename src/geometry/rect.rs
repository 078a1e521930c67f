//! Closed-interval rectangles over the (H, W) shape plane.
//!
//! All bounds are inclusive. A rectangle `[top, bottom] x [left, right]`
//! covers every `(h, w)` with `top <= h <= bottom` and `left <= w <= right`.

use crate::geometry::{DimRange, Point};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An inclusive rectangle in (H, W) space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub top: i64,
    pub bottom: i64,
    pub left: i64,
    pub right: i64,
}

impl Rect {
    pub fn new(top: i64, bottom: i64, left: i64, right: i64) -> Self {
        Self { top, bottom, left, right }
    }

    /// Rectangle spanned by an H range and a W range.
    pub fn from_ranges(h: DimRange, w: DimRange) -> Self {
        Self::new(h.min, h.max, w.min, w.max)
    }

    /// The single-cell rectangle at `p`.
    pub fn point(p: Point) -> Self {
        Self::new(p.h, p.h, p.w, p.w)
    }

    pub fn height(&self) -> i64 {
        self.bottom - self.top + 1
    }

    pub fn width(&self) -> i64 {
        self.right - self.left + 1
    }

    /// Number of integer points covered, 0 for a malformed rectangle.
    pub fn area(&self) -> i64 {
        if self.is_well_formed() {
            self.height() * self.width()
        } else {
            0
        }
    }

    pub fn is_well_formed(&self) -> bool {
        self.top <= self.bottom && self.left <= self.right
    }

    pub fn h_range(&self) -> DimRange {
        DimRange::new(self.top, self.bottom)
    }

    pub fn w_range(&self) -> DimRange {
        DimRange::new(self.left, self.right)
    }

    /// Intersection with `other`, or `None` when they do not meet.
    pub fn overlap(&self, other: &Rect) -> Option<Rect> {
        let inter = Rect::new(
            self.top.max(other.top),
            self.bottom.min(other.bottom),
            self.left.max(other.left),
            self.right.min(other.right),
        );
        if inter.left > inter.right || inter.top > inter.bottom {
            None
        } else {
            Some(inter)
        }
    }

    /// Area of the intersection with `other` (0 when disjoint).
    pub fn overlap_area(&self, other: &Rect) -> i64 {
        self.overlap(other).map_or(0, |r| r.area())
    }

    /// Decompose `self \ cut` into at most four disjoint rectangles.
    ///
    /// Pieces come out in the order top strip, bottom strip, then the left
    /// and right strips of the row band shared with `cut`. The caller must
    /// have checked that `cut` overlaps `self`; a `cut` covering `self`
    /// yields no pieces.
    pub fn subtract(&self, cut: &Rect) -> Vec<Rect> {
        let mut pieces = Vec::with_capacity(4);

        if cut.top > self.top {
            pieces.push(Rect::new(self.top, cut.top - 1, self.left, self.right));
        }
        if cut.bottom < self.bottom {
            pieces.push(Rect::new(cut.bottom + 1, self.bottom, self.left, self.right));
        }

        let band_top = self.top.max(cut.top);
        let band_bottom = self.bottom.min(cut.bottom);
        if cut.left > self.left {
            pieces.push(Rect::new(band_top, band_bottom, self.left, cut.left - 1));
        }
        if cut.right < self.right {
            pieces.push(Rect::new(band_top, band_bottom, cut.right + 1, self.right));
        }

        pieces
    }

    /// Inclusive point membership on both axes.
    pub fn contains(&self, p: Point) -> bool {
        self.top <= p.h && p.h <= self.bottom && self.left <= p.w && p.w <= self.right
    }

    pub fn contains_rect(&self, other: &Rect) -> bool {
        self.top <= other.top
            && other.bottom <= self.bottom
            && self.left <= other.left
            && other.right <= self.right
    }

    /// Smallest rectangle enclosing both `self` and `other`.
    pub fn bounding(&self, other: &Rect) -> Rect {
        Rect::new(
            self.top.min(other.top),
            self.bottom.max(other.bottom),
            self.left.min(other.left),
            self.right.max(other.right),
        )
    }

    /// Smallest rectangle enclosing `self` and the point `p`.
    pub fn extend_to(&self, p: Point) -> Rect {
        self.bounding(&Rect::point(p))
    }

    /// Integer midpoint, always inside a well-formed rectangle.
    pub fn midpoint(&self) -> Point {
        Point::new(
            self.top + (self.bottom - self.top) / 2,
            self.left + (self.right - self.left) / 2,
        )
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}] x [{}, {}]", self.top, self.bottom, self.left, self.right)
    }
}

/// Overlap of two rectangles as `(area, intersection)`.
///
/// The intersection is `None` exactly when the area is 0.
pub fn overlap(a: &Rect, b: &Rect) -> (i64, Option<Rect>) {
    match a.overlap(b) {
        Some(r) => (r.area(), Some(r)),
        None => (0, None),
    }
}

/// `base \ cut` as disjoint rectangles. See [`Rect::subtract`].
pub fn subtract(base: &Rect, cut: &Rect) -> Vec<Rect> {
    base.subtract(cut)
}

/// Inclusive point-in-rectangle test.
pub fn contains(point: Point, rect: &Rect) -> bool {
    rect.contains(point)
}

/// The part of `target` not covered by any of `regions`, as disjoint rectangles.
pub fn uncovered<'a, I>(target: &Rect, regions: I) -> Vec<Rect>
where
    I: IntoIterator<Item = &'a Rect>,
{
    let mut rest = vec![*target];
    for region in regions {
        let mut next = Vec::with_capacity(rest.len());
        for r in &rest {
            if r.overlap(region).is_some() {
                next.extend(r.subtract(region));
            } else {
                next.push(*r);
            }
        }
        rest = next;
        if rest.is_empty() {
            break;
        }
    }
    rest
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_area() {
        let a = Rect::new(1, 10, 1, 10);
        let b = Rect::new(5, 20, 8, 30);
        let (area, inter) = overlap(&a, &b);
        assert_eq!(inter, Some(Rect::new(5, 10, 8, 10)));
        assert_eq!(area, 6 * 3);
    }

    #[test]
    fn test_overlap_disjoint() {
        let a = Rect::new(1, 10, 1, 10);
        assert_eq!(overlap(&a, &Rect::new(11, 20, 1, 10)), (0, None));
        assert_eq!(overlap(&a, &Rect::new(1, 10, 11, 20)), (0, None));
    }

    #[test]
    fn test_overlap_touching_single_cell() {
        let a = Rect::new(1, 10, 1, 10);
        let b = Rect::new(10, 20, 10, 20);
        assert_eq!(overlap(&a, &b), (1, Some(Rect::new(10, 10, 10, 10))));
    }

    #[test]
    fn test_subtract_center_cut() {
        let base = Rect::new(1, 100, 1, 100);
        let cut = Rect::new(20, 80, 20, 80);
        let pieces = subtract(&base, &cut);
        assert_eq!(
            pieces,
            vec![
                Rect::new(1, 19, 1, 100),
                Rect::new(81, 100, 1, 100),
                Rect::new(20, 80, 1, 19),
                Rect::new(20, 80, 81, 100),
            ]
        );
        let total: i64 = pieces.iter().map(Rect::area).sum();
        assert_eq!(total, base.area() - cut.area());
    }

    #[test]
    fn test_subtract_full_cover() {
        let base = Rect::new(3, 5, 3, 5);
        assert!(subtract(&base, &Rect::new(1, 10, 1, 10)).is_empty());
        assert!(subtract(&base, &base).is_empty());
    }

    #[test]
    fn test_subtract_corner_cut() {
        let base = Rect::new(1, 10, 1, 10);
        let cut = Rect::new(6, 20, 6, 20);
        let pieces = subtract(&base, &cut);
        assert_eq!(pieces, vec![Rect::new(1, 5, 1, 10), Rect::new(6, 10, 1, 5)]);
    }

    #[test]
    fn test_contains_inclusive() {
        let r = Rect::new(1, 10, 5, 6);
        assert!(contains(Point::new(1, 5), &r));
        assert!(contains(Point::new(10, 6), &r));
        assert!(!contains(Point::new(11, 6), &r));
        assert!(!contains(Point::new(5, 4), &r));
    }

    #[test]
    fn test_extend_to_point() {
        let r = Rect::new(10, 20, 10, 20);
        assert_eq!(r.extend_to(Point::new(5, 15)), Rect::new(5, 20, 10, 20));
        assert_eq!(r.extend_to(Point::new(15, 15)), r);
    }

    #[test]
    fn test_midpoint_inside() {
        let r = Rect::new(3, 4, 7, 7);
        assert!(r.contains(r.midpoint()));
        assert_eq!(r.midpoint(), Point::new(3, 7));
    }

    #[test]
    fn test_uncovered() {
        let target = Rect::new(1, 10, 1, 10);
        let left = Rect::new(1, 10, 1, 5);
        let right = Rect::new(1, 10, 6, 10);
        assert!(uncovered(&target, [&left, &right]).is_empty());
        let gaps = uncovered(&target, [&left]);
        assert_eq!(gaps, vec![Rect::new(1, 10, 6, 10)]);
    }
}
