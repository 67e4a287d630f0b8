//! Closed-form and sampled intersection routines plus the candidate
//! disambiguation vocabulary used by the intersection tools.

use serde::{Deserialize, Serialize};

use crate::geom::core::{
    Intersection, Line2, Point2, fuzzy_equal, fuzzy_is_null, intersect_lines,
};

/// Which of the two circle-circle solutions a tool wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrossCirclesPoint {
    FirstPoint,
    SecondPoint,
}

/// Vertical preference among curve-curve intersection candidates (y-up, so
/// highest means the greatest y).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VCrossCurvesPoint {
    Highest,
    Lowest,
}

/// Horizontal preference among curve-curve intersection candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HCrossCurvesPoint {
    Leftmost,
    Rightmost,
}

/// Solutions of a circle-circle intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CircleIntersections {
    None,
    /// Same center and radius; every point is shared.
    Coincident,
    Tangent(Point2),
    Two(Point2, Point2),
}

/// Intersect two circles in closed form. The two-solution ordering is fixed
/// by the formula so `FirstPoint`/`SecondPoint` picks are reproducible.
#[must_use]
pub fn intersect_circles(c1: Point2, r1: f64, c2: Point2, r2: f64) -> CircleIntersections {
    let d = c1.distance_to(c2);
    if fuzzy_is_null(d) {
        if fuzzy_equal(r1, r2) {
            return CircleIntersections::Coincident;
        }
        return CircleIntersections::None;
    }
    if d > r1 + r2 || d < (r1 - r2).abs() {
        return CircleIntersections::None;
    }

    let a = (r1 * r1 - r2 * r2 + d * d) / (2.0 * d);
    let h_squared = r1 * r1 - a * a;
    let base = Point2::new(
        c1.x + a * (c2.x - c1.x) / d,
        c1.y + a * (c2.y - c1.y) / d,
    );
    if h_squared <= 0.0 || fuzzy_is_null(h_squared.sqrt()) {
        return CircleIntersections::Tangent(base);
    }

    let h = h_squared.sqrt();
    let first = Point2::new(
        base.x + h * (c2.y - c1.y) / d,
        base.y - h * (c2.x - c1.x) / d,
    );
    let second = Point2::new(
        base.x - h * (c2.y - c1.y) / d,
        base.y + h * (c2.x - c1.x) / d,
    );
    CircleIntersections::Two(first, second)
}

/// Solutions of a line-circle intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineCircleIntersections {
    None,
    Tangent(Point2),
    /// Ordered along the line direction: `0` lies forward of the projection
    /// of the center, `1` behind it.
    Two(Point2, Point2),
}

/// Intersect the infinite carrier line of `line` with a circle, via the
/// projection of the center onto the line.
#[must_use]
pub fn intersect_line_circle(
    center: Point2,
    radius: f64,
    line: Line2,
) -> LineCircleIntersections {
    if line.is_null() {
        return LineCircleIntersections::None;
    }

    let projection = line.closest_point(center);
    let distance = center.distance_to(projection);
    if distance > radius.abs() {
        return LineCircleIntersections::None;
    }
    if fuzzy_equal(distance, radius.abs()) {
        return LineCircleIntersections::Tangent(projection);
    }

    let along = (radius * radius - distance * distance).sqrt();
    let carrier = Line2::new(projection, projection + (line.p2 - line.p1)).with_length(along);
    let forward = carrier.p2;
    let backward = Line2::new(projection, projection + (line.p1 - line.p2))
        .with_length(along)
        .p2;
    LineCircleIntersections::Two(forward, backward)
}

/// All bounded intersection points of two polylines, in walk order along the
/// first polyline, near-duplicates removed.
#[must_use]
pub fn intersect_polylines(first: &[Point2], second: &[Point2]) -> Vec<Point2> {
    const DUPLICATE_TOLERANCE: f64 = 1e-6;

    let mut found: Vec<Point2> = Vec::new();
    for a in first.windows(2) {
        for b in second.windows(2) {
            let segment_a = Line2::new(a[0], a[1]);
            let segment_b = Line2::new(b[0], b[1]);
            if let Intersection::Bounded(point) = intersect_lines(segment_a, segment_b) {
                let duplicate = found
                    .iter()
                    .any(|existing| existing.distance_to(point) < DUPLICATE_TOLERANCE);
                if !duplicate {
                    found.push(point);
                }
            }
        }
    }
    found
}

/// Narrow a list of intersection candidates to a single point: first the
/// vertical preference picks the extreme y (with a small tolerance band),
/// then the horizontal preference breaks the remaining tie.
#[must_use]
pub fn select_crossing(
    candidates: &[Point2],
    vertical: VCrossCurvesPoint,
    horizontal: HCrossCurvesPoint,
) -> Option<Point2> {
    const BAND: f64 = 1e-6;

    if candidates.is_empty() {
        return None;
    }

    let extreme_y = candidates
        .iter()
        .map(|p| p.y)
        .fold(f64::NAN, |best, y| match vertical {
            _ if best.is_nan() => y,
            VCrossCurvesPoint::Highest => best.max(y),
            VCrossCurvesPoint::Lowest => best.min(y),
        });

    let mut in_band: Vec<Point2> = candidates
        .iter()
        .copied()
        .filter(|p| (p.y - extreme_y).abs() <= BAND)
        .collect();

    in_band.sort_by(|a, b| a.x.total_cmp(&b.x));
    match horizontal {
        HCrossCurvesPoint::Leftmost => in_band.first().copied(),
        HCrossCurvesPoint::Rightmost => in_band.last().copied(),
    }
}
