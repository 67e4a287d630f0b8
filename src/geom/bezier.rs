//! Cubic Bezier workhorse routines shared by arcs, splines and paths:
//! adaptive flattening, arc-length, parameter search and de Casteljau
//! splitting.

use crate::geom::core::{Line2, Point2, Vec2, intersect_lines};

/// Bounds on the approximation scale a curve may carry. Scale 0 means "use
/// the document default".
pub const MIN_APPROXIMATION_SCALE: f64 = 0.2;
pub const MAX_APPROXIMATION_SCALE: f64 = 10.0;
pub const DEFAULT_APPROXIMATION_SCALE: f64 = 0.5;

const RECURSION_LIMIT: u32 = 32;
const COLLINEARITY_EPSILON: f64 = 1e-30;

/// Resolve a per-curve scale against the document default and clamp it to
/// the supported range.
#[must_use]
pub fn effective_scale(curve_scale: f64, default_scale: f64) -> f64 {
    let scale = if curve_scale > 0.0 { curve_scale } else { default_scale };
    scale.clamp(MIN_APPROXIMATION_SCALE, MAX_APPROXIMATION_SCALE)
}

/// Four control points of a cubic segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cubic {
    pub p1: Point2,
    pub c1: Point2,
    pub c2: Point2,
    pub p2: Point2,
}

impl Cubic {
    #[must_use]
    pub const fn new(p1: Point2, c1: Point2, c2: Point2, p2: Point2) -> Self {
        Self { p1, c1, c2, p2 }
    }

    /// Point on the curve at parameter `t` in `[0, 1]`.
    #[must_use]
    pub fn point_at(&self, t: f64) -> Point2 {
        let s = 1.0 - t;
        let b0 = s * s * s;
        let b1 = 3.0 * s * s * t;
        let b2 = 3.0 * s * t * t;
        let b3 = t * t * t;
        Point2::new(
            b0 * self.p1.x + b1 * self.c1.x + b2 * self.c2.x + b3 * self.p2.x,
            b0 * self.p1.y + b1 * self.c1.y + b2 * self.c2.y + b3 * self.p2.y,
        )
    }

    /// Flatten into a polyline. `scale` trades point count for fidelity; the
    /// flatness tolerance is `(0.5 / scale)^2` so larger scales keep more
    /// detail.
    #[must_use]
    pub fn points(&self, scale: f64) -> Vec<Point2> {
        let tolerance = (0.5 / scale).powi(2);
        let mut points = vec![self.p1];
        subdivide(self.p1, self.c1, self.c2, self.p2, tolerance, 0, &mut points);
        points.push(self.p2);
        points
    }

    /// Arc length, via the flattened polyline.
    #[must_use]
    pub fn length(&self, scale: f64) -> f64 {
        polyline_length(&self.points(scale))
    }

    /// Split at parameter `t` into two cubic segments.
    #[must_use]
    pub fn split_at(&self, t: f64) -> (Cubic, Cubic) {
        let p12 = self.p1.lerp(self.c1, t);
        let p23 = self.c1.lerp(self.c2, t);
        let p34 = self.c2.lerp(self.p2, t);
        let p123 = p12.lerp(p23, t);
        let p234 = p23.lerp(p34, t);
        let p1234 = p123.lerp(p234, t);
        (
            Cubic::new(self.p1, p12, p123, p1234),
            Cubic::new(p1234, p234, p34, self.p2),
        )
    }

    /// Parameter `t` where the arc length from the start reaches `length`,
    /// found by bisection. `length` is clamped to the curve.
    #[must_use]
    pub fn parameter_at_length(&self, length: f64, scale: f64) -> f64 {
        let full = self.length(scale);
        if length <= 0.0 {
            return 0.0;
        }
        if length >= full {
            return 1.0;
        }

        let mut low = 0.0_f64;
        let mut high = 1.0_f64;
        // 0.01 px is well below drafting accuracy.
        for _ in 0..100 {
            let mid = 0.5 * (low + high);
            let head = self.split_at(mid).0.length(scale);
            if (head - length).abs() < 0.01 {
                return mid;
            }
            if head < length {
                low = mid;
            } else {
                high = mid;
            }
        }
        0.5 * (low + high)
    }

    /// Cut at the given arc length: the cut point plus both halves.
    #[must_use]
    pub fn cut_at_length(&self, length: f64, scale: f64) -> (Point2, Cubic, Cubic) {
        let t = self.parameter_at_length(length, scale);
        let (head, tail) = self.split_at(t);
        (head.p2, head, tail)
    }
}

/// Adaptive subdivision. Pushes interior points only; the caller adds the
/// endpoints.
fn subdivide(
    p1: Point2,
    c1: Point2,
    c2: Point2,
    p2: Point2,
    tolerance: f64,
    level: u32,
    out: &mut Vec<Point2>,
) {
    if level >= RECURSION_LIMIT {
        return;
    }

    let chord = p2 - p1;
    let chord_sq = chord.dot(chord);

    // Distance of both control points from the chord, unnormalized.
    let d2 = chord.cross(c1 - p2).abs();
    let d3 = chord.cross(c2 - p2).abs();

    if chord_sq > COLLINEARITY_EPSILON {
        if (d2 + d3) * (d2 + d3) <= tolerance * chord_sq {
            // The control-point midpoint sits outside the curve and
            // compensates the chord shortfall of the accepted span.
            out.push(c1.midpoint(c2));
            return;
        }
    } else {
        // Degenerate chord: fall back to raw control point distances.
        let d2 = (c1 - p1).length();
        let d3 = (p2 - c2).length();
        if d2 + d3 <= tolerance.sqrt() {
            return;
        }
    }

    let p12 = p1.midpoint(c1);
    let p23 = c1.midpoint(c2);
    let p34 = c2.midpoint(p2);
    let p123 = p12.midpoint(p23);
    let p234 = p23.midpoint(p34);
    let p1234 = p123.midpoint(p234);

    subdivide(p1, p12, p123, p1234, tolerance, level + 1, out);
    out.push(p1234);
    subdivide(p1234, p234, p34, p2, tolerance, level + 1, out);
}

/// The cubic that passes through four points at parameters 0, 1/3, 2/3
/// and 1. Used to turn sampled curve sections back into segments.
#[must_use]
pub fn cubic_through(p0: Point2, p1: Point2, p2: Point2, p3: Point2) -> Cubic {
    let c1 = Point2::new(
        (-5.0 * p0.x + 18.0 * p1.x - 9.0 * p2.x + 2.0 * p3.x) / 6.0,
        (-5.0 * p0.y + 18.0 * p1.y - 9.0 * p2.y + 2.0 * p3.y) / 6.0,
    );
    let c2 = Point2::new(
        (2.0 * p0.x - 9.0 * p1.x + 18.0 * p2.x - 5.0 * p3.x) / 6.0,
        (2.0 * p0.y - 9.0 * p1.y + 18.0 * p2.y - 5.0 * p3.y) / 6.0,
    );
    Cubic::new(p0, c1, c2, p3)
}

#[must_use]
pub fn polyline_length(points: &[Point2]) -> f64 {
    points
        .windows(2)
        .map(|pair| pair[0].distance_to(pair[1]))
        .sum()
}

/// Offset a cubic by shifting its control polygon legs sideways and
/// re-intersecting them (Tiller-Hanson). Positive `width` offsets to the
/// left of the travel direction.
#[must_use]
pub fn offset_cubic(cubic: &Cubic, width: f64) -> Cubic {
    let legs = [
        Line2::new(cubic.p1, cubic.c1),
        Line2::new(cubic.c1, cubic.c2),
        Line2::new(cubic.c2, cubic.p2),
    ];

    // Degenerate legs inherit their neighbour's direction.
    let mut offset_legs = [Line2::default(); 3];
    for (index, leg) in legs.iter().enumerate() {
        let carrier = if leg.is_null() {
            let fallback = Line2::new(cubic.p1, cubic.p2);
            Line2::new(leg.p1, leg.p1 + (fallback.p2 - fallback.p1))
        } else {
            *leg
        };
        let normal = Vec2::from_angle(carrier.angle() + 90.0) * width;
        offset_legs[index] = Line2::new(leg.p1 + normal, leg.p2 + normal);
    }

    let c1 = intersect_lines(offset_legs[0], offset_legs[1])
        .point()
        .unwrap_or(offset_legs[0].p2);
    let c2 = intersect_lines(offset_legs[1], offset_legs[2])
        .point()
        .unwrap_or(offset_legs[2].p1);

    Cubic::new(offset_legs[0].p1, c1, c2, offset_legs[2].p2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight() -> Cubic {
        Cubic::new(
            Point2::new(0.0, 0.0),
            Point2::new(3.0, 0.0),
            Point2::new(7.0, 0.0),
            Point2::new(10.0, 0.0),
        )
    }

    #[test]
    fn straight_segment_length() {
        let length = straight().length(DEFAULT_APPROXIMATION_SCALE);
        assert!((length - 10.0).abs() < 1e-6);
    }

    #[test]
    fn flattening_starts_and_ends_at_endpoints() {
        let cubic = Cubic::new(
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 10.0),
            Point2::new(10.0, 10.0),
            Point2::new(10.0, 0.0),
        );
        let points = cubic.points(DEFAULT_APPROXIMATION_SCALE);
        assert!(points.len() > 2);
        assert!(points[0].fuzzy_eq(cubic.p1));
        assert!(points.last().unwrap().fuzzy_eq(cubic.p2));
    }

    #[test]
    fn flattened_quarter_circle_does_not_bow_inward() {
        // Standard cubic approximation of a radius 10 quarter circle. A
        // chord-only polyline underestimates the length; the accepted
        // control-midpoint samples keep it within drawing accuracy.
        let kappa = 10.0 * 0.552_284_749_8;
        let cubic = Cubic::new(
            Point2::new(10.0, 0.0),
            Point2::new(10.0, kappa),
            Point2::new(kappa, 10.0),
            Point2::new(0.0, 10.0),
        );
        let expected = 10.0 * std::f64::consts::FRAC_PI_2;
        let length = polyline_length(&cubic.points(DEFAULT_APPROXIMATION_SCALE));
        assert!((length - expected).abs() < 0.05, "length {length}");
    }

    #[test]
    fn higher_scale_samples_more_points() {
        let cubic = Cubic::new(
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 50.0),
            Point2::new(100.0, 50.0),
            Point2::new(100.0, 0.0),
        );
        let coarse = cubic.points(MIN_APPROXIMATION_SCALE).len();
        let fine = cubic.points(MAX_APPROXIMATION_SCALE).len();
        assert!(fine > coarse);
    }

    #[test]
    fn split_halves_meet_at_the_cut() {
        let cubic = Cubic::new(
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 20.0),
            Point2::new(30.0, 20.0),
            Point2::new(40.0, 0.0),
        );
        let (head, tail) = cubic.split_at(0.3);
        assert!(head.p2.fuzzy_eq(tail.p1));
        assert!(head.p2.fuzzy_eq(cubic.point_at(0.3)));
    }

    #[test]
    fn cut_at_half_length_of_straight_segment() {
        let (point, head, tail) = straight().cut_at_length(5.0, DEFAULT_APPROXIMATION_SCALE);
        assert!((point.x - 5.0).abs() < 0.05);
        assert!((head.length(DEFAULT_APPROXIMATION_SCALE) - 5.0).abs() < 0.05);
        assert!((tail.length(DEFAULT_APPROXIMATION_SCALE) - 5.0).abs() < 0.05);
    }

    #[test]
    fn offset_of_straight_segment_is_parallel() {
        let offset = offset_cubic(&straight(), 2.0);
        assert!((offset.p1.y - 2.0).abs() < 1e-9);
        assert!((offset.p2.y - 2.0).abs() < 1e-9);
        assert!((offset.p2.x - 10.0).abs() < 1e-9);
    }
}
