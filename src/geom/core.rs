use std::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// Tolerance used by the fuzzy comparisons below, matching the behaviour of
/// the classic `qFuzzyCompare` pair of helpers the drafting math was written
/// against.
pub const FUZZY_EPSILON: f64 = 1e-12;

/// Tolerance for "point lies on segment" membership checks, in internal
/// units (pixels).
pub const ON_SEGMENT_EPSILON: f64 = 1e-6;

#[must_use]
pub fn fuzzy_is_null(value: f64) -> bool {
    value.abs() <= FUZZY_EPSILON
}

#[must_use]
pub fn fuzzy_compare(a: f64, b: f64) -> bool {
    (a - b).abs() <= FUZZY_EPSILON * a.abs().min(b.abs())
}

/// Fuzzy equality that also works when either operand is (near) zero.
#[must_use]
pub fn fuzzy_equal(a: f64, b: f64) -> bool {
    if fuzzy_is_null(a) {
        return fuzzy_is_null(b);
    }
    if fuzzy_is_null(b) {
        return false;
    }
    fuzzy_compare(a, b)
}

/// Normalize an angle in degrees into `[0, 360)`.
///
/// The `angle - 360 * floor(angle / 360)` form is deliberate: unlike a plain
/// `%` it maps negative inputs into the positive range.
#[must_use]
pub fn normalize_angle(angle: f64) -> f64 {
    let normalized = angle - 360.0 * (angle / 360.0).floor();
    if fuzzy_equal(normalized, 360.0) {
        0.0
    } else {
        normalized
    }
}

/// A bare 2D coordinate. Angles across the crate are degrees,
/// counter-clockwise, y-up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub const ORIGIN: Self = Self::new(0.0, 0.0);

    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn distance_to(self, other: Self) -> f64 {
        (other - self).length()
    }

    #[must_use]
    pub fn fuzzy_eq(self, other: Self) -> bool {
        fuzzy_equal(self.x, other.x) && fuzzy_equal(self.y, other.y)
    }

    /// Linear interpolation towards `other`.
    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        Self::new(self.x + (other.x - self.x) * t, self.y + (other.y - self.y) * t)
    }

    #[must_use]
    pub fn midpoint(self, other: Self) -> Self {
        self.lerp(other, 0.5)
    }
}

/// A 2D displacement. Kept separate from [`Point2`] so the arithmetic below
/// reads as geometry, not coordinate soup.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Unit displacement at `angle` degrees.
    #[must_use]
    pub fn from_angle(angle: f64) -> Self {
        let radians = angle.to_radians();
        Self::new(radians.cos(), radians.sin())
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    #[must_use]
    pub fn dot(self, rhs: Self) -> f64 {
        self.x * rhs.x + self.y * rhs.y
    }

    /// Z component of the 3D cross product; sign gives orientation.
    #[must_use]
    pub fn cross(self, rhs: Self) -> f64 {
        self.x * rhs.y - self.y * rhs.x
    }

    /// Direction of the displacement in degrees, normalized to `[0, 360)`.
    /// A null displacement reports 0.
    #[must_use]
    pub fn angle(self) -> f64 {
        if fuzzy_is_null(self.x) && fuzzy_is_null(self.y) {
            return 0.0;
        }
        normalize_angle(self.y.atan2(self.x).to_degrees())
    }
}

impl Add<Vec2> for Point2 {
    type Output = Point2;

    fn add(self, rhs: Vec2) -> Point2 {
        Point2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point2 {
    type Output = Vec2;

    fn sub(self, rhs: Point2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;

    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

/// A finite line segment, also used as a carrier for the "set angle, then
/// length" construction idiom the drafting formulas rely on.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Line2 {
    pub p1: Point2,
    pub p2: Point2,
}

impl Line2 {
    #[must_use]
    pub const fn new(p1: Point2, p2: Point2) -> Self {
        Self { p1, p2 }
    }

    /// Build a segment from `p1` at the given angle (degrees) and length.
    /// Length may be negative; the segment then points the opposite way.
    #[must_use]
    pub fn from_polar(p1: Point2, length: f64, angle: f64) -> Self {
        Self::new(p1, p1 + Vec2::from_angle(angle) * length)
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.p1.distance_to(self.p2)
    }

    #[must_use]
    pub fn is_null(self) -> bool {
        self.p1.fuzzy_eq(self.p2)
    }

    /// Direction of the segment in degrees, `[0, 360)`.
    #[must_use]
    pub fn angle(self) -> f64 {
        (self.p2 - self.p1).angle()
    }

    /// Rotate the segment around `p1` to the given direction, keeping its
    /// length.
    #[must_use]
    pub fn with_angle(self, angle: f64) -> Self {
        Self::from_polar(self.p1, self.length(), angle)
    }

    /// Keep the direction, change the length. A null segment stays null.
    #[must_use]
    pub fn with_length(self, length: f64) -> Self {
        if self.is_null() {
            return self;
        }
        Self::from_polar(self.p1, length, self.angle())
    }

    /// Counter-clockwise angle from this segment's direction to `other`'s,
    /// in `[0, 360)`.
    #[must_use]
    pub fn angle_to(self, other: Self) -> f64 {
        normalize_angle(other.angle() - self.angle())
    }

    /// Segment rotated +90 degrees around `p1`, same length.
    #[must_use]
    pub fn normal_vector(self) -> Self {
        self.with_angle(self.angle() + 90.0)
    }

    #[must_use]
    pub fn point_at(self, t: f64) -> Point2 {
        self.p1.lerp(self.p2, t)
    }

    /// Coefficients of the infinite line `ax + by + c = 0` through the
    /// segment.
    #[must_use]
    pub fn coefficients(self) -> (f64, f64, f64) {
        let a = self.p2.y - self.p1.y;
        let b = self.p1.x - self.p2.x;
        let c = -a * self.p1.x - b * self.p1.y;
        (a, b, c)
    }

    /// Projection of `point` onto the infinite carrier line.
    #[must_use]
    pub fn closest_point(self, point: Point2) -> Point2 {
        let direction = self.p2 - self.p1;
        let denominator = direction.dot(direction);
        if fuzzy_is_null(denominator) {
            return self.p1;
        }
        let t = (point - self.p1).dot(direction) / denominator;
        self.p1 + direction * t
    }

    /// True when `point` lies on the segment within [`ON_SEGMENT_EPSILON`].
    #[must_use]
    pub fn contains_point(self, point: Point2) -> bool {
        let direction = self.p2 - self.p1;
        let offset = point - self.p1;
        if direction.cross(offset).abs() > ON_SEGMENT_EPSILON * direction.length().max(1.0) {
            return false;
        }
        let along = offset.dot(direction);
        -ON_SEGMENT_EPSILON <= along && along <= direction.dot(direction) + ON_SEGMENT_EPSILON
    }
}

/// Result of intersecting two segments' carrier lines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intersection {
    /// Parallel or coincident carriers (within tolerance).
    None,
    /// Intersection inside both segments.
    Bounded(Point2),
    /// Carrier lines cross outside at least one of the segments.
    Unbounded(Point2),
}

impl Intersection {
    #[must_use]
    pub fn point(self) -> Option<Point2> {
        match self {
            Self::None => None,
            Self::Bounded(p) | Self::Unbounded(p) => Some(p),
        }
    }
}

/// Intersect two segments, with an explicit near-parallel guard so that
/// floating-point noise never turns parallel lines into a far-away
/// "intersection".
#[must_use]
pub fn intersect_lines(line1: Line2, line2: Line2) -> Intersection {
    const PARALLEL_TOLERANCE: f64 = 1e-6;

    let d1 = line1.p2 - line1.p1;
    let d2 = line2.p2 - line2.p1;
    let denominator = d1.cross(d2);

    if denominator.abs() < PARALLEL_TOLERANCE {
        return Intersection::None;
    }

    let offset = line2.p1 - line1.p1;
    let t = offset.cross(d2) / denominator;
    let u = offset.cross(d1) / denominator;
    let point = line1.p1 + d1 * t;

    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Intersection::Bounded(point)
    } else {
        Intersection::Unbounded(point)
    }
}
