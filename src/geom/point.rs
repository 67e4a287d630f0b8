use serde::{Deserialize, Serialize};

use crate::geom::core::{Line2, Point2, Vec2};

/// Default label offset of a freshly drafted point, in pixels.
pub const DEFAULT_LABEL_OFFSET: f64 = 5.0;

/// A named drafting point: a coordinate plus label presentation state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub name: String,
    pub position: Point2,
    /// Label offset relative to the point.
    pub mx: f64,
    pub my: f64,
    pub show_label: bool,
}

impl Point {
    #[must_use]
    pub fn new(name: impl Into<String>, position: Point2) -> Self {
        Self {
            name: name.into(),
            position,
            mx: DEFAULT_LABEL_OFFSET,
            my: DEFAULT_LABEL_OFFSET,
            show_label: true,
        }
    }

    #[must_use]
    pub fn x(&self) -> f64 {
        self.position.x
    }

    #[must_use]
    pub fn y(&self) -> f64 {
        self.position.y
    }

    fn derived(&self, position: Point2, suffix: &str) -> Self {
        Self {
            name: format!("{}{suffix}", self.name),
            position,
            mx: self.mx,
            my: self.my,
            show_label: self.show_label,
        }
    }

    /// New point rotated around `origin` by `degrees` counter-clockwise,
    /// named with `suffix` appended.
    #[must_use]
    pub fn rotate(&self, origin: Point2, degrees: f64, suffix: &str) -> Self {
        self.derived(rotate_point(self.position, origin, degrees), suffix)
    }

    /// New point mirrored across the carrier line of `axis`.
    #[must_use]
    pub fn flip(&self, axis: Line2, suffix: &str) -> Self {
        self.derived(flip_point(self.position, axis), suffix)
    }

    /// New point displaced by `length` at `angle` degrees.
    #[must_use]
    pub fn move_(&self, length: f64, angle: f64, suffix: &str) -> Self {
        self.derived(move_point(self.position, length, angle), suffix)
    }
}

/// Rotate `point` around `origin` by `degrees` counter-clockwise.
#[must_use]
pub fn rotate_point(point: Point2, origin: Point2, degrees: f64) -> Point2 {
    let radians = degrees.to_radians();
    let (sin, cos) = radians.sin_cos();
    let offset = point - origin;
    origin
        + Vec2::new(
            offset.x * cos - offset.y * sin,
            offset.x * sin + offset.y * cos,
        )
}

/// Mirror `point` across the infinite carrier line of `axis`. A degenerate
/// axis reflects through its single point.
#[must_use]
pub fn flip_point(point: Point2, axis: Line2) -> Point2 {
    let projected = if axis.is_null() {
        axis.p1
    } else {
        axis.closest_point(point)
    };
    projected + (projected - point)
}

/// Displace `point` by `length` at `angle` degrees.
#[must_use]
pub fn move_point(point: Point2, length: f64, angle: f64) -> Point2 {
    point + Vec2::from_angle(angle) * length
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotate_quarter_turn() {
        let rotated = rotate_point(Point2::new(1.0, 0.0), Point2::ORIGIN, 90.0);
        assert!((rotated.x).abs() < 1e-12);
        assert!((rotated.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn flip_across_x_axis() {
        let axis = Line2::new(Point2::ORIGIN, Point2::new(1.0, 0.0));
        let flipped = flip_point(Point2::new(3.0, 4.0), axis);
        assert!(flipped.fuzzy_eq(Point2::new(3.0, -4.0)));
    }

    #[test]
    fn flip_across_diagonal_swaps_coordinates() {
        let axis = Line2::new(Point2::ORIGIN, Point2::new(1.0, 1.0));
        let flipped = flip_point(Point2::new(5.0, 1.0), axis);
        assert!(flipped.fuzzy_eq(Point2::new(1.0, 5.0)));
    }

    #[test]
    fn named_transforms_append_suffix_and_keep_label_state() {
        let mut point = Point::new("A", Point2::new(2.0, 0.0));
        point.show_label = false;
        point.mx = -10.0;

        let moved = point.move_(3.0, 90.0, "_m");
        assert_eq!(moved.name, "A_m");
        assert!(!moved.show_label);
        assert!((moved.mx + 10.0).abs() < f64::EPSILON);
        assert!(moved.position.fuzzy_eq(Point2::new(2.0, 3.0)));
    }
}
