use crate::geom::CurveInfo;
use crate::geom::bezier::{Cubic, polyline_length};
use crate::geom::core::{Line2, Point2, Vec2, fuzzy_is_null, normalize_angle};
use crate::geom::point::{flip_point, move_point, rotate_point};

/// A circular arc from `f1` to `f2` degrees around `center`. Travel is
/// counter-clockwise unless `flipped`.
#[derive(Debug, Clone, PartialEq)]
pub struct Arc {
    pub info: CurveInfo,
    pub center: Point2,
    pub radius: f64,
    pub f1: f64,
    pub f2: f64,
    pub flipped: bool,
    allow_empty: bool,
}

impl Arc {
    #[must_use]
    pub fn new(center: Point2, radius: f64, f1: f64, f2: f64) -> Self {
        Self {
            info: CurveInfo::named(""),
            center,
            radius,
            f1: normalize_angle(f1),
            f2: normalize_angle(f2),
            flipped: false,
            allow_empty: false,
        }
    }

    /// Arc defined by its start angle and arc length. A negative length
    /// travels clockwise.
    #[must_use]
    pub fn from_length(center: Point2, radius: f64, f1: f64, length: f64) -> Self {
        let sweep = (length.abs() / radius.abs()).to_degrees();
        let mut arc = if length < 0.0 {
            let mut arc = Self::new(center, radius, f1, f1 - sweep);
            arc.flipped = true;
            arc
        } else {
            Self::new(center, radius, f1, f1 + sweep)
        };
        arc.allow_empty = true;
        arc
    }

    /// Marks the arc as a legitimate zero-sweep artifact (a cut at an
    /// endpoint) instead of a full circle.
    #[must_use]
    pub fn with_allow_empty(mut self, allow_empty: bool) -> Self {
        self.allow_empty = allow_empty;
        self
    }

    #[must_use]
    pub fn with_info(mut self, info: CurveInfo) -> Self {
        self.info = info;
        self
    }

    /// Swept angle in degrees, `[0, 360]`. A coincident start and end means
    /// a full circle unless the arc allows being empty.
    #[must_use]
    pub fn sweep(&self) -> f64 {
        let diff = if self.flipped {
            normalize_angle(self.f1 - self.f2)
        } else {
            normalize_angle(self.f2 - self.f1)
        };
        if fuzzy_is_null(diff) {
            if self.allow_empty { 0.0 } else { 360.0 }
        } else {
            diff
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        fuzzy_is_null(self.sweep())
    }

    /// Arc length, always non-negative.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.radius.abs() * self.sweep().to_radians()
    }

    /// Point on the circle at the given angle in degrees.
    #[must_use]
    pub fn point_at_angle(&self, angle: f64) -> Point2 {
        self.center + Vec2::from_angle(angle) * self.radius.abs()
    }

    #[must_use]
    pub fn start_point(&self) -> Point2 {
        self.point_at_angle(self.f1)
    }

    #[must_use]
    pub fn end_point(&self) -> Point2 {
        self.point_at_angle(self.f2)
    }

    /// Signed angular step per unit of travel: +1 for counter-clockwise
    /// arcs, -1 for flipped ones.
    fn direction(&self) -> f64 {
        if self.flipped { -1.0 } else { 1.0 }
    }

    /// Flatten the arc into a polyline. The sweep is divided into sections
    /// of at most 45 degrees, each approximated by a cubic whose control
    /// distance is `r * 4/3 * tan(sweep/4)`, then flattened adaptively.
    #[must_use]
    pub fn points(&self, scale: f64) -> Vec<Point2> {
        let sweep = self.sweep();
        if fuzzy_is_null(sweep) {
            return vec![self.start_point()];
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let sections = (sweep / 45.0).ceil().max(1.0) as usize;
        let step = sweep / sections as f64 * self.direction();

        let mut points: Vec<Point2> = Vec::new();
        for section in 0..sections {
            let start = self.f1 + step * section as f64;
            let end = start + step;
            let cubic = self.section_cubic(start, end);
            let section_points = cubic.points(scale);
            let skip = usize::from(!points.is_empty());
            points.extend(section_points.into_iter().skip(skip));
        }
        points
    }

    /// True when the circle point at `angle` lies on the swept range.
    #[must_use]
    pub fn contains_angle(&self, angle: f64) -> bool {
        let travelled = if self.flipped {
            normalize_angle(self.f1 - angle)
        } else {
            normalize_angle(angle - self.f1)
        };
        travelled <= self.sweep() + 1e-9
    }

    /// The cubic sections backing [`Self::points`], for callers that need
    /// the curve itself rather than a polyline.
    #[must_use]
    pub fn cubics(&self) -> Vec<Cubic> {
        let sweep = self.sweep();
        if fuzzy_is_null(sweep) {
            return Vec::new();
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let sections = (sweep / 45.0).ceil().max(1.0) as usize;
        let step = sweep / sections as f64 * self.direction();
        (0..sections)
            .map(|section| {
                let start = self.f1 + step * section as f64;
                self.section_cubic(start, start + step)
            })
            .collect()
    }

    /// Cubic approximation of the slice from `start` to `end` degrees
    /// (at most a quarter turn apart).
    fn section_cubic(&self, start: f64, end: f64) -> Cubic {
        let radius = self.radius.abs();
        let delta = (end - start).to_radians();
        let control_distance = radius * (4.0 / 3.0) * (delta / 4.0).tan();

        let p1 = self.point_at_angle(start);
        let p2 = self.point_at_angle(end);
        // Tangents point along the travel direction.
        let c1 = p1 + Vec2::from_angle(start + 90.0) * control_distance;
        let c2 = p2 + Vec2::from_angle(end + 90.0) * -control_distance;
        Cubic::new(p1, c1, c2, p2)
    }

    /// Polyline length at the given approximation scale; mainly a
    /// cross-check for [`Self::length`].
    #[must_use]
    pub fn polyline_length(&self, scale: f64) -> f64 {
        polyline_length(&self.points(scale))
    }

    /// Cut at an arc length from the start (already validated to lie in
    /// `[0, length()]`). Returns the cut point and the two sub-arcs; a cut
    /// at either end produces one legitimately empty sub-arc.
    #[must_use]
    pub fn cut_at(&self, length: f64) -> (Point2, Arc, Arc) {
        let delta = (length / self.radius.abs()).to_degrees() * self.direction();
        let cut_angle = normalize_angle(self.f1 + delta);

        let mut first = self.clone();
        first.f2 = cut_angle;
        first.allow_empty = true;

        let mut second = self.clone();
        second.f1 = cut_angle;
        second.allow_empty = true;

        (self.point_at_angle(cut_angle), first, second)
    }

    #[must_use]
    pub fn rotate(&self, origin: Point2, degrees: f64, suffix: &str) -> Self {
        let mut arc = self.clone();
        arc.info = self.info.derived(suffix);
        arc.center = rotate_point(self.center, origin, degrees);
        arc.f1 = normalize_angle(self.f1 + degrees);
        arc.f2 = normalize_angle(self.f2 + degrees);
        arc
    }

    /// Mirror across the carrier line of `axis`; the travel direction
    /// reverses, so the flipped flag toggles.
    #[must_use]
    pub fn flip(&self, axis: Line2, suffix: &str) -> Self {
        let axis_angle = axis.angle();
        let mut arc = self.clone();
        arc.info = self.info.derived(suffix);
        arc.center = flip_point(self.center, axis);
        arc.f1 = normalize_angle(2.0 * axis_angle - self.f1);
        arc.f2 = normalize_angle(2.0 * axis_angle - self.f2);
        arc.flipped = !self.flipped;
        arc
    }

    #[must_use]
    pub fn move_(&self, length: f64, angle: f64, suffix: &str) -> Self {
        let mut arc = self.clone();
        arc.info = self.info.derived(suffix);
        arc.center = move_point(self.center, length, angle);
        arc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::bezier::DEFAULT_APPROXIMATION_SCALE;

    fn quarter() -> Arc {
        Arc::new(Point2::ORIGIN, 10.0, 0.0, 90.0)
    }

    #[test]
    fn quarter_arc_length() {
        // The analytic length is authoritative; the flattened polyline only
        // has to track it within drawing accuracy at the default scale.
        let expected = 10.0 * std::f64::consts::FRAC_PI_2;
        assert!((quarter().length() - expected).abs() < 1e-9);
        assert!((quarter().polyline_length(DEFAULT_APPROXIMATION_SCALE) - expected).abs() < 0.05);
    }

    #[test]
    fn coincident_angles_mean_full_circle() {
        let arc = Arc::new(Point2::ORIGIN, 5.0, 30.0, 30.0);
        assert!((arc.sweep() - 360.0).abs() < 1e-9);
        assert!((arc.length() - 2.0 * std::f64::consts::PI * 5.0).abs() < 1e-9);
    }

    #[test]
    fn allow_empty_keeps_zero_sweep() {
        let arc = Arc::new(Point2::ORIGIN, 5.0, 30.0, 30.0).with_allow_empty(true);
        assert!(arc.is_empty());
        assert!(arc.length().abs() < 1e-9);
    }

    #[test]
    fn sweep_across_the_zero_axis() {
        let arc = Arc::new(Point2::ORIGIN, 5.0, 315.0, 45.0);
        assert!((arc.sweep() - 90.0).abs() < 1e-9);
    }

    #[test]
    fn cut_at_half_length_lands_on_the_diagonal() {
        let arc = quarter();
        let (point, first, second) = arc.cut_at(arc.length() / 2.0);
        assert!((point.x - 7.071).abs() < 1e-3);
        assert!((point.y - 7.071).abs() < 1e-3);
        assert!((first.sweep() - 45.0).abs() < 1e-9);
        assert!((second.sweep() - 45.0).abs() < 1e-9);
    }

    #[test]
    fn cut_at_the_start_leaves_an_empty_first_arc() {
        let arc = quarter();
        let (point, first, second) = arc.cut_at(0.0);
        assert!(point.fuzzy_eq(arc.start_point()));
        assert!(first.is_empty());
        assert!((second.sweep() - 90.0).abs() < 1e-9);
    }

    #[test]
    fn from_length_solves_the_end_angle() {
        let length = 10.0 * std::f64::consts::FRAC_PI_2;
        let arc = Arc::from_length(Point2::ORIGIN, 10.0, 0.0, length);
        assert!((arc.f2 - 90.0).abs() < 1e-9);
        assert!(!arc.flipped);

        let clockwise = Arc::from_length(Point2::ORIGIN, 10.0, 0.0, -length);
        assert!((clockwise.f2 - 270.0).abs() < 1e-9);
        assert!(clockwise.flipped);
        assert!((clockwise.length() - length).abs() < 1e-9);
    }

    #[test]
    fn flip_mirrors_angles_and_toggles_direction() {
        let axis = Line2::new(Point2::ORIGIN, Point2::new(1.0, 0.0));
        let arc = quarter().flip(axis, "_f");
        assert!((arc.f1 - 0.0).abs() < 1e-9);
        assert!((arc.f2 - 270.0).abs() < 1e-9);
        assert!(arc.flipped);
        assert!((arc.sweep() - 90.0).abs() < 1e-9);
        assert!(arc.end_point().fuzzy_eq(Point2::new(0.0, -10.0)));
    }

    #[test]
    fn rotate_carries_styling_and_suffix() {
        let mut arc = quarter();
        arc.info = CurveInfo::named("Arc_A_1");
        let rotated = arc.rotate(Point2::ORIGIN, 90.0, "_r");
        assert_eq!(rotated.info.name, "Arc_A_1_r");
        assert!((rotated.f1 - 90.0).abs() < 1e-9);
        assert!((rotated.f2 - 180.0).abs() < 1e-9);
    }

    #[test]
    fn points_start_and_end_on_the_arc() {
        let arc = quarter();
        let points = arc.points(DEFAULT_APPROXIMATION_SCALE);
        assert!(points.len() > 2);
        assert!(points[0].fuzzy_eq(arc.start_point()));
        assert!(points.last().unwrap().distance_to(arc.end_point()) < 1e-6);
    }
}
