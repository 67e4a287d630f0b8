use crate::geom::CurveInfo;
use crate::geom::bezier::polyline_length;
use crate::geom::core::{Line2, Point2, Vec2, fuzzy_is_null, normalize_angle};
use crate::geom::point::{flip_point, move_point, rotate_point};

/// An elliptical arc: radii `r1` (along the ellipse x axis) and `r2`, swept
/// from `f1` to `f2` degrees in the ellipse frame, the whole frame rotated
/// by `rotation` degrees around `center`.
#[derive(Debug, Clone, PartialEq)]
pub struct EllipticalArc {
    pub info: CurveInfo,
    pub center: Point2,
    pub r1: f64,
    pub r2: f64,
    pub f1: f64,
    pub f2: f64,
    pub rotation: f64,
    pub flipped: bool,
    allow_empty: bool,
}

impl EllipticalArc {
    #[must_use]
    pub fn new(center: Point2, r1: f64, r2: f64, f1: f64, f2: f64, rotation: f64) -> Self {
        Self {
            info: CurveInfo::named(""),
            center,
            r1,
            r2,
            f1: normalize_angle(f1),
            f2: normalize_angle(f2),
            rotation: normalize_angle(rotation),
            flipped: false,
            allow_empty: false,
        }
    }

    #[must_use]
    pub fn with_info(mut self, info: CurveInfo) -> Self {
        self.info = info;
        self
    }

    #[must_use]
    pub fn with_allow_empty(mut self, allow_empty: bool) -> Self {
        self.allow_empty = allow_empty;
        self
    }

    /// Swept angle in degrees; coincident boundary angles mean the full
    /// ellipse unless the arc allows being empty.
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

    /// Point on the ellipse at `angle` degrees in the ellipse frame: the
    /// unit ray is divided by `k = sqrt((x/r1)^2 + (y/r2)^2)`, then the
    /// frame rotation and center translation are applied.
    #[must_use]
    pub fn ellipse_point(&self, angle: f64) -> Point2 {
        let ray = Vec2::from_angle(angle);
        let k = ((ray.x / self.r1).powi(2) + (ray.y / self.r2).powi(2)).sqrt();
        if fuzzy_is_null(k) {
            return self.center;
        }
        let local = Point2::new(ray.x / k, ray.y / k);
        rotate_point(local, Point2::ORIGIN, self.rotation) + (self.center - Point2::ORIGIN)
    }

    #[must_use]
    pub fn start_point(&self) -> Point2 {
        self.ellipse_point(self.f1)
    }

    #[must_use]
    pub fn end_point(&self) -> Point2 {
        self.ellipse_point(self.f2)
    }

    fn direction(&self) -> f64 {
        if self.flipped { -1.0 } else { 1.0 }
    }

    /// Sample the swept range. The angular step is `1/scale` degrees, so a
    /// finer scale yields proportionally more points.
    #[must_use]
    pub fn points(&self, scale: f64) -> Vec<Point2> {
        let sweep = self.sweep();
        if fuzzy_is_null(sweep) {
            return vec![self.start_point()];
        }

        let step_size = 1.0 / scale;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let steps = (sweep / step_size).ceil().max(1.0) as usize;
        let step = sweep / steps as f64 * self.direction();

        (0..=steps)
            .map(|index| self.ellipse_point(self.f1 + step * index as f64))
            .collect()
    }

    /// Arc length of the swept range via the sampled polyline.
    #[must_use]
    pub fn length(&self, scale: f64) -> f64 {
        polyline_length(&self.points(scale))
    }

    /// Perimeter of the full ellipse by Ramanujan's approximation; the
    /// upper bound for cut lengths.
    #[must_use]
    pub fn max_length(&self) -> f64 {
        let a = self.r1.abs();
        let b = self.r2.abs();
        std::f64::consts::PI * (3.0 * (a + b) - ((3.0 * a + b) * (a + 3.0 * b)).sqrt())
    }

    /// Cubic sections approximating the swept range, one per at most a
    /// quarter turn, each fitted through four samples.
    #[must_use]
    pub fn cubics(&self) -> Vec<crate::geom::bezier::Cubic> {
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
                crate::geom::bezier::cubic_through(
                    self.ellipse_point(start),
                    self.ellipse_point(start + step / 3.0),
                    self.ellipse_point(start + step * 2.0 / 3.0),
                    self.ellipse_point(start + step),
                )
            })
            .collect()
    }

    fn with_end_angle(&self, f2: f64) -> Self {
        let mut arc = self.clone();
        arc.f2 = normalize_angle(f2);
        arc.allow_empty = true;
        arc
    }

    /// End angle (ellipse frame, degrees) at which the arc length from the
    /// start reaches `length`, found by bisection over the sweep.
    #[must_use]
    pub fn angle_at_length(&self, length: f64, scale: f64) -> f64 {
        let sweep = self.sweep();
        let mut low = 0.0_f64;
        let mut high = sweep;
        for _ in 0..100 {
            let mid = 0.5 * (low + high);
            let candidate = self.with_end_angle(self.f1 + mid * self.direction());
            let head = candidate.length(scale);
            if (head - length).abs() < 0.01 {
                return normalize_angle(self.f1 + mid * self.direction());
            }
            if head < length {
                low = mid;
            } else {
                high = mid;
            }
        }
        normalize_angle(self.f1 + 0.5 * (low + high) * self.direction())
    }

    /// Cut at an arc length from the start (validated by the caller to lie
    /// in `[0, length()]`).
    #[must_use]
    pub fn cut_at(&self, length: f64, scale: f64) -> (Point2, EllipticalArc, EllipticalArc) {
        let cut_angle = self.angle_at_length(length, scale);

        let mut first = self.clone();
        first.f2 = cut_angle;
        first.allow_empty = true;

        let mut second = self.clone();
        second.f1 = cut_angle;
        second.allow_empty = true;

        (self.ellipse_point(cut_angle), first, second)
    }

    #[must_use]
    pub fn rotate(&self, origin: Point2, degrees: f64, suffix: &str) -> Self {
        let mut arc = self.clone();
        arc.info = self.info.derived(suffix);
        arc.center = rotate_point(self.center, origin, degrees);
        arc.rotation = normalize_angle(self.rotation + degrees);
        arc
    }

    /// Mirror across the carrier line of `axis`. In the mirrored frame the
    /// ellipse rotation reflects and the boundary angles negate.
    #[must_use]
    pub fn flip(&self, axis: Line2, suffix: &str) -> Self {
        let axis_angle = axis.angle();
        let mut arc = self.clone();
        arc.info = self.info.derived(suffix);
        arc.center = flip_point(self.center, axis);
        arc.rotation = normalize_angle(2.0 * axis_angle - self.rotation);
        arc.f1 = normalize_angle(-self.f1);
        arc.f2 = normalize_angle(-self.f2);
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
