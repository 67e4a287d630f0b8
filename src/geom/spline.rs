use crate::geom::CurveInfo;
use crate::geom::bezier::{Cubic, polyline_length};
use crate::geom::core::{Line2, Point2, Vec2, normalize_angle};
use crate::geom::point::{flip_point, move_point, rotate_point};

/// A single cubic segment parameterized the way a drafter thinks about it:
/// endpoints plus a handle direction and length at each end.
#[derive(Debug, Clone, PartialEq)]
pub struct Spline {
    pub info: CurveInfo,
    pub p1: Point2,
    pub p4: Point2,
    /// Handle at `p1`: direction in degrees and length.
    pub angle1: f64,
    pub length1: f64,
    /// Handle at `p4`.
    pub angle2: f64,
    pub length2: f64,
}

impl Spline {
    #[must_use]
    pub fn new(p1: Point2, angle1: f64, length1: f64, p4: Point2, angle2: f64, length2: f64) -> Self {
        Self {
            info: CurveInfo::named(""),
            p1,
            p4,
            angle1: normalize_angle(angle1),
            length1,
            angle2: normalize_angle(angle2),
            length2,
        }
    }

    /// Recover the handle parameterization from four control points.
    #[must_use]
    pub fn from_points(p1: Point2, c1: Point2, c2: Point2, p4: Point2) -> Self {
        Self::new(
            p1,
            (c1 - p1).angle(),
            p1.distance_to(c1),
            p4,
            (c2 - p4).angle(),
            p4.distance_to(c2),
        )
    }

    #[must_use]
    pub fn with_info(mut self, info: CurveInfo) -> Self {
        self.info = info;
        self
    }

    #[must_use]
    pub fn control1(&self) -> Point2 {
        self.p1 + Vec2::from_angle(self.angle1) * self.length1
    }

    #[must_use]
    pub fn control2(&self) -> Point2 {
        self.p4 + Vec2::from_angle(self.angle2) * self.length2
    }

    #[must_use]
    pub fn cubic(&self) -> Cubic {
        Cubic::new(self.p1, self.control1(), self.control2(), self.p4)
    }

    #[must_use]
    pub fn points(&self, scale: f64) -> Vec<Point2> {
        self.cubic().points(scale)
    }

    #[must_use]
    pub fn length(&self, scale: f64) -> f64 {
        self.cubic().length(scale)
    }

    /// Cut at an arc length from the start (validated by the caller).
    #[must_use]
    pub fn cut_at(&self, length: f64, scale: f64) -> (Point2, Spline, Spline) {
        let (point, head, tail) = self.cubic().cut_at_length(length, scale);
        (
            point,
            Self::from_points(head.p1, head.c1, head.c2, head.p2),
            Self::from_points(tail.p1, tail.c1, tail.c2, tail.p2),
        )
    }

    #[must_use]
    pub fn rotate(&self, origin: Point2, degrees: f64, suffix: &str) -> Self {
        let mut spline = self.clone();
        spline.info = self.info.derived(suffix);
        spline.p1 = rotate_point(self.p1, origin, degrees);
        spline.p4 = rotate_point(self.p4, origin, degrees);
        spline.angle1 = normalize_angle(self.angle1 + degrees);
        spline.angle2 = normalize_angle(self.angle2 + degrees);
        spline
    }

    #[must_use]
    pub fn flip(&self, axis: Line2, suffix: &str) -> Self {
        let axis_angle = axis.angle();
        let mut spline = self.clone();
        spline.info = self.info.derived(suffix);
        spline.p1 = flip_point(self.p1, axis);
        spline.p4 = flip_point(self.p4, axis);
        spline.angle1 = normalize_angle(2.0 * axis_angle - self.angle1);
        spline.angle2 = normalize_angle(2.0 * axis_angle - self.angle2);
        spline
    }

    #[must_use]
    pub fn move_(&self, length: f64, angle: f64, suffix: &str) -> Self {
        let mut spline = self.clone();
        spline.info = self.info.derived(suffix);
        spline.p1 = move_point(self.p1, length, angle);
        spline.p4 = move_point(self.p4, length, angle);
        spline
    }
}

/// A knot of a [`SplinePath`]: the point plus its incoming (`angle1`,
/// `length1`) and outgoing (`angle2`, `length2`) handles.
#[derive(Debug, Clone, PartialEq)]
pub struct SplinePoint {
    pub point: Point2,
    pub angle1: f64,
    pub length1: f64,
    pub angle2: f64,
    pub length2: f64,
}

impl SplinePoint {
    #[must_use]
    pub fn new(point: Point2, angle1: f64, length1: f64, angle2: f64, length2: f64) -> Self {
        Self {
            point,
            angle1: normalize_angle(angle1),
            length1,
            angle2: normalize_angle(angle2),
            length2,
        }
    }
}

/// A chain of cubic segments through a list of knots.
#[derive(Debug, Clone, PartialEq)]
pub struct SplinePath {
    pub info: CurveInfo,
    pub points: Vec<SplinePoint>,
}

impl SplinePath {
    #[must_use]
    pub fn new(points: Vec<SplinePoint>) -> Self {
        Self {
            info: CurveInfo::named(""),
            points,
        }
    }

    #[must_use]
    pub fn with_info(mut self, info: CurveInfo) -> Self {
        self.info = info;
        self
    }

    /// Build a path from consecutive cubic segments. Adjacent segments are
    /// assumed to share endpoints; the shared knot takes its incoming handle
    /// from the earlier cubic and its outgoing handle from the later one.
    #[must_use]
    pub fn from_cubics(cubics: &[Cubic]) -> Self {
        let Some(first) = cubics.first() else {
            return Self::new(Vec::new());
        };

        let mut points = Vec::with_capacity(cubics.len() + 1);
        points.push(SplinePoint::new(
            first.p1,
            180.0,
            0.0,
            (first.c1 - first.p1).angle(),
            first.p1.distance_to(first.c1),
        ));
        for pair in cubics.windows(2) {
            let (before, after) = (&pair[0], &pair[1]);
            points.push(SplinePoint::new(
                before.p2,
                (before.c2 - before.p2).angle(),
                before.p2.distance_to(before.c2),
                (after.c1 - after.p1).angle(),
                after.p1.distance_to(after.c1),
            ));
        }
        let last = cubics.last().unwrap_or(first);
        points.push(SplinePoint::new(
            last.p2,
            (last.c2 - last.p2).angle(),
            last.p2.distance_to(last.c2),
            0.0,
            0.0,
        ));
        Self::new(points)
    }

    #[must_use]
    pub fn count_segments(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    /// The cubic segment between knot `index` and the next one.
    #[must_use]
    pub fn segment(&self, index: usize) -> Spline {
        let a = &self.points[index];
        let b = &self.points[index + 1];
        Spline::new(a.point, a.angle2, a.length2, b.point, b.angle1, b.length1)
    }

    #[must_use]
    pub fn start_point(&self) -> Point2 {
        self.points.first().map_or(Point2::ORIGIN, |p| p.point)
    }

    #[must_use]
    pub fn end_point(&self) -> Point2 {
        self.points.last().map_or(Point2::ORIGIN, |p| p.point)
    }

    /// Concatenated segment polylines, joint points deduplicated.
    #[must_use]
    pub fn sample_points(&self, scale: f64) -> Vec<Point2> {
        let mut points: Vec<Point2> = Vec::new();
        for index in 0..self.count_segments() {
            let segment_points = self.segment(index).points(scale);
            let skip = usize::from(!points.is_empty());
            points.extend(segment_points.into_iter().skip(skip));
        }
        points
    }

    #[must_use]
    pub fn length(&self, scale: f64) -> f64 {
        polyline_length(&self.sample_points(scale))
    }

    /// Cut at an arc length from the start by walking the segments. Both
    /// result paths share the new knot at the cut point.
    #[must_use]
    pub fn cut_at(&self, length: f64, scale: f64) -> (Point2, SplinePath, SplinePath) {
        let mut walked = 0.0;
        let last_segment = self.count_segments().saturating_sub(1);
        for index in 0..self.count_segments() {
            let segment = self.segment(index);
            let segment_length = segment.length(scale);
            let local = length - walked;
            if local <= segment_length || index == last_segment {
                return self.cut_segment(index, local.clamp(0.0, segment_length), scale);
            }
            walked += segment_length;
        }
        (self.start_point(), self.clone(), self.clone())
    }

    fn cut_segment(&self, index: usize, local: f64, scale: f64) -> (Point2, SplinePath, SplinePath) {
        let (point, head, tail) = self.segment(index).cut_at(local, scale);

        let mut first = Vec::with_capacity(index + 2);
        first.extend(self.points[..index].iter().cloned());
        let mut knot_before = self.points[index].clone();
        knot_before.angle2 = head.angle1;
        knot_before.length2 = head.length1;
        first.push(knot_before);
        first.push(SplinePoint::new(point, head.angle2, head.length2, tail.angle1, tail.length1));

        let mut second = Vec::with_capacity(self.points.len() - index);
        second.push(SplinePoint::new(point, head.angle2, head.length2, tail.angle1, tail.length1));
        let mut knot_after = self.points[index + 1].clone();
        knot_after.angle1 = tail.angle2;
        knot_after.length1 = tail.length2;
        second.push(knot_after);
        second.extend(self.points[index + 2..].iter().cloned());

        (point, SplinePath::new(first), SplinePath::new(second))
    }

    #[must_use]
    pub fn rotate(&self, origin: Point2, degrees: f64, suffix: &str) -> Self {
        let points = self
            .points
            .iter()
            .map(|knot| {
                SplinePoint::new(
                    rotate_point(knot.point, origin, degrees),
                    knot.angle1 + degrees,
                    knot.length1,
                    knot.angle2 + degrees,
                    knot.length2,
                )
            })
            .collect();
        Self {
            info: self.info.derived(suffix),
            points,
        }
    }

    #[must_use]
    pub fn flip(&self, axis: Line2, suffix: &str) -> Self {
        let axis_angle = axis.angle();
        let points = self
            .points
            .iter()
            .map(|knot| {
                SplinePoint::new(
                    flip_point(knot.point, axis),
                    2.0 * axis_angle - knot.angle1,
                    knot.length1,
                    2.0 * axis_angle - knot.angle2,
                    knot.length2,
                )
            })
            .collect();
        Self {
            info: self.info.derived(suffix),
            points,
        }
    }

    #[must_use]
    pub fn move_(&self, length: f64, angle: f64, suffix: &str) -> Self {
        let points = self
            .points
            .iter()
            .map(|knot| {
                let mut moved = knot.clone();
                moved.point = move_point(knot.point, length, angle);
                moved
            })
            .collect();
        Self {
            info: self.info.derived(suffix),
            points,
        }
    }
}
