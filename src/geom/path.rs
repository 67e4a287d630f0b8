use crate::geom::CurveInfo;
use crate::geom::bezier::{Cubic, polyline_length};
use crate::geom::core::{Line2, Point2};
use crate::geom::point::{flip_point, move_point, rotate_point};

/// A cubic segment given directly by its four control points.
#[derive(Debug, Clone, PartialEq)]
pub struct CubicBezier {
    pub info: CurveInfo,
    pub p1: Point2,
    pub p2: Point2,
    pub p3: Point2,
    pub p4: Point2,
}

impl CubicBezier {
    #[must_use]
    pub fn new(p1: Point2, p2: Point2, p3: Point2, p4: Point2) -> Self {
        Self {
            info: CurveInfo::named(""),
            p1,
            p2,
            p3,
            p4,
        }
    }

    #[must_use]
    pub fn with_info(mut self, info: CurveInfo) -> Self {
        self.info = info;
        self
    }

    #[must_use]
    pub fn cubic(&self) -> Cubic {
        Cubic::new(self.p1, self.p2, self.p3, self.p4)
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
    pub fn cut_at(&self, length: f64, scale: f64) -> (Point2, CubicBezier, CubicBezier) {
        let (point, head, tail) = self.cubic().cut_at_length(length, scale);
        (
            point,
            Self::new(head.p1, head.c1, head.c2, head.p2),
            Self::new(tail.p1, tail.c1, tail.c2, tail.p2),
        )
    }

    fn map(&self, suffix: &str, mut transform: impl FnMut(Point2) -> Point2) -> Self {
        Self {
            info: self.info.derived(suffix),
            p1: transform(self.p1),
            p2: transform(self.p2),
            p3: transform(self.p3),
            p4: transform(self.p4),
        }
    }

    #[must_use]
    pub fn rotate(&self, origin: Point2, degrees: f64, suffix: &str) -> Self {
        self.map(suffix, |p| rotate_point(p, origin, degrees))
    }

    #[must_use]
    pub fn flip(&self, axis: Line2, suffix: &str) -> Self {
        self.map(suffix, |p| flip_point(p, axis))
    }

    #[must_use]
    pub fn move_(&self, length: f64, angle: f64, suffix: &str) -> Self {
        self.map(suffix, |p| move_point(p, length, angle))
    }
}

/// A chain of cubic segments sharing endpoints: `3n + 1` control points for
/// `n` segments.
#[derive(Debug, Clone, PartialEq)]
pub struct CubicBezierPath {
    pub info: CurveInfo,
    pub points: Vec<Point2>,
}

impl CubicBezierPath {
    #[must_use]
    pub fn new(points: Vec<Point2>) -> Self {
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

    /// Number of complete cubic segments in the chain.
    #[must_use]
    pub fn count_segments(&self) -> usize {
        if self.points.len() < 4 {
            0
        } else {
            (self.points.len() - 1) / 3
        }
    }

    #[must_use]
    pub fn segment(&self, index: usize) -> Cubic {
        let base = index * 3;
        Cubic::new(
            self.points[base],
            self.points[base + 1],
            self.points[base + 2],
            self.points[base + 3],
        )
    }

    #[must_use]
    pub fn start_point(&self) -> Point2 {
        self.points.first().copied().unwrap_or(Point2::ORIGIN)
    }

    #[must_use]
    pub fn end_point(&self) -> Point2 {
        let segments = self.count_segments();
        if segments == 0 {
            return self.start_point();
        }
        self.points[segments * 3]
    }

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

    /// Cut at an arc length from the start by walking the segments.
    #[must_use]
    pub fn cut_at(&self, length: f64, scale: f64) -> (Point2, CubicBezierPath, CubicBezierPath) {
        let mut walked = 0.0;
        let last_segment = self.count_segments().saturating_sub(1);
        for index in 0..self.count_segments() {
            let segment = self.segment(index);
            let segment_length = segment.length(scale);
            let local = length - walked;
            if local <= segment_length || index == last_segment {
                let (point, head, tail) = segment.cut_at_length(local.clamp(0.0, segment_length), scale);

                let mut first = self.points[..index * 3 + 1].to_vec();
                first.extend([head.c1, head.c2, head.p2]);

                let mut second = vec![tail.p1, tail.c1, tail.c2, tail.p2];
                second.extend_from_slice(&self.points[(index + 1) * 3 + 1..]);

                return (point, CubicBezierPath::new(first), CubicBezierPath::new(second));
            }
            walked += segment_length;
        }
        (self.start_point(), self.clone(), self.clone())
    }

    fn map(&self, suffix: &str, transform: impl Fn(Point2) -> Point2) -> Self {
        Self {
            info: self.info.derived(suffix),
            points: self.points.iter().map(|&p| transform(p)).collect(),
        }
    }

    #[must_use]
    pub fn rotate(&self, origin: Point2, degrees: f64, suffix: &str) -> Self {
        self.map(suffix, |p| rotate_point(p, origin, degrees))
    }

    #[must_use]
    pub fn flip(&self, axis: Line2, suffix: &str) -> Self {
        self.map(suffix, |p| flip_point(p, axis))
    }

    #[must_use]
    pub fn move_(&self, length: f64, angle: f64, suffix: &str) -> Self {
        self.map(suffix, |p| move_point(p, length, angle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::bezier::DEFAULT_APPROXIMATION_SCALE;

    fn straight_path() -> CubicBezierPath {
        CubicBezierPath::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(3.0, 0.0),
            Point2::new(7.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(13.0, 0.0),
            Point2::new(17.0, 0.0),
            Point2::new(20.0, 0.0),
        ])
    }

    #[test]
    fn segment_count_requires_3n_plus_1_points() {
        assert_eq!(straight_path().count_segments(), 2);
        assert_eq!(CubicBezierPath::new(vec![Point2::ORIGIN; 3]).count_segments(), 0);
    }

    #[test]
    fn path_length_and_sampling() {
        let path = straight_path();
        assert!((path.length(DEFAULT_APPROXIMATION_SCALE) - 20.0).abs() < 0.05);
        let samples = path.sample_points(DEFAULT_APPROXIMATION_SCALE);
        assert!(samples[0].fuzzy_eq(path.start_point()));
        assert!(samples.last().unwrap().fuzzy_eq(path.end_point()));
    }

    #[test]
    fn cut_keeps_the_3n_plus_1_shape() {
        let path = straight_path();
        let (point, first, second) = path.cut_at(15.0, DEFAULT_APPROXIMATION_SCALE);
        assert!((point.x - 15.0).abs() < 0.1);
        assert_eq!(first.points.len() % 3, 1);
        assert_eq!(second.points.len() % 3, 1);
        assert_eq!(first.count_segments(), 2);
        assert_eq!(second.count_segments(), 1);
        assert!(first.end_point().fuzzy_eq(second.start_point()));
    }

    #[test]
    fn flip_mirrors_every_control_point() {
        let axis = Line2::new(Point2::ORIGIN, Point2::new(1.0, 0.0));
        let bezier = CubicBezier::new(
            Point2::new(0.0, 1.0),
            Point2::new(1.0, 2.0),
            Point2::new(2.0, 2.0),
            Point2::new(3.0, 1.0),
        );
        let flipped = bezier.flip(axis, "_f");
        assert!(flipped.p1.fuzzy_eq(Point2::new(0.0, -1.0)));
        assert!(flipped.p3.fuzzy_eq(Point2::new(2.0, -2.0)));
    }
}
