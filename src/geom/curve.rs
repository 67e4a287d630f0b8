//! Closed sum types over every drafting object. All polymorphic behaviour
//! (transforms, sampling, naming) dispatches through a single exhaustive
//! match, so adding a variant is a compile-time checklist.

use std::fmt;

use crate::geom::CurveInfo;
use crate::geom::arc::Arc;
use crate::geom::core::{Line2, Point2};
use crate::geom::elliptical::EllipticalArc;
use crate::geom::path::{CubicBezier, CubicBezierPath};
use crate::geom::point::Point;
use crate::geom::spline::{Spline, SplinePath};

/// Discriminant of a [`GObject`], used in error reporting and the recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GObjectKind {
    Point,
    Arc,
    EllipticalArc,
    Spline,
    SplinePath,
    CubicBezier,
    CubicBezierPath,
}

impl fmt::Display for GObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Point => "point",
            Self::Arc => "arc",
            Self::EllipticalArc => "elliptical arc",
            Self::Spline => "spline",
            Self::SplinePath => "spline path",
            Self::CubicBezier => "cubic bezier",
            Self::CubicBezierPath => "cubic bezier path",
        };
        f.write_str(label)
    }
}

/// Any object a construction tool can produce or reference.
#[derive(Debug, Clone, PartialEq)]
pub enum GObject {
    Point(Point),
    Arc(Arc),
    EllipticalArc(EllipticalArc),
    Spline(Spline),
    SplinePath(SplinePath),
    CubicBezier(CubicBezier),
    CubicBezierPath(CubicBezierPath),
}

impl GObject {
    #[must_use]
    pub fn kind(&self) -> GObjectKind {
        match self {
            Self::Point(_) => GObjectKind::Point,
            Self::Arc(_) => GObjectKind::Arc,
            Self::EllipticalArc(_) => GObjectKind::EllipticalArc,
            Self::Spline(_) => GObjectKind::Spline,
            Self::SplinePath(_) => GObjectKind::SplinePath,
            Self::CubicBezier(_) => GObjectKind::CubicBezier,
            Self::CubicBezierPath(_) => GObjectKind::CubicBezierPath,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Point(point) => &point.name,
            Self::Arc(arc) => &arc.info.name,
            Self::EllipticalArc(arc) => &arc.info.name,
            Self::Spline(spline) => &spline.info.name,
            Self::SplinePath(path) => &path.info.name,
            Self::CubicBezier(bezier) => &bezier.info.name,
            Self::CubicBezierPath(path) => &path.info.name,
        }
    }

    /// Styling of the curve variants; points carry none.
    #[must_use]
    pub fn info_mut(&mut self) -> Option<&mut CurveInfo> {
        match self {
            Self::Point(_) => None,
            Self::Arc(arc) => Some(&mut arc.info),
            Self::EllipticalArc(arc) => Some(&mut arc.info),
            Self::Spline(spline) => Some(&mut spline.info),
            Self::SplinePath(path) => Some(&mut path.info),
            Self::CubicBezier(bezier) => Some(&mut bezier.info),
            Self::CubicBezierPath(path) => Some(&mut path.info),
        }
    }

    /// New object rotated around `origin`, named with `suffix` appended.
    #[must_use]
    pub fn rotate(&self, origin: Point2, degrees: f64, suffix: &str) -> Self {
        match self {
            Self::Point(point) => Self::Point(point.rotate(origin, degrees, suffix)),
            Self::Arc(arc) => Self::Arc(arc.rotate(origin, degrees, suffix)),
            Self::EllipticalArc(arc) => Self::EllipticalArc(arc.rotate(origin, degrees, suffix)),
            Self::Spline(spline) => Self::Spline(spline.rotate(origin, degrees, suffix)),
            Self::SplinePath(path) => Self::SplinePath(path.rotate(origin, degrees, suffix)),
            Self::CubicBezier(bezier) => Self::CubicBezier(bezier.rotate(origin, degrees, suffix)),
            Self::CubicBezierPath(path) => {
                Self::CubicBezierPath(path.rotate(origin, degrees, suffix))
            }
        }
    }

    /// New object mirrored across the carrier line of `axis`.
    #[must_use]
    pub fn flip(&self, axis: Line2, suffix: &str) -> Self {
        match self {
            Self::Point(point) => Self::Point(point.flip(axis, suffix)),
            Self::Arc(arc) => Self::Arc(arc.flip(axis, suffix)),
            Self::EllipticalArc(arc) => Self::EllipticalArc(arc.flip(axis, suffix)),
            Self::Spline(spline) => Self::Spline(spline.flip(axis, suffix)),
            Self::SplinePath(path) => Self::SplinePath(path.flip(axis, suffix)),
            Self::CubicBezier(bezier) => Self::CubicBezier(bezier.flip(axis, suffix)),
            Self::CubicBezierPath(path) => Self::CubicBezierPath(path.flip(axis, suffix)),
        }
    }

    /// New object displaced by `length` at `angle` degrees.
    #[must_use]
    pub fn move_(&self, length: f64, angle: f64, suffix: &str) -> Self {
        match self {
            Self::Point(point) => Self::Point(point.move_(length, angle, suffix)),
            Self::Arc(arc) => Self::Arc(arc.move_(length, angle, suffix)),
            Self::EllipticalArc(arc) => Self::EllipticalArc(arc.move_(length, angle, suffix)),
            Self::Spline(spline) => Self::Spline(spline.move_(length, angle, suffix)),
            Self::SplinePath(path) => Self::SplinePath(path.move_(length, angle, suffix)),
            Self::CubicBezier(bezier) => Self::CubicBezier(bezier.move_(length, angle, suffix)),
            Self::CubicBezierPath(path) => Self::CubicBezierPath(path.move_(length, angle, suffix)),
        }
    }
}

/// The curve subset of [`GObject`], for callers that need sampling or
/// length.
#[derive(Debug, Clone, PartialEq)]
pub enum Curve {
    Arc(Arc),
    EllipticalArc(EllipticalArc),
    Spline(Spline),
    SplinePath(SplinePath),
    CubicBezier(CubicBezier),
    CubicBezierPath(CubicBezierPath),
}

impl Curve {
    #[must_use]
    pub fn info(&self) -> &CurveInfo {
        match self {
            Self::Arc(arc) => &arc.info,
            Self::EllipticalArc(arc) => &arc.info,
            Self::Spline(spline) => &spline.info,
            Self::SplinePath(path) => &path.info,
            Self::CubicBezier(bezier) => &bezier.info,
            Self::CubicBezierPath(path) => &path.info,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.info().name
    }

    /// Flattened polyline at the given approximation scale.
    #[must_use]
    pub fn points(&self, scale: f64) -> Vec<Point2> {
        match self {
            Self::Arc(arc) => arc.points(scale),
            Self::EllipticalArc(arc) => arc.points(scale),
            Self::Spline(spline) => spline.points(scale),
            Self::SplinePath(path) => path.sample_points(scale),
            Self::CubicBezier(bezier) => bezier.points(scale),
            Self::CubicBezierPath(path) => path.sample_points(scale),
        }
    }

    #[must_use]
    pub fn length(&self, scale: f64) -> f64 {
        match self {
            Self::Arc(arc) => arc.length(),
            Self::EllipticalArc(arc) => arc.length(scale),
            Self::Spline(spline) => spline.length(scale),
            Self::SplinePath(path) => path.length(scale),
            Self::CubicBezier(bezier) => bezier.length(scale),
            Self::CubicBezierPath(path) => path.length(scale),
        }
    }

    #[must_use]
    pub fn start_point(&self) -> Point2 {
        match self {
            Self::Arc(arc) => arc.start_point(),
            Self::EllipticalArc(arc) => arc.start_point(),
            Self::Spline(spline) => spline.p1,
            Self::SplinePath(path) => path.start_point(),
            Self::CubicBezier(bezier) => bezier.p1,
            Self::CubicBezierPath(path) => path.start_point(),
        }
    }

    #[must_use]
    pub fn end_point(&self) -> Point2 {
        match self {
            Self::Arc(arc) => arc.end_point(),
            Self::EllipticalArc(arc) => arc.end_point(),
            Self::Spline(spline) => spline.p4,
            Self::SplinePath(path) => path.end_point(),
            Self::CubicBezier(bezier) => bezier.p4,
            Self::CubicBezierPath(path) => path.end_point(),
        }
    }

    /// Effective approximation scale, falling back to `default_scale`.
    #[must_use]
    pub fn scale_or(&self, default_scale: f64) -> f64 {
        crate::geom::bezier::effective_scale(self.info().approximation_scale, default_scale)
    }
}

impl From<Curve> for GObject {
    fn from(curve: Curve) -> Self {
        match curve {
            Curve::Arc(arc) => Self::Arc(arc),
            Curve::EllipticalArc(arc) => Self::EllipticalArc(arc),
            Curve::Spline(spline) => Self::Spline(spline),
            Curve::SplinePath(path) => Self::SplinePath(path),
            Curve::CubicBezier(bezier) => Self::CubicBezier(bezier),
            Curve::CubicBezierPath(path) => Self::CubicBezierPath(path),
        }
    }
}

impl TryFrom<GObject> for Curve {
    type Error = GObjectKind;

    /// Fails with the actual kind when the object is not a curve.
    fn try_from(object: GObject) -> Result<Self, GObjectKind> {
        match object {
            GObject::Point(_) => Err(GObjectKind::Point),
            GObject::Arc(arc) => Ok(Self::Arc(arc)),
            GObject::EllipticalArc(arc) => Ok(Self::EllipticalArc(arc)),
            GObject::Spline(spline) => Ok(Self::Spline(spline)),
            GObject::SplinePath(path) => Ok(Self::SplinePath(path)),
            GObject::CubicBezier(bezier) => Ok(Self::CubicBezier(bezier)),
            GObject::CubicBezierPath(path) => Ok(Self::CubicBezierPath(path)),
        }
    }
}
