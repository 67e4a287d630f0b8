//! Construction tools: the operations a drafter applies, each one reading
//! referenced objects from the container, evaluating its formulas and
//! producing new objects.

pub mod curves;
pub mod cut;
pub mod intersections;
pub mod line_point;
pub mod operations;

use thiserror::Error;

use crate::container::{Container, ContainerError, ObjectId};
use crate::formula::{Formula, FormulaError};
use crate::geom::bezier::effective_scale;
use crate::geom::core::Point2;
use crate::geom::curve::GObject;
use crate::geom::point::Point;
use crate::graph::GraphError;
use crate::units::Unit;

pub use curves::{
    ArcTool, ArcWithLengthTool, CubicBezierPathTool, CubicBezierTool, CurveStyle,
    EllipticalArcTool, SplinePathNode, SplinePathTool, SplineTool,
};
pub use cut::{CutArc, CutSpline, CutSplinePath};
pub use intersections::{
    LineIntersect, PointOfContact, PointOfIntersection, PointOfIntersectionArcs,
    PointOfIntersectionCircles, PointOfIntersectionCurves,
};
pub use line_point::{AlongLine, Bisector, Normal, ShoulderPoint};
pub use operations::{AxisType, FlipByAxis, FlipByLine, Move, ParallelCurve, Rotation, SourceItem};

/// How strictly degenerate constructions are treated. Strict fails the
/// operation; lenient logs and produces a best-effort result where the
/// geometry offers one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    Strict,
    Lenient,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ToolError {
    #[error(transparent)]
    Formula(#[from] FormulaError),
    #[error(transparent)]
    Container(#[from] ContainerError),
    #[error(transparent)]
    Graph(#[from] GraphError),
    /// A degenerate construction: parallel lines, missing intersection,
    /// out-of-range cut and the like.
    #[error("{0}")]
    Construction(String),
}

impl ToolError {
    /// Errors that mark a single object invalid during recomputation
    /// without aborting the pass.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Formula(_) | Self::Container(_))
    }
}

/// Whether a tool application mints fresh ids or refreshes existing
/// objects in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Create,
    /// Ids produced by the original creation, in the same order the tool
    /// emits its objects.
    Update { ids: Vec<ObjectId> },
}

/// Ids of the objects a tool produced, creation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutcome {
    pub ids: Vec<ObjectId>,
}

/// Everything a tool needs while applying: the object store and the
/// document-level settings.
pub struct ToolContext<'a> {
    pub container: &'a mut Container,
    pub unit: Unit,
    pub default_scale: f64,
    pub policy: Policy,
}

impl ToolContext<'_> {
    /// Evaluate a formula as a raw number (angles, bare factors).
    pub fn eval(&self, formula: &mut Formula) -> Result<f64, ToolError> {
        Ok(formula.eval(self.container.variables())?)
    }

    /// Evaluate a formula as a length in the document unit and convert it
    /// to pixels.
    pub fn eval_length(&self, formula: &mut Formula) -> Result<f64, ToolError> {
        let value = formula.eval(self.container.variables())?;
        Ok(self.unit.to_pixel(value))
    }

    /// Approximation scale for a curve carrying its own preference.
    #[must_use]
    pub fn scale_for(&self, curve_scale: f64) -> f64 {
        effective_scale(curve_scale, self.default_scale)
    }

    /// Resolve a degenerate construction: strict fails, lenient logs the
    /// problem and continues with `fallback` when one exists.
    pub fn degenerate<T>(&self, message: &str, fallback: Option<T>) -> Result<T, ToolError> {
        match (self.policy, fallback) {
            (Policy::Lenient, Some(value)) => {
                log::warn!("{message}");
                Ok(value)
            }
            _ => Err(ToolError::Construction(message.to_owned())),
        }
    }

    /// Register the length and angle variables of a drawn line, making them
    /// available to later formulas.
    pub fn register_line(&mut self, from: &str, to: &str, length_px: f64, angle: f64) {
        let length = self.unit.from_pixel(length_px);
        self.container
            .set_variable(format!("Line_{from}_{to}"), length);
        self.container
            .set_variable(format!("AngleLine_{from}_{to}"), angle);
    }

    /// Register the current length of a named curve.
    pub fn register_curve_length(&mut self, name: &str, length_px: f64) {
        let length = self.unit.from_pixel(length_px);
        self.container.set_variable(name.to_owned(), length);
    }
}

/// Store `object` as the `index`-th product of a tool application: a fresh
/// id on creation, the recorded id on update.
pub(crate) fn place(
    ctx: &mut ToolContext<'_>,
    target: &Target,
    index: usize,
    object: GObject,
) -> Result<ObjectId, ToolError> {
    match target {
        Target::Create => Ok(ctx.container.add(object)),
        Target::Update { ids } => {
            let id = *ids.get(index).ok_or_else(|| {
                ToolError::Construction(format!("update target is missing object {index}"))
            })?;
            ctx.container.update(id, object)?;
            Ok(id)
        }
    }
}

/// A free-standing base point, the root of every draw block.
#[derive(Debug, Clone, PartialEq)]
pub struct BasePoint {
    pub name: String,
    /// Position in pixels.
    pub position: Point2,
}

impl BasePoint {
    pub fn apply(
        &mut self,
        ctx: &mut ToolContext<'_>,
        target: &Target,
    ) -> Result<ToolOutcome, ToolError> {
        let point = Point::new(self.name.clone(), self.position);
        let id = place(ctx, target, 0, GObject::Point(point))?;
        Ok(ToolOutcome { ids: vec![id] })
    }
}

/// Every construction tool of the engine. Dispatch is a single exhaustive
/// match; adding a tool extends this enum and nothing else escapes the
/// compiler.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolKind {
    BasePoint(BasePoint),
    AlongLine(AlongLine),
    ShoulderPoint(ShoulderPoint),
    Normal(Normal),
    Bisector(Bisector),
    LineIntersect(LineIntersect),
    PointOfIntersection(PointOfIntersection),
    PointOfContact(PointOfContact),
    PointOfIntersectionCircles(PointOfIntersectionCircles),
    PointOfIntersectionArcs(PointOfIntersectionArcs),
    PointOfIntersectionCurves(PointOfIntersectionCurves),
    Arc(ArcTool),
    ArcWithLength(ArcWithLengthTool),
    EllipticalArc(EllipticalArcTool),
    Spline(SplineTool),
    SplinePath(SplinePathTool),
    CubicBezier(CubicBezierTool),
    CubicBezierPath(CubicBezierPathTool),
    CutArc(CutArc),
    CutSpline(CutSpline),
    CutSplinePath(CutSplinePath),
    Rotation(Rotation),
    FlipByLine(FlipByLine),
    FlipByAxis(FlipByAxis),
    Move(Move),
    ParallelCurve(ParallelCurve),
}

impl ToolKind {
    /// Apply the tool: validate, evaluate, compute, store.
    pub fn apply(
        &mut self,
        ctx: &mut ToolContext<'_>,
        target: &Target,
    ) -> Result<ToolOutcome, ToolError> {
        match self {
            Self::BasePoint(tool) => tool.apply(ctx, target),
            Self::AlongLine(tool) => tool.apply(ctx, target),
            Self::ShoulderPoint(tool) => tool.apply(ctx, target),
            Self::Normal(tool) => tool.apply(ctx, target),
            Self::Bisector(tool) => tool.apply(ctx, target),
            Self::LineIntersect(tool) => tool.apply(ctx, target),
            Self::PointOfIntersection(tool) => tool.apply(ctx, target),
            Self::PointOfContact(tool) => tool.apply(ctx, target),
            Self::PointOfIntersectionCircles(tool) => tool.apply(ctx, target),
            Self::PointOfIntersectionArcs(tool) => tool.apply(ctx, target),
            Self::PointOfIntersectionCurves(tool) => tool.apply(ctx, target),
            Self::Arc(tool) => tool.apply(ctx, target),
            Self::ArcWithLength(tool) => tool.apply(ctx, target),
            Self::EllipticalArc(tool) => tool.apply(ctx, target),
            Self::Spline(tool) => tool.apply(ctx, target),
            Self::SplinePath(tool) => tool.apply(ctx, target),
            Self::CubicBezier(tool) => tool.apply(ctx, target),
            Self::CubicBezierPath(tool) => tool.apply(ctx, target),
            Self::CutArc(tool) => tool.apply(ctx, target),
            Self::CutSpline(tool) => tool.apply(ctx, target),
            Self::CutSplinePath(tool) => tool.apply(ctx, target),
            Self::Rotation(tool) => tool.apply(ctx, target),
            Self::FlipByLine(tool) => tool.apply(ctx, target),
            Self::FlipByAxis(tool) => tool.apply(ctx, target),
            Self::Move(tool) => tool.apply(ctx, target),
            Self::ParallelCurve(tool) => tool.apply(ctx, target),
        }
    }

    /// Ids of the objects this tool reads; the dependency edges of its
    /// products.
    #[must_use]
    pub fn source_ids(&self) -> Vec<ObjectId> {
        match self {
            Self::BasePoint(_) => Vec::new(),
            Self::AlongLine(tool) => vec![tool.first, tool.second],
            Self::ShoulderPoint(tool) => vec![tool.line_p1, tool.line_p2, tool.shoulder],
            Self::Normal(tool) => vec![tool.first, tool.second],
            Self::Bisector(tool) => vec![tool.first, tool.second, tool.third],
            Self::LineIntersect(tool) => {
                vec![tool.line1_p1, tool.line1_p2, tool.line2_p1, tool.line2_p2]
            }
            Self::PointOfIntersection(tool) => vec![tool.first, tool.second],
            Self::PointOfContact(tool) => vec![tool.center, tool.first, tool.second],
            Self::PointOfIntersectionCircles(tool) => vec![tool.center1, tool.center2],
            Self::PointOfIntersectionArcs(tool) => vec![tool.first_arc, tool.second_arc],
            Self::PointOfIntersectionCurves(tool) => vec![tool.first_curve, tool.second_curve],
            Self::Arc(tool) => vec![tool.center],
            Self::ArcWithLength(tool) => vec![tool.center],
            Self::EllipticalArc(tool) => vec![tool.center],
            Self::Spline(tool) => vec![tool.first, tool.last],
            Self::SplinePath(tool) => tool.nodes.iter().map(|node| node.point).collect(),
            Self::CubicBezier(tool) => vec![tool.p1, tool.p2, tool.p3, tool.p4],
            Self::CubicBezierPath(tool) => tool.points.clone(),
            Self::CutArc(tool) => vec![tool.arc],
            Self::CutSpline(tool) => vec![tool.curve],
            Self::CutSplinePath(tool) => vec![tool.path],
            Self::Rotation(tool) => {
                let mut ids = vec![tool.origin];
                ids.extend(tool.sources.iter().map(|item| item.id));
                ids
            }
            Self::FlipByLine(tool) => {
                let mut ids = vec![tool.axis_p1, tool.axis_p2];
                ids.extend(tool.sources.iter().map(|item| item.id));
                ids
            }
            Self::FlipByAxis(tool) => {
                let mut ids = vec![tool.origin];
                ids.extend(tool.sources.iter().map(|item| item.id));
                ids
            }
            Self::Move(tool) => tool.sources.iter().map(|item| item.id).collect(),
            Self::ParallelCurve(tool) => vec![tool.curve],
        }
    }

    /// Stable tag naming the tool in logs and the recipe.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            Self::BasePoint(_) => "basePoint",
            Self::AlongLine(_) => "alongLine",
            Self::ShoulderPoint(_) => "shoulder",
            Self::Normal(_) => "normal",
            Self::Bisector(_) => "bisector",
            Self::LineIntersect(_) => "lineIntersect",
            Self::PointOfIntersection(_) => "pointOfIntersection",
            Self::PointOfContact(_) => "pointOfContact",
            Self::PointOfIntersectionCircles(_) => "pointOfIntersectionCircles",
            Self::PointOfIntersectionArcs(_) => "pointOfIntersectionArcs",
            Self::PointOfIntersectionCurves(_) => "pointOfIntersectionCurves",
            Self::Arc(_) => "arc",
            Self::ArcWithLength(_) => "arcWithLength",
            Self::EllipticalArc(_) => "ellipticalArc",
            Self::Spline(_) => "spline",
            Self::SplinePath(_) => "splinePath",
            Self::CubicBezier(_) => "cubicBezier",
            Self::CubicBezierPath(_) => "cubicBezierPath",
            Self::CutArc(_) => "cutArc",
            Self::CutSpline(_) => "cutSpline",
            Self::CutSplinePath(_) => "cutSplinePath",
            Self::Rotation(_) => "rotation",
            Self::FlipByLine(_) => "flippingByLine",
            Self::FlipByAxis(_) => "flippingByAxis",
            Self::Move(_) => "moving",
            Self::ParallelCurve(_) => "parallelCurve",
        }
    }
}
