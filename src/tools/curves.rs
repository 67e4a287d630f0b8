//! Tools that construct curves from referenced points and formulas.

use crate::container::ObjectId;
use crate::formula::Formula;
use crate::geom::arc::Arc;
use crate::geom::curve::GObject;
use crate::geom::elliptical::EllipticalArc;
use crate::geom::path::{CubicBezier, CubicBezierPath};
use crate::geom::spline::{Spline, SplinePath, SplinePoint};
use crate::geom::{CurveInfo, PenStyle};
use crate::tools::{Target, ToolContext, ToolError, ToolOutcome};

/// Styling shared by every curve constructor.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveStyle {
    pub color: String,
    pub pen_style: PenStyle,
    /// 0 defers to the document default.
    pub approximation_scale: f64,
}

impl Default for CurveStyle {
    fn default() -> Self {
        Self {
            color: "black".to_owned(),
            pen_style: PenStyle::default(),
            approximation_scale: 0.0,
        }
    }
}

impl CurveStyle {
    fn info(&self, name: String) -> CurveInfo {
        let mut info = CurveInfo::named(name);
        info.color = self.color.clone();
        info.pen_style = self.pen_style;
        info.approximation_scale = self.approximation_scale;
        info
    }
}

/// Store a curve whose generated name embeds its own id. On creation the
/// object is added first to learn the id, then renamed in place.
fn place_curve(
    ctx: &mut ToolContext<'_>,
    target: &Target,
    index: usize,
    make: impl Fn(ObjectId) -> GObject,
) -> Result<ObjectId, ToolError> {
    match target {
        Target::Create => {
            let id = ctx.container.add(make(0));
            ctx.container.update(id, make(id))?;
            Ok(id)
        }
        Target::Update { ids } => {
            let id = *ids.get(index).ok_or_else(|| {
                ToolError::Construction(format!("update target is missing object {index}"))
            })?;
            ctx.container.update(id, make(id))?;
            Ok(id)
        }
    }
}

/// A circular arc around a known center.
#[derive(Debug, Clone, PartialEq)]
pub struct ArcTool {
    pub center: ObjectId,
    pub radius: Formula,
    pub f1: Formula,
    pub f2: Formula,
    pub style: CurveStyle,
}

impl ArcTool {
    pub fn apply(
        &mut self,
        ctx: &mut ToolContext<'_>,
        target: &Target,
    ) -> Result<ToolOutcome, ToolError> {
        let center = ctx.container.point(self.center)?.clone();
        let radius = ctx.eval_length(&mut self.radius)?;
        let f1 = ctx.eval(&mut self.f1)?;
        let f2 = ctx.eval(&mut self.f2)?;

        let id = place_curve(ctx, target, 0, |id| {
            let arc = Arc::new(center.position, radius, f1, f2)
                .with_info(self.style.info(format!("Arc_{}_{id}", center.name)));
            GObject::Arc(arc)
        })?;

        let arc = ctx.container.arc(id)?.clone();
        ctx.register_curve_length(&arc.info.name, arc.length());
        Ok(ToolOutcome { ids: vec![id] })
    }
}

/// A circular arc defined by start angle and arc length; the end angle is
/// solved from the length, a negative length travelling clockwise.
#[derive(Debug, Clone, PartialEq)]
pub struct ArcWithLengthTool {
    pub center: ObjectId,
    pub radius: Formula,
    pub f1: Formula,
    pub length: Formula,
    pub style: CurveStyle,
}

impl ArcWithLengthTool {
    pub fn apply(
        &mut self,
        ctx: &mut ToolContext<'_>,
        target: &Target,
    ) -> Result<ToolOutcome, ToolError> {
        let center = ctx.container.point(self.center)?.clone();
        let radius = ctx.eval_length(&mut self.radius)?;
        let f1 = ctx.eval(&mut self.f1)?;
        let mut length = ctx.eval_length(&mut self.length)?;

        let circumference = 2.0 * std::f64::consts::PI * radius.abs();
        if length.abs() > circumference {
            length = ctx.degenerate(
                "arc length exceeds the full circle",
                Some(length.signum() * circumference),
            )?;
        }

        let id = place_curve(ctx, target, 0, |id| {
            let arc = Arc::from_length(center.position, radius, f1, length)
                .with_info(self.style.info(format!("Arc_{}_{id}", center.name)));
            GObject::Arc(arc)
        })?;

        let arc = ctx.container.arc(id)?.clone();
        ctx.register_curve_length(&arc.info.name, arc.length());
        Ok(ToolOutcome { ids: vec![id] })
    }
}

/// An elliptical arc around a known center.
#[derive(Debug, Clone, PartialEq)]
pub struct EllipticalArcTool {
    pub center: ObjectId,
    pub radius1: Formula,
    pub radius2: Formula,
    pub f1: Formula,
    pub f2: Formula,
    pub rotation: Formula,
    pub style: CurveStyle,
}

impl EllipticalArcTool {
    pub fn apply(
        &mut self,
        ctx: &mut ToolContext<'_>,
        target: &Target,
    ) -> Result<ToolOutcome, ToolError> {
        let center = ctx.container.point(self.center)?.clone();
        let radius1 = ctx.eval_length(&mut self.radius1)?;
        let radius2 = ctx.eval_length(&mut self.radius2)?;
        let f1 = ctx.eval(&mut self.f1)?;
        let f2 = ctx.eval(&mut self.f2)?;
        let rotation = ctx.eval(&mut self.rotation)?;

        let id = place_curve(ctx, target, 0, |id| {
            let arc = EllipticalArc::new(center.position, radius1, radius2, f1, f2, rotation)
                .with_info(self.style.info(format!("ElArc_{}_{id}", center.name)));
            GObject::EllipticalArc(arc)
        })?;

        let arc = ctx.container.elliptical_arc(id)?.clone();
        let scale = ctx.scale_for(arc.info.approximation_scale);
        ctx.register_curve_length(&arc.info.name, arc.length(scale));
        Ok(ToolOutcome { ids: vec![id] })
    }
}

/// A single cubic segment between two known points, handles given as
/// angle and length formulas.
#[derive(Debug, Clone, PartialEq)]
pub struct SplineTool {
    pub first: ObjectId,
    pub last: ObjectId,
    pub angle1: Formula,
    pub length1: Formula,
    pub angle2: Formula,
    pub length2: Formula,
    pub style: CurveStyle,
}

impl SplineTool {
    pub fn apply(
        &mut self,
        ctx: &mut ToolContext<'_>,
        target: &Target,
    ) -> Result<ToolOutcome, ToolError> {
        let first = ctx.container.point(self.first)?.clone();
        let last = ctx.container.point(self.last)?.clone();
        let angle1 = ctx.eval(&mut self.angle1)?;
        let length1 = ctx.eval_length(&mut self.length1)?;
        let angle2 = ctx.eval(&mut self.angle2)?;
        let length2 = ctx.eval_length(&mut self.length2)?;

        let name = format!("Spl_{}_{}", first.name, last.name);
        let id = place_curve(ctx, target, 0, |_| {
            let spline = Spline::new(first.position, angle1, length1, last.position, angle2, length2)
                .with_info(self.style.info(name.clone()));
            GObject::Spline(spline)
        })?;

        let spline = ctx.container.spline(id)?.clone();
        let scale = ctx.scale_for(spline.info.approximation_scale);
        ctx.register_curve_length(&name, spline.length(scale));
        Ok(ToolOutcome { ids: vec![id] })
    }
}

/// One knot of a [`SplinePathTool`].
#[derive(Debug, Clone, PartialEq)]
pub struct SplinePathNode {
    pub point: ObjectId,
    pub angle1: Formula,
    pub length1: Formula,
    pub angle2: Formula,
    pub length2: Formula,
}

/// A chain of cubic segments through known points.
#[derive(Debug, Clone, PartialEq)]
pub struct SplinePathTool {
    pub nodes: Vec<SplinePathNode>,
    pub style: CurveStyle,
}

impl SplinePathTool {
    pub fn apply(
        &mut self,
        ctx: &mut ToolContext<'_>,
        target: &Target,
    ) -> Result<ToolOutcome, ToolError> {
        if self.nodes.len() < 2 {
            return Err(ToolError::Construction(
                "spline path needs at least two points".to_owned(),
            ));
        }

        let mut knots = Vec::with_capacity(self.nodes.len());
        let mut first_name = String::new();
        let mut last_name = String::new();
        for (index, node) in self.nodes.iter_mut().enumerate() {
            let point = ctx.container.point(node.point)?.clone();
            if index == 0 {
                first_name.clone_from(&point.name);
            }
            last_name.clone_from(&point.name);
            let angle1 = ctx.eval(&mut node.angle1)?;
            let length1 = ctx.eval_length(&mut node.length1)?;
            let angle2 = ctx.eval(&mut node.angle2)?;
            let length2 = ctx.eval_length(&mut node.length2)?;
            knots.push(SplinePoint::new(point.position, angle1, length1, angle2, length2));
        }

        let name = format!("SplPath_{first_name}_{last_name}");
        let id = place_curve(ctx, target, 0, |_| {
            let path = SplinePath::new(knots.clone()).with_info(self.style.info(name.clone()));
            GObject::SplinePath(path)
        })?;

        let path = ctx.container.spline_path(id)?.clone();
        let scale = ctx.scale_for(path.info.approximation_scale);
        ctx.register_curve_length(&name, path.length(scale));
        Ok(ToolOutcome { ids: vec![id] })
    }
}

/// A cubic segment through four known points.
#[derive(Debug, Clone, PartialEq)]
pub struct CubicBezierTool {
    pub p1: ObjectId,
    pub p2: ObjectId,
    pub p3: ObjectId,
    pub p4: ObjectId,
    pub style: CurveStyle,
}

impl CubicBezierTool {
    pub fn apply(
        &mut self,
        ctx: &mut ToolContext<'_>,
        target: &Target,
    ) -> Result<ToolOutcome, ToolError> {
        let p1 = ctx.container.point(self.p1)?.clone();
        let p2 = ctx.container.point(self.p2)?.clone();
        let p3 = ctx.container.point(self.p3)?.clone();
        let p4 = ctx.container.point(self.p4)?.clone();

        let name = format!("Cubic_{}_{}", p1.name, p4.name);
        let id = place_curve(ctx, target, 0, |_| {
            let bezier = CubicBezier::new(p1.position, p2.position, p3.position, p4.position)
                .with_info(self.style.info(name.clone()));
            GObject::CubicBezier(bezier)
        })?;

        let bezier = ctx.container.cubic_bezier(id)?.clone();
        let scale = ctx.scale_for(bezier.info.approximation_scale);
        ctx.register_curve_length(&name, bezier.length(scale));
        Ok(ToolOutcome { ids: vec![id] })
    }
}

/// A chain of cubic segments through `3n + 1` known points.
#[derive(Debug, Clone, PartialEq)]
pub struct CubicBezierPathTool {
    pub points: Vec<ObjectId>,
    pub style: CurveStyle,
}

impl CubicBezierPathTool {
    pub fn apply(
        &mut self,
        ctx: &mut ToolContext<'_>,
        target: &Target,
    ) -> Result<ToolOutcome, ToolError> {
        if self.points.len() < 4 || self.points.len() % 3 != 1 {
            return Err(ToolError::Construction(
                "cubic bezier path needs 3n + 1 points".to_owned(),
            ));
        }

        let mut positions = Vec::with_capacity(self.points.len());
        let mut first_name = String::new();
        let mut last_name = String::new();
        for (index, &point_id) in self.points.iter().enumerate() {
            let point = ctx.container.point(point_id)?.clone();
            if index == 0 {
                first_name.clone_from(&point.name);
            }
            last_name.clone_from(&point.name);
            positions.push(point.position);
        }

        let name = format!("Cubic_{first_name}_{last_name}");
        let id = place_curve(ctx, target, 0, |_| {
            let path =
                CubicBezierPath::new(positions.clone()).with_info(self.style.info(name.clone()));
            GObject::CubicBezierPath(path)
        })?;

        let path = ctx.container.cubic_bezier_path(id)?.clone();
        let scale = ctx.scale_for(path.info.approximation_scale);
        ctx.register_curve_length(&name, path.length(scale));
        Ok(ToolOutcome { ids: vec![id] })
    }
}
