//! Batch transform tools: each source object yields exactly one derived
//! object. Styling and label state are carried over per item, with
//! optional per-item alias and style overrides.

use serde::{Deserialize, Serialize};

use crate::container::ObjectId;
use crate::formula::Formula;
use crate::geom::PenStyle;
use crate::geom::bezier::{Cubic, offset_cubic};
use crate::geom::core::Line2;
use crate::geom::curve::{Curve, GObject};
use crate::geom::spline::SplinePath;
use crate::tools::{Target, ToolContext, ToolError, ToolOutcome, place};

/// One source object of a batch transform. The alias replaces the
/// operation-wide suffix for this object; colour and pen style override
/// the carried-over styling of curve destinations.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceItem {
    pub id: ObjectId,
    pub alias: Option<String>,
    pub color: Option<String>,
    pub pen_style: Option<PenStyle>,
}

impl SourceItem {
    /// An item without overrides: operation suffix, inherited styling.
    #[must_use]
    pub fn plain(id: ObjectId) -> Self {
        Self {
            id,
            alias: None,
            color: None,
            pen_style: None,
        }
    }

    #[must_use]
    pub fn has_overrides(&self) -> bool {
        self.alias.is_some() || self.color.is_some() || self.pen_style.is_some()
    }

    fn suffix<'a>(&'a self, operation_suffix: &'a str) -> &'a str {
        self.alias.as_deref().unwrap_or(operation_suffix)
    }

    fn restyle(&self, object: &mut GObject) {
        if self.color.is_none() && self.pen_style.is_none() {
            return;
        }
        if let Some(info) = object.info_mut() {
            if let Some(color) = &self.color {
                info.color.clone_from(color);
            }
            if let Some(pen_style) = self.pen_style {
                info.pen_style = pen_style;
            }
        }
    }
}

fn check_batch(suffix: &str, sources: &[SourceItem]) -> Result<(), ToolError> {
    if sources.is_empty() {
        return Err(ToolError::Construction(
            "operation has no source objects".to_owned(),
        ));
    }
    if suffix.is_empty() && sources.iter().any(|item| item.alias.is_none()) {
        return Err(ToolError::Construction(
            "operation suffix is empty".to_owned(),
        ));
    }
    Ok(())
}

fn transform_batch(
    ctx: &mut ToolContext<'_>,
    target: &Target,
    suffix: &str,
    sources: &[SourceItem],
    transform: impl Fn(&GObject, &str) -> GObject,
) -> Result<ToolOutcome, ToolError> {
    let mut ids = Vec::with_capacity(sources.len());
    for (index, item) in sources.iter().enumerate() {
        let object = ctx.container.get(item.id)?.clone();
        let mut derived = transform(&object, item.suffix(suffix));
        item.restyle(&mut derived);
        ids.push(place(ctx, target, index, derived)?);
    }
    Ok(ToolOutcome { ids })
}

/// Rotate a batch of objects around a known point.
#[derive(Debug, Clone, PartialEq)]
pub struct Rotation {
    pub origin: ObjectId,
    pub angle: Formula,
    pub suffix: String,
    pub sources: Vec<SourceItem>,
}

impl Rotation {
    pub fn apply(
        &mut self,
        ctx: &mut ToolContext<'_>,
        target: &Target,
    ) -> Result<ToolOutcome, ToolError> {
        check_batch(&self.suffix, &self.sources)?;
        let origin = ctx.container.point(self.origin)?.position;
        let angle = ctx.eval(&mut self.angle)?;
        transform_batch(ctx, target, &self.suffix, &self.sources, |object, suffix| {
            object.rotate(origin, angle, suffix)
        })
    }
}

/// Mirror a batch of objects across the line through two known points.
#[derive(Debug, Clone, PartialEq)]
pub struct FlipByLine {
    pub axis_p1: ObjectId,
    pub axis_p2: ObjectId,
    pub suffix: String,
    pub sources: Vec<SourceItem>,
}

impl FlipByLine {
    pub fn apply(
        &mut self,
        ctx: &mut ToolContext<'_>,
        target: &Target,
    ) -> Result<ToolOutcome, ToolError> {
        check_batch(&self.suffix, &self.sources)?;
        let axis = Line2::new(
            ctx.container.point(self.axis_p1)?.position,
            ctx.container.point(self.axis_p2)?.position,
        );
        if axis.is_null() {
            return Err(ToolError::Construction(
                "flip axis points coincide".to_owned(),
            ));
        }
        transform_batch(ctx, target, &self.suffix, &self.sources, |object, suffix| {
            object.flip(axis, suffix)
        })
    }
}

/// Orientation of a [`FlipByAxis`] mirror axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisType {
    Vertical,
    Horizontal,
}

/// Mirror a batch of objects across a vertical or horizontal axis through
/// a known point.
#[derive(Debug, Clone, PartialEq)]
pub struct FlipByAxis {
    pub origin: ObjectId,
    pub axis: AxisType,
    pub suffix: String,
    pub sources: Vec<SourceItem>,
}

impl FlipByAxis {
    pub fn apply(
        &mut self,
        ctx: &mut ToolContext<'_>,
        target: &Target,
    ) -> Result<ToolOutcome, ToolError> {
        check_batch(&self.suffix, &self.sources)?;
        let origin = ctx.container.point(self.origin)?.position;
        let angle = match self.axis {
            AxisType::Vertical => 90.0,
            AxisType::Horizontal => 0.0,
        };
        let axis = Line2::from_polar(origin, 100.0, angle);
        transform_batch(ctx, target, &self.suffix, &self.sources, |object, suffix| {
            object.flip(axis, suffix)
        })
    }
}

/// Displace a batch of objects by a formula length and angle.
#[derive(Debug, Clone, PartialEq)]
pub struct Move {
    pub length: Formula,
    pub angle: Formula,
    pub suffix: String,
    pub sources: Vec<SourceItem>,
}

impl Move {
    pub fn apply(
        &mut self,
        ctx: &mut ToolContext<'_>,
        target: &Target,
    ) -> Result<ToolOutcome, ToolError> {
        check_batch(&self.suffix, &self.sources)?;
        let length = ctx.eval_length(&mut self.length)?;
        let angle = ctx.eval(&mut self.angle)?;
        transform_batch(ctx, target, &self.suffix, &self.sources, |object, suffix| {
            object.move_(length, angle, suffix)
        })
    }
}

/// Offset any stored curve sideways into a spline path at a formula-driven
/// width. Positive widths offset to the left of the travel direction.
#[derive(Debug, Clone, PartialEq)]
pub struct ParallelCurve {
    pub curve: ObjectId,
    pub width: Formula,
    pub suffix: String,
}

impl ParallelCurve {
    pub fn apply(
        &mut self,
        ctx: &mut ToolContext<'_>,
        target: &Target,
    ) -> Result<ToolOutcome, ToolError> {
        if self.suffix.is_empty() {
            return Err(ToolError::Construction(
                "operation suffix is empty".to_owned(),
            ));
        }
        let curve = ctx.container.curve(self.curve)?;
        let width = ctx.eval_length(&mut self.width)?;

        let cubics: Vec<Cubic> = match &curve {
            Curve::Arc(arc) => arc.cubics(),
            Curve::EllipticalArc(arc) => arc.cubics(),
            Curve::Spline(spline) => vec![spline.cubic()],
            Curve::CubicBezier(bezier) => vec![bezier.cubic()],
            Curve::SplinePath(path) => (0..path.count_segments())
                .map(|index| path.segment(index).cubic())
                .collect(),
            Curve::CubicBezierPath(path) => {
                (0..path.count_segments()).map(|index| path.segment(index)).collect()
            }
        };
        if cubics.is_empty() {
            return Err(ToolError::Construction(format!(
                "curve `{}` is empty and cannot be offset",
                curve.name()
            )));
        }

        let offset: Vec<Cubic> = cubics.iter().map(|cubic| offset_cubic(cubic, width)).collect();
        let path = SplinePath::from_cubics(&offset).with_info(curve.info().derived(&self.suffix));
        let name = path.info.name.clone();
        let scale = ctx.scale_for(path.info.approximation_scale);
        let length = path.length(scale);

        let id = place(ctx, target, 0, GObject::SplinePath(path))?;
        ctx.register_curve_length(&name, length);
        Ok(ToolOutcome { ids: vec![id] })
    }
}
