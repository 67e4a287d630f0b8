//! Tools that place a point where constructed geometry crosses.

use crate::container::ObjectId;
use crate::formula::Formula;
use crate::geom::core::{Intersection, Line2, Point2, intersect_lines};
use crate::geom::curve::GObject;
use crate::geom::intersect::{
    CircleIntersections, CrossCirclesPoint, HCrossCurvesPoint, LineCircleIntersections,
    VCrossCurvesPoint, intersect_circles, intersect_line_circle, intersect_polylines,
    select_crossing,
};
use crate::geom::point::Point;
use crate::tools::{Target, ToolContext, ToolError, ToolOutcome, place};

fn new_point(name: &str, position: Point2) -> GObject {
    GObject::Point(Point::new(name, position))
}

/// The crossing of two lines given by two points each. The carrier lines
/// are intersected, so the crossing may lie outside either segment.
#[derive(Debug, Clone, PartialEq)]
pub struct LineIntersect {
    pub name: String,
    pub line1_p1: ObjectId,
    pub line1_p2: ObjectId,
    pub line2_p1: ObjectId,
    pub line2_p2: ObjectId,
}

impl LineIntersect {
    pub fn apply(
        &mut self,
        ctx: &mut ToolContext<'_>,
        target: &Target,
    ) -> Result<ToolOutcome, ToolError> {
        let line1 = Line2::new(
            ctx.container.point(self.line1_p1)?.position,
            ctx.container.point(self.line1_p2)?.position,
        );
        let line2 = Line2::new(
            ctx.container.point(self.line2_p1)?.position,
            ctx.container.point(self.line2_p2)?.position,
        );

        let position = match intersect_lines(line1, line2) {
            Intersection::Bounded(point) | Intersection::Unbounded(point) => point,
            Intersection::None => {
                return Err(ToolError::Construction("lines are parallel".to_owned()));
            }
        };

        let id = place(ctx, target, 0, new_point(&self.name, position))?;
        Ok(ToolOutcome { ids: vec![id] })
    }
}

/// A point combining the x coordinate of one point with the y coordinate
/// of another.
#[derive(Debug, Clone, PartialEq)]
pub struct PointOfIntersection {
    pub name: String,
    pub first: ObjectId,
    pub second: ObjectId,
}

impl PointOfIntersection {
    pub fn apply(
        &mut self,
        ctx: &mut ToolContext<'_>,
        target: &Target,
    ) -> Result<ToolOutcome, ToolError> {
        let first = ctx.container.point(self.first)?.position;
        let second = ctx.container.point(self.second)?.position;
        let position = Point2::new(first.x, second.y);
        let id = place(ctx, target, 0, new_point(&self.name, position))?;
        Ok(ToolOutcome { ids: vec![id] })
    }
}

/// The crossing of a line with a circle around a known center. Candidates
/// on the segment itself win; otherwise the one closest to the line start.
#[derive(Debug, Clone, PartialEq)]
pub struct PointOfContact {
    pub name: String,
    pub center: ObjectId,
    pub radius: Formula,
    pub first: ObjectId,
    pub second: ObjectId,
}

impl PointOfContact {
    pub fn apply(
        &mut self,
        ctx: &mut ToolContext<'_>,
        target: &Target,
    ) -> Result<ToolOutcome, ToolError> {
        let center = ctx.container.point(self.center)?.position;
        let radius = ctx.eval_length(&mut self.radius)?;
        let line = Line2::new(
            ctx.container.point(self.first)?.position,
            ctx.container.point(self.second)?.position,
        );

        let candidates: Vec<Point2> = match intersect_line_circle(center, radius, line) {
            LineCircleIntersections::None => Vec::new(),
            LineCircleIntersections::Tangent(point) => vec![point],
            LineCircleIntersections::Two(a, b) => vec![a, b],
        };
        if candidates.is_empty() {
            return Err(ToolError::Construction(
                "line does not reach the circle".to_owned(),
            ));
        }

        let on_segment: Vec<Point2> = candidates
            .iter()
            .copied()
            .filter(|candidate| line.contains_point(*candidate))
            .collect();
        let pool = if on_segment.is_empty() { &candidates } else { &on_segment };
        let position = pool
            .iter()
            .copied()
            .min_by(|a, b| a.distance_to(line.p1).total_cmp(&b.distance_to(line.p1)))
            .unwrap_or(line.p1);

        let id = place(ctx, target, 0, new_point(&self.name, position))?;
        Ok(ToolOutcome { ids: vec![id] })
    }
}

/// One of the two crossings of a pair of formula-radius circles.
#[derive(Debug, Clone, PartialEq)]
pub struct PointOfIntersectionCircles {
    pub name: String,
    pub center1: ObjectId,
    pub radius1: Formula,
    pub center2: ObjectId,
    pub radius2: Formula,
    pub pick: CrossCirclesPoint,
}

impl PointOfIntersectionCircles {
    pub fn apply(
        &mut self,
        ctx: &mut ToolContext<'_>,
        target: &Target,
    ) -> Result<ToolOutcome, ToolError> {
        let c1 = ctx.container.point(self.center1)?.position;
        let c2 = ctx.container.point(self.center2)?.position;
        let r1 = ctx.eval_length(&mut self.radius1)?;
        let r2 = ctx.eval_length(&mut self.radius2)?;

        let position = match intersect_circles(c1, r1, c2, r2) {
            CircleIntersections::None => {
                return Err(ToolError::Construction(
                    "circles do not intersect".to_owned(),
                ));
            }
            CircleIntersections::Coincident => {
                return Err(ToolError::Construction("circles coincide".to_owned()));
            }
            CircleIntersections::Tangent(point) => point,
            CircleIntersections::Two(first, second) => match self.pick {
                CrossCirclesPoint::FirstPoint => first,
                CrossCirclesPoint::SecondPoint => second,
            },
        };

        let id = place(ctx, target, 0, new_point(&self.name, position))?;
        Ok(ToolOutcome { ids: vec![id] })
    }
}

/// The crossing of two stored arcs: the circle solution filtered to lie on
/// both swept ranges.
#[derive(Debug, Clone, PartialEq)]
pub struct PointOfIntersectionArcs {
    pub name: String,
    pub first_arc: ObjectId,
    pub second_arc: ObjectId,
    pub pick: CrossCirclesPoint,
}

impl PointOfIntersectionArcs {
    pub fn apply(
        &mut self,
        ctx: &mut ToolContext<'_>,
        target: &Target,
    ) -> Result<ToolOutcome, ToolError> {
        let first = ctx.container.arc(self.first_arc)?.clone();
        let second = ctx.container.arc(self.second_arc)?.clone();

        let chosen = match intersect_circles(
            first.center,
            first.radius.abs(),
            second.center,
            second.radius.abs(),
        ) {
            CircleIntersections::None => {
                return Err(ToolError::Construction("arcs do not intersect".to_owned()));
            }
            CircleIntersections::Coincident => {
                return Err(ToolError::Construction("arcs coincide".to_owned()));
            }
            CircleIntersections::Tangent(point) => point,
            CircleIntersections::Two(a, b) => match self.pick {
                CrossCirclesPoint::FirstPoint => a,
                CrossCirclesPoint::SecondPoint => b,
            },
        };

        let angle1 = (chosen - first.center).angle();
        let angle2 = (chosen - second.center).angle();
        let position = if first.contains_angle(angle1) && second.contains_angle(angle2) {
            chosen
        } else {
            ctx.degenerate(
                "chosen crossing lies outside an arc's swept range",
                Some(chosen),
            )?
        };

        let id = place(ctx, target, 0, new_point(&self.name, position))?;
        Ok(ToolOutcome { ids: vec![id] })
    }
}

/// The crossing of two sampled curves, disambiguated by a vertical and a
/// horizontal preference.
#[derive(Debug, Clone, PartialEq)]
pub struct PointOfIntersectionCurves {
    pub name: String,
    pub first_curve: ObjectId,
    pub second_curve: ObjectId,
    pub vertical: VCrossCurvesPoint,
    pub horizontal: HCrossCurvesPoint,
}

impl PointOfIntersectionCurves {
    pub fn apply(
        &mut self,
        ctx: &mut ToolContext<'_>,
        target: &Target,
    ) -> Result<ToolOutcome, ToolError> {
        let first = ctx.container.curve(self.first_curve)?;
        let second = ctx.container.curve(self.second_curve)?;

        let first_points = first.points(first.scale_or(ctx.default_scale));
        let second_points = second.points(second.scale_or(ctx.default_scale));
        let crossings = intersect_polylines(&first_points, &second_points);

        let position = select_crossing(&crossings, self.vertical, self.horizontal).ok_or_else(
            || ToolError::Construction("curves do not intersect".to_owned()),
        )?;

        let id = place(ctx, target, 0, new_point(&self.name, position))?;
        Ok(ToolOutcome { ids: vec![id] })
    }
}
