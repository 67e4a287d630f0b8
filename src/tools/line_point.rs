//! Tools that place a point at a formula-driven distance along some
//! constructed direction.

use crate::container::ObjectId;
use crate::formula::Formula;
use crate::geom::core::{Line2, Point2};
use crate::geom::curve::GObject;
use crate::geom::intersect::{LineCircleIntersections, intersect_line_circle};
use crate::geom::point::Point;
use crate::tools::{Target, ToolContext, ToolError, ToolOutcome, place};

fn new_point(name: &str, position: Point2) -> GObject {
    GObject::Point(Point::new(name, position))
}

/// A point on the line through two known points, at a formula length from
/// the first. A negative length walks the opposite direction.
#[derive(Debug, Clone, PartialEq)]
pub struct AlongLine {
    pub name: String,
    pub first: ObjectId,
    pub second: ObjectId,
    pub length: Formula,
}

impl AlongLine {
    pub fn apply(
        &mut self,
        ctx: &mut ToolContext<'_>,
        target: &Target,
    ) -> Result<ToolOutcome, ToolError> {
        let first = ctx.container.point(self.first)?.clone();
        let second = ctx.container.point(self.second)?.clone();
        let length = ctx.eval_length(&mut self.length)?;

        let base = Line2::new(first.position, second.position);
        let position = if base.is_null() {
            ctx.degenerate(
                &format!("points {} and {} coincide", first.name, second.name),
                Some(first.position),
            )?
        } else {
            base.with_length(length).p2
        };

        let id = place(ctx, target, 0, new_point(&self.name, position))?;
        let drawn = Line2::new(first.position, position);
        ctx.register_line(&first.name, &self.name, drawn.length(), drawn.angle());
        Ok(ToolOutcome { ids: vec![id] })
    }
}

/// A point on the extension of a base line, at a formula distance from a
/// third (shoulder) point.
#[derive(Debug, Clone, PartialEq)]
pub struct ShoulderPoint {
    pub name: String,
    pub line_p1: ObjectId,
    pub line_p2: ObjectId,
    pub shoulder: ObjectId,
    pub length: Formula,
}

impl ShoulderPoint {
    pub fn apply(
        &mut self,
        ctx: &mut ToolContext<'_>,
        target: &Target,
    ) -> Result<ToolOutcome, ToolError> {
        let p1 = ctx.container.point(self.line_p1)?.clone();
        let p2 = ctx.container.point(self.line_p2)?.clone();
        let shoulder = ctx.container.point(self.shoulder)?.clone();
        let length = ctx.eval_length(&mut self.length)?;

        let base = Line2::new(p1.position, p2.position);
        let position = find_shoulder_point(ctx, base, shoulder.position, length)?;

        let id = place(ctx, target, 0, new_point(&self.name, position))?;
        let drawn = Line2::new(p1.position, position);
        ctx.register_line(&p1.name, &self.name, drawn.length(), drawn.angle());
        Ok(ToolOutcome { ids: vec![id] })
    }
}

/// Intersect the circle around the shoulder with the carrier of the base
/// line, preferring the candidate that continues the base direction and
/// lies farthest from the line start.
fn find_shoulder_point(
    ctx: &ToolContext<'_>,
    base: Line2,
    shoulder: Point2,
    length: f64,
) -> Result<Point2, ToolError> {
    let candidates: Vec<Point2> = match intersect_line_circle(shoulder, length, base) {
        LineCircleIntersections::None => Vec::new(),
        LineCircleIntersections::Tangent(point) => vec![point],
        LineCircleIntersections::Two(a, b) => vec![a, b],
    };

    if candidates.is_empty() {
        return Err(ToolError::Construction(
            "base line does not reach the shoulder circle".to_owned(),
        ));
    }

    let direction = base.p2 - base.p1;
    let forward = candidates
        .iter()
        .copied()
        .filter(|candidate| (*candidate - base.p1).dot(direction) > 0.0)
        .max_by(|a, b| {
            a.distance_to(base.p1).total_cmp(&b.distance_to(base.p1))
        });

    match forward {
        Some(point) => Ok(point),
        None => {
            let fallback = candidates
                .iter()
                .copied()
                .max_by(|a, b| a.distance_to(base.p1).total_cmp(&b.distance_to(base.p1)));
            ctx.degenerate("no shoulder candidate continues the base line", fallback)
        }
    }
}

/// A point at a formula length along the normal of a base line, with an
/// optional extra rotation.
#[derive(Debug, Clone, PartialEq)]
pub struct Normal {
    pub name: String,
    pub first: ObjectId,
    pub second: ObjectId,
    pub length: Formula,
    /// Extra angle in degrees added to the 90 degree normal.
    pub angle: f64,
}

impl Normal {
    pub fn apply(
        &mut self,
        ctx: &mut ToolContext<'_>,
        target: &Target,
    ) -> Result<ToolOutcome, ToolError> {
        let first = ctx.container.point(self.first)?.clone();
        let second = ctx.container.point(self.second)?.clone();
        let length = ctx.eval_length(&mut self.length)?;

        let base = Line2::new(first.position, second.position);
        if base.is_null() {
            let fallback = first.position;
            let position = ctx.degenerate(
                &format!("points {} and {} coincide", first.name, second.name),
                Some(fallback),
            )?;
            let id = place(ctx, target, 0, new_point(&self.name, position))?;
            return Ok(ToolOutcome { ids: vec![id] });
        }

        let direction = base.normal_vector().angle() + self.angle;
        let position = Line2::from_polar(first.position, length, direction).p2;

        let id = place(ctx, target, 0, new_point(&self.name, position))?;
        let drawn = Line2::new(first.position, position);
        ctx.register_line(&first.name, &self.name, drawn.length(), drawn.angle());
        Ok(ToolOutcome { ids: vec![id] })
    }
}

/// A point along the bisector of the angle formed at `second` by `first`
/// and `third`.
#[derive(Debug, Clone, PartialEq)]
pub struct Bisector {
    pub name: String,
    pub first: ObjectId,
    pub second: ObjectId,
    pub third: ObjectId,
    pub length: Formula,
}

impl Bisector {
    /// Direction of the bisector at `vertex`, in degrees.
    #[must_use]
    pub fn bisector_angle(first: Point2, vertex: Point2, third: Point2) -> f64 {
        let leg1 = Line2::new(vertex, first);
        let leg2 = Line2::new(vertex, third);
        leg1.angle() + leg1.angle_to(leg2) / 2.0
    }

    pub fn apply(
        &mut self,
        ctx: &mut ToolContext<'_>,
        target: &Target,
    ) -> Result<ToolOutcome, ToolError> {
        let first = ctx.container.point(self.first)?.clone();
        let vertex = ctx.container.point(self.second)?.clone();
        let third = ctx.container.point(self.third)?.clone();
        let length = ctx.eval_length(&mut self.length)?;

        if first.position.fuzzy_eq(vertex.position) || third.position.fuzzy_eq(vertex.position) {
            let position = ctx.degenerate(
                &format!("bisector legs at {} are degenerate", vertex.name),
                Some(vertex.position),
            )?;
            let id = place(ctx, target, 0, new_point(&self.name, position))?;
            return Ok(ToolOutcome { ids: vec![id] });
        }

        let angle = Self::bisector_angle(first.position, vertex.position, third.position);
        let position = Line2::from_polar(vertex.position, length, angle).p2;

        let id = place(ctx, target, 0, new_point(&self.name, position))?;
        let drawn = Line2::new(vertex.position, position);
        ctx.register_line(&vertex.name, &self.name, drawn.length(), drawn.angle());
        Ok(ToolOutcome { ids: vec![id] })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::Container;
    use crate::formula::EvalOptions;
    use crate::geom::bezier::DEFAULT_APPROXIMATION_SCALE;
    use crate::tools::Policy;
    use crate::units::Unit;

    fn context(container: &mut Container) -> ToolContext<'_> {
        ToolContext {
            container,
            unit: Unit::Px,
            default_scale: DEFAULT_APPROXIMATION_SCALE,
            policy: Policy::Strict,
        }
    }

    fn add_point(container: &mut Container, name: &str, x: f64, y: f64) -> ObjectId {
        container.add(GObject::Point(Point::new(name, Point2::new(x, y))))
    }

    fn formula(text: &str) -> Formula {
        Formula::new(text, Unit::Px, EvalOptions::ANY)
    }

    #[test]
    fn along_line_places_point_at_length() {
        let mut container = Container::new();
        let a = add_point(&mut container, "A", 0.0, 0.0);
        let b = add_point(&mut container, "B", 10.0, 0.0);
        let mut ctx = context(&mut container);

        let mut tool = AlongLine {
            name: "C".to_owned(),
            first: a,
            second: b,
            length: formula("4"),
        };
        let outcome = tool.apply(&mut ctx, &Target::Create).unwrap();
        let point = container.point(outcome.ids[0]).unwrap();
        assert!(point.position.fuzzy_eq(Point2::new(4.0, 0.0)));
        assert!((container.variable("Line_A_C").unwrap() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn along_line_negative_length_goes_backwards() {
        let mut container = Container::new();
        let a = add_point(&mut container, "A", 0.0, 0.0);
        let b = add_point(&mut container, "B", 10.0, 0.0);
        let mut ctx = context(&mut container);

        let mut tool = AlongLine {
            name: "C".to_owned(),
            first: a,
            second: b,
            length: formula("-3"),
        };
        let outcome = tool.apply(&mut ctx, &Target::Create).unwrap();
        let point = container.point(outcome.ids[0]).unwrap();
        assert!(point.position.fuzzy_eq(Point2::new(-3.0, 0.0)));
    }

    #[test]
    fn normal_is_left_of_the_base_line() {
        let mut container = Container::new();
        let a = add_point(&mut container, "A", 0.0, 0.0);
        let b = add_point(&mut container, "B", 10.0, 0.0);
        let mut ctx = context(&mut container);

        let mut tool = Normal {
            name: "N".to_owned(),
            first: a,
            second: b,
            length: formula("5"),
            angle: 0.0,
        };
        let outcome = tool.apply(&mut ctx, &Target::Create).unwrap();
        let point = container.point(outcome.ids[0]).unwrap();
        assert!(point.position.fuzzy_eq(Point2::new(0.0, 5.0)));
    }

    #[test]
    fn bisector_splits_a_right_angle() {
        let mut container = Container::new();
        let a = add_point(&mut container, "A", 10.0, 0.0);
        let b = add_point(&mut container, "B", 0.0, 0.0);
        let c = add_point(&mut container, "C", 0.0, 10.0);
        let mut ctx = context(&mut container);

        let mut tool = Bisector {
            name: "D".to_owned(),
            first: a,
            second: b,
            third: c,
            length: formula("2"),
        };
        let outcome = tool.apply(&mut ctx, &Target::Create).unwrap();
        let point = container.point(outcome.ids[0]).unwrap();
        let expected = 2.0 * std::f64::consts::FRAC_1_SQRT_2;
        assert!((point.x() - expected).abs() < 1e-9);
        assert!((point.y() - expected).abs() < 1e-9);
    }

    #[test]
    fn shoulder_point_extends_the_base_line() {
        let mut container = Container::new();
        let a = add_point(&mut container, "A", 0.0, 0.0);
        let b = add_point(&mut container, "B", 5.0, 0.0);
        let s = add_point(&mut container, "S", 0.0, 3.0);
        let mut ctx = context(&mut container);

        let mut tool = ShoulderPoint {
            name: "P".to_owned(),
            line_p1: a,
            line_p2: b,
            shoulder: s,
            length: formula("5"),
        };
        let outcome = tool.apply(&mut ctx, &Target::Create).unwrap();
        let point = container.point(outcome.ids[0]).unwrap();
        // Circle around (0, 3) with radius 5 meets y = 0 at x = +-4.
        assert!(point.position.fuzzy_eq(Point2::new(4.0, 0.0)));
    }

    #[test]
    fn strict_policy_rejects_an_unreachable_shoulder() {
        let mut container = Container::new();
        let a = add_point(&mut container, "A", 0.0, 0.0);
        let b = add_point(&mut container, "B", 5.0, 0.0);
        let s = add_point(&mut container, "S", 0.0, 30.0);
        let mut ctx = context(&mut container);

        let mut tool = ShoulderPoint {
            name: "P".to_owned(),
            line_p1: a,
            line_p2: b,
            shoulder: s,
            length: formula("5"),
        };
        assert!(matches!(
            tool.apply(&mut ctx, &Target::Create),
            Err(ToolError::Construction(_))
        ));
    }
}
