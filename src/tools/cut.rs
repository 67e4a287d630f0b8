//! Tools that cut a curve at a formula length, producing the cut point and
//! the two sub-curves as first-class objects.

use crate::container::ObjectId;
use crate::formula::Formula;
use crate::geom::curve::GObject;
use crate::geom::point::Point;
use crate::tools::{Target, ToolContext, ToolError, ToolOutcome, place};

/// Resolve a raw cut length against the curve's full length: negative
/// values measure from the end, out-of-range values fail (strict) or clamp
/// (lenient).
fn resolve_cut_length(
    ctx: &ToolContext<'_>,
    raw: f64,
    full: f64,
) -> Result<f64, ToolError> {
    let length = if raw < 0.0 { full + raw } else { raw };
    if (0.0..=full).contains(&length) {
        Ok(length)
    } else {
        ctx.degenerate(
            &format!("cut length {length:.3} is outside [0, {full:.3}]"),
            Some(length.clamp(0.0, full)),
        )
    }
}

/// Cut a stored arc.
#[derive(Debug, Clone, PartialEq)]
pub struct CutArc {
    pub name: String,
    pub arc: ObjectId,
    pub length: Formula,
}

impl CutArc {
    pub fn apply(
        &mut self,
        ctx: &mut ToolContext<'_>,
        target: &Target,
    ) -> Result<ToolOutcome, ToolError> {
        let arc = ctx.container.arc(self.arc)?.clone();
        let raw = ctx.eval_length(&mut self.length)?;
        let length = resolve_cut_length(ctx, raw, arc.length())?;

        let (position, mut first, mut second) = arc.cut_at(length);
        first.info = arc.info.derived("_1");
        second.info = arc.info.derived("_2");

        let point_id = place(ctx, target, 0, GObject::Point(Point::new(&self.name, position)))?;
        let first_id = place(ctx, target, 1, GObject::Arc(first))?;
        let second_id = place(ctx, target, 2, GObject::Arc(second))?;
        Ok(ToolOutcome {
            ids: vec![point_id, first_id, second_id],
        })
    }
}

/// Cut a stored spline or cubic bezier segment.
#[derive(Debug, Clone, PartialEq)]
pub struct CutSpline {
    pub name: String,
    pub curve: ObjectId,
    pub length: Formula,
}

impl CutSpline {
    pub fn apply(
        &mut self,
        ctx: &mut ToolContext<'_>,
        target: &Target,
    ) -> Result<ToolOutcome, ToolError> {
        let object = ctx.container.get(self.curve)?.clone();
        let raw = ctx.eval_length(&mut self.length)?;

        let (position, first, second) = match object {
            GObject::Spline(spline) => {
                let scale = ctx.scale_for(spline.info.approximation_scale);
                let length = resolve_cut_length(ctx, raw, spline.length(scale))?;
                let (position, mut head, mut tail) = spline.cut_at(length, scale);
                head.info = spline.info.derived("_1");
                tail.info = spline.info.derived("_2");
                (position, GObject::Spline(head), GObject::Spline(tail))
            }
            GObject::CubicBezier(bezier) => {
                let scale = ctx.scale_for(bezier.info.approximation_scale);
                let length = resolve_cut_length(ctx, raw, bezier.length(scale))?;
                let (position, mut head, mut tail) = bezier.cut_at(length, scale);
                head.info = bezier.info.derived("_1");
                tail.info = bezier.info.derived("_2");
                (position, GObject::CubicBezier(head), GObject::CubicBezier(tail))
            }
            other => {
                return Err(ToolError::Construction(format!(
                    "object `{}` is a {}, not a spline",
                    other.name(),
                    other.kind()
                )));
            }
        };

        let point_id = place(ctx, target, 0, GObject::Point(Point::new(&self.name, position)))?;
        let first_id = place(ctx, target, 1, first)?;
        let second_id = place(ctx, target, 2, second)?;
        Ok(ToolOutcome {
            ids: vec![point_id, first_id, second_id],
        })
    }
}

/// Cut a stored spline path or cubic bezier path.
#[derive(Debug, Clone, PartialEq)]
pub struct CutSplinePath {
    pub name: String,
    pub path: ObjectId,
    pub length: Formula,
}

impl CutSplinePath {
    pub fn apply(
        &mut self,
        ctx: &mut ToolContext<'_>,
        target: &Target,
    ) -> Result<ToolOutcome, ToolError> {
        let object = ctx.container.get(self.path)?.clone();
        let raw = ctx.eval_length(&mut self.length)?;

        let (position, first, second) = match object {
            GObject::SplinePath(path) => {
                let scale = ctx.scale_for(path.info.approximation_scale);
                let length = resolve_cut_length(ctx, raw, path.length(scale))?;
                let (position, mut head, mut tail) = path.cut_at(length, scale);
                head.info = path.info.derived("_1");
                tail.info = path.info.derived("_2");
                (position, GObject::SplinePath(head), GObject::SplinePath(tail))
            }
            GObject::CubicBezierPath(path) => {
                let scale = ctx.scale_for(path.info.approximation_scale);
                let length = resolve_cut_length(ctx, raw, path.length(scale))?;
                let (position, mut head, mut tail) = path.cut_at(length, scale);
                head.info = path.info.derived("_1");
                tail.info = path.info.derived("_2");
                (
                    position,
                    GObject::CubicBezierPath(head),
                    GObject::CubicBezierPath(tail),
                )
            }
            other => {
                return Err(ToolError::Construction(format!(
                    "object `{}` is a {}, not a path",
                    other.name(),
                    other.kind()
                )));
            }
        };

        let point_id = place(ctx, target, 0, GObject::Point(Point::new(&self.name, position)))?;
        let first_id = place(ctx, target, 1, first)?;
        let second_id = place(ctx, target, 2, second)?;
        Ok(ToolOutcome {
            ids: vec![point_id, first_id, second_id],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::Container;
    use crate::formula::EvalOptions;
    use crate::geom::arc::Arc;
    use crate::geom::bezier::DEFAULT_APPROXIMATION_SCALE;
    use crate::geom::core::Point2;
    use crate::geom::spline::Spline;
    use crate::geom::CurveInfo;
    use crate::tools::Policy;
    use crate::units::Unit;

    fn context(container: &mut Container, policy: Policy) -> ToolContext<'_> {
        ToolContext {
            container,
            unit: Unit::Px,
            default_scale: DEFAULT_APPROXIMATION_SCALE,
            policy,
        }
    }

    fn formula(text: &str) -> Formula {
        Formula::new(text, Unit::Px, EvalOptions::ANY)
    }

    fn quarter_arc(container: &mut Container) -> ObjectId {
        let arc = Arc::new(Point2::ORIGIN, 10.0, 0.0, 90.0).with_info(CurveInfo::named("Arc_A_1"));
        container.add(GObject::Arc(arc))
    }

    #[test]
    fn cut_arc_at_half_length() {
        let mut container = Container::new();
        let arc_id = quarter_arc(&mut container);
        let mut ctx = context(&mut container, Policy::Strict);

        let mut tool = CutArc {
            name: "C".to_owned(),
            arc: arc_id,
            length: formula("7.853981633974483"),
        };
        let outcome = tool.apply(&mut ctx, &Target::Create).unwrap();
        assert_eq!(outcome.ids.len(), 3);

        let point = container.point(outcome.ids[0]).unwrap();
        assert!((point.x() - 7.071).abs() < 1e-3);
        assert!((point.y() - 7.071).abs() < 1e-3);

        let first = container.arc(outcome.ids[1]).unwrap();
        let second = container.arc(outcome.ids[2]).unwrap();
        assert_eq!(first.info.name, "Arc_A_1_1");
        assert_eq!(second.info.name, "Arc_A_1_2");
        assert!((first.sweep() - 45.0).abs() < 1e-6);
        assert!((second.sweep() - 45.0).abs() < 1e-6);
    }

    #[test]
    fn negative_length_measures_from_the_end() {
        let mut container = Container::new();
        let arc_id = quarter_arc(&mut container);
        let full = 10.0 * std::f64::consts::FRAC_PI_2;
        let mut ctx = context(&mut container, Policy::Strict);

        let mut tool = CutArc {
            name: "C".to_owned(),
            arc: arc_id,
            length: formula(&format!("-{}", full / 4.0)),
        };
        let outcome = tool.apply(&mut ctx, &Target::Create).unwrap();
        let first = container.arc(outcome.ids[1]).unwrap();
        // Three quarters of the sweep from the start.
        assert!((first.sweep() - 67.5).abs() < 1e-6);
    }

    #[test]
    fn out_of_range_cut_fails_strict_and_clamps_lenient() {
        let mut container = Container::new();
        let arc_id = quarter_arc(&mut container);

        let mut ctx = context(&mut container, Policy::Strict);
        let mut tool = CutArc {
            name: "C".to_owned(),
            arc: arc_id,
            length: formula("100"),
        };
        assert!(matches!(
            tool.apply(&mut ctx, &Target::Create),
            Err(ToolError::Construction(_))
        ));

        let mut ctx = context(&mut container, Policy::Lenient);
        let mut tool = CutArc {
            name: "C".to_owned(),
            arc: arc_id,
            length: formula("100"),
        };
        let outcome = tool.apply(&mut ctx, &Target::Create).unwrap();
        let point = container.point(outcome.ids[0]).unwrap().clone();
        let second = container.arc(outcome.ids[2]).unwrap();
        // Clamped to the end of the arc; the trailing piece is empty.
        assert!(point.position.fuzzy_eq(Point2::new(0.0, 10.0)));
        assert!(second.is_empty());
    }

    #[test]
    fn cut_spline_produces_joined_halves() {
        let mut container = Container::new();
        let spline = Spline::new(Point2::ORIGIN, 0.0, 3.0, Point2::new(10.0, 0.0), 180.0, 3.0)
            .with_info(CurveInfo::named("Spl_A_B"));
        let spline_id = container.add(GObject::Spline(spline));
        let mut ctx = context(&mut container, Policy::Strict);

        let mut tool = CutSpline {
            name: "C".to_owned(),
            curve: spline_id,
            length: formula("4"),
        };
        let outcome = tool.apply(&mut ctx, &Target::Create).unwrap();
        let head = container.spline(outcome.ids[1]).unwrap();
        let tail = container.spline(outcome.ids[2]).unwrap();
        assert!(head.p4.fuzzy_eq(tail.p1));
        assert_eq!(head.info.name, "Spl_A_B_1");
    }

    #[test]
    fn cut_rejects_a_non_curve_object() {
        let mut container = Container::new();
        let point_id = container.add(GObject::Point(Point::new("A", Point2::ORIGIN)));
        let mut ctx = context(&mut container, Policy::Strict);

        let mut tool = CutSpline {
            name: "C".to_owned(),
            curve: point_id,
            length: formula("1"),
        };
        assert!(tool.apply(&mut ctx, &Target::Create).is_err());
    }

    #[test]
    fn update_target_reuses_the_recorded_ids() {
        let mut container = Container::new();
        let arc_id = quarter_arc(&mut container);
        let mut ctx = context(&mut container, Policy::Strict);

        let mut tool = CutArc {
            name: "C".to_owned(),
            arc: arc_id,
            length: formula("5"),
        };
        let created = tool.apply(&mut ctx, &Target::Create).unwrap();

        let mut ctx = context(&mut container, Policy::Strict);
        let mut tool = CutArc {
            name: "C".to_owned(),
            arc: arc_id,
            length: formula("6"),
        };
        let updated = tool
            .apply(
                &mut ctx,
                &Target::Update {
                    ids: created.ids.clone(),
                },
            )
            .unwrap();
        assert_eq!(created.ids, updated.ids);
    }
}
