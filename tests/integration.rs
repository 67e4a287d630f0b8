//! End-to-end drafting scenarios: a document is built tool by tool, edited
//! and recomputed, and its history serialized as a recipe.

use draft_engine::formula::{EvalOptions, Formula, evaluate};
use draft_engine::geom::core::{Line2, Point2};
use draft_engine::geom::intersect::{CircleIntersections, CrossCirclesPoint, intersect_circles};
use draft_engine::geom::point::flip_point;
use draft_engine::tools::{
    AlongLine, ArcTool, BasePoint, CurveStyle, CutArc, FlipByLine, PointOfIntersectionCircles,
    SourceItem, SplineTool,
};
use draft_engine::{Document, FormulaError, Policy, Recipe, ToolKind, Unit};

fn base(name: &str, x: f64, y: f64) -> ToolKind {
    ToolKind::BasePoint(BasePoint {
        name: name.to_owned(),
        position: Point2::new(x, y),
    })
}

fn any(text: &str) -> Formula {
    Formula::new(text, Unit::Px, EvalOptions::ANY)
}

fn positive(text: &str) -> Formula {
    Formula::new(text, Unit::Px, EvalOptions::POSITIVE)
}

#[test]
fn empty_formula_reports_the_contract_string() {
    let error = evaluate("", &std::collections::HashMap::new(), EvalOptions::ANY).unwrap_err();
    assert_eq!(error, FormulaError::Empty);
    assert_eq!(error.to_string(), "Formula is empty");
}

#[test]
fn cutting_a_quarter_arc_in_half() {
    let mut doc = Document::new(Unit::Px);
    let center = doc.apply_tool(base("O", 0.0, 0.0)).unwrap().ids[0];
    let arc = doc
        .apply_tool(ToolKind::Arc(ArcTool {
            center,
            radius: positive("10"),
            f1: any("0"),
            f2: any("90"),
            style: CurveStyle::default(),
        }))
        .unwrap()
        .ids[0];

    let half = 10.0 * std::f64::consts::FRAC_PI_2 / 2.0;
    let outcome = doc
        .apply_tool(ToolKind::CutArc(CutArc {
            name: "M".to_owned(),
            arc,
            length: any(&format!("{half}")),
        }))
        .unwrap();

    let point = doc.container().point(outcome.ids[0]).unwrap();
    assert!((point.x() - 7.071).abs() < 1e-3);
    assert!((point.y() - 7.071).abs() < 1e-3);

    let first = doc.container().arc(outcome.ids[1]).unwrap();
    let second = doc.container().arc(outcome.ids[2]).unwrap();
    assert!((first.sweep() - 45.0).abs() < 1e-6);
    assert!((second.sweep() - 45.0).abs() < 1e-6);
    assert!(first.end_point().fuzzy_eq(second.start_point()));
}

#[test]
fn flipping_across_the_x_axis_negates_y() {
    let flipped = flip_point(
        Point2::new(3.0, 4.0),
        Line2::new(Point2::ORIGIN, Point2::new(1.0, 0.0)),
    );
    assert!(flipped.fuzzy_eq(Point2::new(3.0, -4.0)));

    let mut doc = Document::new(Unit::Px);
    let a = doc.apply_tool(base("A", 0.0, 0.0)).unwrap().ids[0];
    let b = doc.apply_tool(base("B", 10.0, 0.0)).unwrap().ids[0];
    let p = doc.apply_tool(base("P", 3.0, 4.0)).unwrap().ids[0];
    let outcome = doc
        .apply_tool(ToolKind::FlipByLine(FlipByLine {
            axis_p1: a,
            axis_p2: b,
            suffix: "_m".to_owned(),
            sources: vec![SourceItem::plain(p)],
        }))
        .unwrap();

    let mirrored = doc.container().point(outcome.ids[0]).unwrap();
    assert_eq!(mirrored.name, "P_m");
    assert!(mirrored.position.fuzzy_eq(Point2::new(3.0, -4.0)));
}

#[test]
fn circle_crossing_is_deterministic() {
    // Centers (0,0) and (4,0), both radius 3: crossings at (2, +-sqrt 5).
    let CircleIntersections::Two(first, second) =
        intersect_circles(Point2::ORIGIN, 3.0, Point2::new(4.0, 0.0), 3.0)
    else {
        panic!("expected two crossings");
    };
    assert!(first.fuzzy_eq(Point2::new(2.0, -5.0_f64.sqrt())));
    assert!(second.fuzzy_eq(Point2::new(2.0, 5.0_f64.sqrt())));

    let mut doc = Document::new(Unit::Px);
    let c1 = doc.apply_tool(base("A", 0.0, 0.0)).unwrap().ids[0];
    let c2 = doc.apply_tool(base("B", 4.0, 0.0)).unwrap().ids[0];
    let outcome = doc
        .apply_tool(ToolKind::PointOfIntersectionCircles(
            PointOfIntersectionCircles {
                name: "X".to_owned(),
                center1: c1,
                radius1: positive("3"),
                center2: c2,
                radius2: positive("3"),
                pick: CrossCirclesPoint::SecondPoint,
            },
        ))
        .unwrap();
    let point = doc.container().point(outcome.ids[0]).unwrap();
    assert!(point.position.fuzzy_eq(Point2::new(2.0, 5.0_f64.sqrt())));
}

#[test]
fn moving_a_base_point_reflows_the_whole_draft() {
    let mut doc = Document::new(Unit::Px);
    let a = doc.apply_tool(base("A", 0.0, 0.0)).unwrap().ids[0];
    let b = doc.apply_tool(base("B", 10.0, 0.0)).unwrap().ids[0];
    let c = doc
        .apply_tool(ToolKind::AlongLine(AlongLine {
            name: "C".to_owned(),
            first: a,
            second: b,
            length: any("4"),
        }))
        .unwrap()
        .ids[0];
    let spline = doc
        .apply_tool(ToolKind::Spline(SplineTool {
            first: a,
            last: c,
            angle1: any("45"),
            length1: positive("2"),
            angle2: any("225"),
            length2: positive("2"),
            style: CurveStyle::default(),
        }))
        .unwrap()
        .ids[0];

    assert!(doc
        .container()
        .point(c)
        .unwrap()
        .position
        .fuzzy_eq(Point2::new(4.0, 0.0)));

    doc.move_base_point(b, Point2::new(0.0, 20.0)).unwrap();
    let report = doc.recompute(&[b], Policy::Strict);
    assert!(report.is_clean());
    assert_eq!(report.updated, vec![c, spline]);

    // Same ids, new geometry: C follows the turned line and the spline
    // follows C.
    assert!(doc
        .container()
        .point(c)
        .unwrap()
        .position
        .fuzzy_eq(Point2::new(0.0, 4.0)));
    assert!(doc
        .container()
        .spline(spline)
        .unwrap()
        .p4
        .fuzzy_eq(Point2::new(0.0, 4.0)));
    assert!((doc.container().variable("Line_A_C").unwrap() - 4.0).abs() < 1e-9);
}

#[test]
fn formula_edit_via_set_tool_reflows_dependents() {
    let mut doc = Document::new(Unit::Px);
    let a = doc.apply_tool(base("A", 0.0, 0.0)).unwrap().ids[0];
    let b = doc.apply_tool(base("B", 10.0, 0.0)).unwrap().ids[0];
    let c = doc
        .apply_tool(ToolKind::AlongLine(AlongLine {
            name: "C".to_owned(),
            first: a,
            second: b,
            length: any("4"),
        }))
        .unwrap()
        .ids[0];
    let d = doc
        .apply_tool(ToolKind::AlongLine(AlongLine {
            name: "D".to_owned(),
            first: a,
            second: c,
            length: any("Line_A_C * 2"),
        }))
        .unwrap()
        .ids[0];

    doc.set_tool(
        c,
        ToolKind::AlongLine(AlongLine {
            name: "C".to_owned(),
            first: a,
            second: b,
            length: any("3"),
        }),
    )
    .unwrap();
    let report = doc.recompute(&[c], Policy::Strict);
    assert!(report.is_clean());
    assert!(doc
        .container()
        .point(d)
        .unwrap()
        .position
        .fuzzy_eq(Point2::new(6.0, 0.0)));
}

#[test]
fn lenient_recompute_records_failures_and_continues() {
    let mut doc = Document::new(Unit::Px);
    let a = doc.apply_tool(base("A", 0.0, 0.0)).unwrap().ids[0];
    let b = doc.apply_tool(base("B", 4.0, 0.0)).unwrap().ids[0];
    let x = doc
        .apply_tool(ToolKind::PointOfIntersectionCircles(
            PointOfIntersectionCircles {
                name: "X".to_owned(),
                center1: a,
                radius1: positive("3"),
                center2: b,
                radius2: positive("3"),
                pick: CrossCirclesPoint::SecondPoint,
            },
        ))
        .unwrap()
        .ids[0];
    let y = doc
        .apply_tool(ToolKind::AlongLine(AlongLine {
            name: "Y".to_owned(),
            first: a,
            second: b,
            length: any("2"),
        }))
        .unwrap()
        .ids[0];

    // Move B out of reach of both circles; the crossing fails, the
    // along-line point still refreshes.
    doc.move_base_point(b, Point2::new(100.0, 0.0)).unwrap();
    let report = doc.recompute(&[b], Policy::Lenient);
    assert!(report.aborted.is_none());
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].ids, vec![x]);
    assert!(report.updated.contains(&y));
}

#[test]
fn recipe_round_trips_through_json() {
    let mut doc = Document::new(Unit::Cm);
    let a = doc
        .apply_tool(base("A", 0.0, 0.0))
        .unwrap()
        .ids[0];
    let b = doc
        .apply_tool(base("B", Unit::Cm.to_pixel(20.0), 0.0))
        .unwrap()
        .ids[0];
    doc.apply_tool(ToolKind::AlongLine(AlongLine {
        name: "C".to_owned(),
        first: a,
        second: b,
        length: Formula::new("20 / 4", Unit::Cm, EvalOptions::ANY),
    }))
    .unwrap();

    let recipe = Recipe::from_document(&doc).unwrap();
    let json: serde_json::Value = serde_json::from_str(&recipe.to_json().unwrap()).unwrap();

    assert_eq!(json["unit"], "cm");
    let steps = json["steps"].as_array().unwrap();
    assert_eq!(steps.len(), 3);
    assert_eq!(steps[1]["tool"], "basePoint");
    assert!((steps[1]["details"]["x"].as_f64().unwrap() - 20.0).abs() < 1e-9);
    assert_eq!(steps[2]["tool"], "alongLine");
    assert_eq!(steps[2]["references"][0], "A");
    assert_eq!(steps[2]["formulas"][0]["formula"], "20 / 4");
    assert!((steps[2]["formulas"][0]["value"].as_f64().unwrap() - 5.0).abs() < 1e-9);
}
