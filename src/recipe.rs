//! Serializes the tool history into a human-readable construction recipe.
//!
//! The recipe lists every applied tool with the names of the objects it
//! produced and referenced, its formula texts with their last values in
//! document units, and the tool-specific settings. It is a report of the
//! construction, not a reload format.

use serde::Serialize;
use serde_json::{Map, Value, json};
use thiserror::Error;

use crate::container::{Container, ContainerError, ObjectId};
use crate::document::{Document, HistoryEntry};
use crate::formula::Formula;
use crate::tools::{SourceItem, ToolKind};
use crate::units::Unit;

#[derive(Debug, Error)]
pub enum RecipeError {
    #[error(transparent)]
    Container(#[from] ContainerError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// A formula input of a tool: the text as entered and the value of the
/// last evaluation, absent while the formula is invalidated.
#[derive(Debug, Clone, Serialize)]
pub struct FormulaRecord {
    pub role: String,
    pub formula: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

impl FormulaRecord {
    fn new(role: impl Into<String>, formula: &Formula) -> Self {
        Self {
            role: role.into(),
            formula: formula.text().to_owned(),
            value: (!formula.has_error()).then(|| formula.value()),
        }
    }
}

/// One applied tool.
#[derive(Debug, Serialize)]
pub struct Step {
    pub tool: &'static str,
    /// Names of the produced objects, creation order.
    pub produces: Vec<String>,
    /// Names of the referenced objects.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub formulas: Vec<FormulaRecord>,
    /// Tool-specific settings: picks, suffixes, fixed angles.
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub details: Map<String, Value>,
}

/// The full construction recipe of a document.
#[derive(Debug, Serialize)]
pub struct Recipe {
    pub unit: Unit,
    pub steps: Vec<Step>,
}

impl Recipe {
    pub fn from_document(document: &Document) -> Result<Self, RecipeError> {
        let container = document.container();
        let steps = document
            .history()
            .iter()
            .map(|entry| step_for(entry, container, document.unit()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            unit: document.unit(),
            steps,
        })
    }

    pub fn to_json(&self) -> Result<String, RecipeError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, RecipeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn object_names(container: &Container, ids: &[ObjectId]) -> Result<Vec<String>, ContainerError> {
    ids.iter()
        .map(|&id| Ok(container.get(id)?.name().to_owned()))
        .collect()
}

/// Per-source alias and style overrides of a batch transform, one record
/// per item that carries any.
fn source_overrides(
    container: &Container,
    sources: &[SourceItem],
) -> Result<Vec<Value>, RecipeError> {
    let mut records = Vec::new();
    for item in sources.iter().filter(|item| item.has_overrides()) {
        let mut record = Map::new();
        record.insert("object".to_owned(), json!(container.get(item.id)?.name()));
        if let Some(alias) = &item.alias {
            record.insert("alias".to_owned(), json!(alias));
        }
        if let Some(color) = &item.color {
            record.insert("color".to_owned(), json!(color));
        }
        if let Some(pen_style) = item.pen_style {
            record.insert("penStyle".to_owned(), serde_json::to_value(pen_style)?);
        }
        records.push(Value::Object(record));
    }
    Ok(records)
}

fn step_for(
    entry: &HistoryEntry,
    container: &Container,
    unit: Unit,
) -> Result<Step, RecipeError> {
    let mut formulas = Vec::new();
    let mut details = Map::new();

    match &entry.kind {
        ToolKind::BasePoint(tool) => {
            details.insert("x".to_owned(), json!(unit.from_pixel(tool.position.x)));
            details.insert("y".to_owned(), json!(unit.from_pixel(tool.position.y)));
        }
        ToolKind::AlongLine(tool) => {
            formulas.push(FormulaRecord::new("length", &tool.length));
        }
        ToolKind::ShoulderPoint(tool) => {
            formulas.push(FormulaRecord::new("length", &tool.length));
        }
        ToolKind::Normal(tool) => {
            formulas.push(FormulaRecord::new("length", &tool.length));
            details.insert("angle".to_owned(), json!(tool.angle));
        }
        ToolKind::Bisector(tool) => {
            formulas.push(FormulaRecord::new("length", &tool.length));
        }
        ToolKind::LineIntersect(_) | ToolKind::PointOfIntersection(_) => {}
        ToolKind::PointOfContact(tool) => {
            formulas.push(FormulaRecord::new("radius", &tool.radius));
        }
        ToolKind::PointOfIntersectionCircles(tool) => {
            formulas.push(FormulaRecord::new("radius1", &tool.radius1));
            formulas.push(FormulaRecord::new("radius2", &tool.radius2));
            details.insert("pick".to_owned(), serde_json::to_value(tool.pick)?);
        }
        ToolKind::PointOfIntersectionArcs(tool) => {
            details.insert("pick".to_owned(), serde_json::to_value(tool.pick)?);
        }
        ToolKind::PointOfIntersectionCurves(tool) => {
            details.insert("vertical".to_owned(), serde_json::to_value(tool.vertical)?);
            details.insert(
                "horizontal".to_owned(),
                serde_json::to_value(tool.horizontal)?,
            );
        }
        ToolKind::Arc(tool) => {
            formulas.push(FormulaRecord::new("radius", &tool.radius));
            formulas.push(FormulaRecord::new("angle1", &tool.f1));
            formulas.push(FormulaRecord::new("angle2", &tool.f2));
        }
        ToolKind::ArcWithLength(tool) => {
            formulas.push(FormulaRecord::new("radius", &tool.radius));
            formulas.push(FormulaRecord::new("angle1", &tool.f1));
            formulas.push(FormulaRecord::new("length", &tool.length));
        }
        ToolKind::EllipticalArc(tool) => {
            formulas.push(FormulaRecord::new("radius1", &tool.radius1));
            formulas.push(FormulaRecord::new("radius2", &tool.radius2));
            formulas.push(FormulaRecord::new("angle1", &tool.f1));
            formulas.push(FormulaRecord::new("angle2", &tool.f2));
            formulas.push(FormulaRecord::new("rotation", &tool.rotation));
        }
        ToolKind::Spline(tool) => {
            formulas.push(FormulaRecord::new("angle1", &tool.angle1));
            formulas.push(FormulaRecord::new("length1", &tool.length1));
            formulas.push(FormulaRecord::new("angle2", &tool.angle2));
            formulas.push(FormulaRecord::new("length2", &tool.length2));
        }
        ToolKind::SplinePath(tool) => {
            for (index, node) in tool.nodes.iter().enumerate() {
                formulas.push(FormulaRecord::new(format!("angle1.{index}"), &node.angle1));
                formulas.push(FormulaRecord::new(format!("length1.{index}"), &node.length1));
                formulas.push(FormulaRecord::new(format!("angle2.{index}"), &node.angle2));
                formulas.push(FormulaRecord::new(format!("length2.{index}"), &node.length2));
            }
        }
        ToolKind::CubicBezier(_) | ToolKind::CubicBezierPath(_) => {}
        ToolKind::CutArc(tool) => {
            formulas.push(FormulaRecord::new("length", &tool.length));
        }
        ToolKind::CutSpline(tool) => {
            formulas.push(FormulaRecord::new("length", &tool.length));
        }
        ToolKind::CutSplinePath(tool) => {
            formulas.push(FormulaRecord::new("length", &tool.length));
        }
        ToolKind::Rotation(tool) => {
            formulas.push(FormulaRecord::new("angle", &tool.angle));
            details.insert("suffix".to_owned(), json!(tool.suffix));
            let overrides = source_overrides(container, &tool.sources)?;
            if !overrides.is_empty() {
                details.insert("overrides".to_owned(), Value::Array(overrides));
            }
        }
        ToolKind::FlipByLine(tool) => {
            details.insert("suffix".to_owned(), json!(tool.suffix));
            let overrides = source_overrides(container, &tool.sources)?;
            if !overrides.is_empty() {
                details.insert("overrides".to_owned(), Value::Array(overrides));
            }
        }
        ToolKind::FlipByAxis(tool) => {
            details.insert("axis".to_owned(), serde_json::to_value(tool.axis)?);
            details.insert("suffix".to_owned(), json!(tool.suffix));
            let overrides = source_overrides(container, &tool.sources)?;
            if !overrides.is_empty() {
                details.insert("overrides".to_owned(), Value::Array(overrides));
            }
        }
        ToolKind::Move(tool) => {
            formulas.push(FormulaRecord::new("length", &tool.length));
            formulas.push(FormulaRecord::new("angle", &tool.angle));
            details.insert("suffix".to_owned(), json!(tool.suffix));
            let overrides = source_overrides(container, &tool.sources)?;
            if !overrides.is_empty() {
                details.insert("overrides".to_owned(), Value::Array(overrides));
            }
        }
        ToolKind::ParallelCurve(tool) => {
            formulas.push(FormulaRecord::new("width", &tool.width));
            details.insert("suffix".to_owned(), json!(tool.suffix));
        }
    }

    Ok(Step {
        tool: entry.kind.tag(),
        produces: object_names(container, &entry.ids)?,
        references: object_names(container, &entry.kind.source_ids())?,
        formulas,
        details,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::EvalOptions;
    use crate::geom::core::Point2;
    use crate::tools::{AlongLine, ArcTool, BasePoint, CurveStyle};

    fn base(name: &str, x: f64, y: f64) -> ToolKind {
        ToolKind::BasePoint(BasePoint {
            name: name.to_owned(),
            position: Point2::new(x, y),
        })
    }

    #[test]
    fn recipe_lists_tools_with_names_and_formulas() {
        let mut doc = Document::new(Unit::Px);
        let a = doc.apply_tool(base("A", 0.0, 0.0)).unwrap().ids[0];
        let b = doc.apply_tool(base("B", 10.0, 0.0)).unwrap().ids[0];
        doc.apply_tool(ToolKind::AlongLine(AlongLine {
            name: "C".to_owned(),
            first: a,
            second: b,
            length: Formula::new("Line_A_B * 0", Unit::Px, EvalOptions::ANY),
        }))
        .ok();
        doc.apply_tool(ToolKind::AlongLine(AlongLine {
            name: "C".to_owned(),
            first: a,
            second: b,
            length: Formula::new("4", Unit::Px, EvalOptions::ANY),
        }))
        .unwrap();
        doc.apply_tool(ToolKind::Arc(ArcTool {
            center: a,
            radius: Formula::new("10", Unit::Px, EvalOptions::POSITIVE),
            f1: Formula::new("0", Unit::Px, EvalOptions::ANY),
            f2: Formula::new("90", Unit::Px, EvalOptions::ANY),
            style: CurveStyle::default(),
        }))
        .unwrap();

        let recipe = Recipe::from_document(&doc).unwrap();
        assert_eq!(recipe.steps.len(), 4);

        let along = &recipe.steps[2];
        assert_eq!(along.tool, "alongLine");
        assert_eq!(along.produces, vec!["C".to_owned()]);
        assert_eq!(along.references, vec!["A".to_owned(), "B".to_owned()]);
        assert_eq!(along.formulas[0].role, "length");
        assert_eq!(along.formulas[0].formula, "4");
        assert_eq!(along.formulas[0].value, Some(4.0));

        let arc = &recipe.steps[3];
        assert_eq!(arc.tool, "arc");
        assert_eq!(arc.formulas.len(), 3);
        assert!(arc.produces[0].starts_with("Arc_A_"));

        let json: Value = serde_json::from_str(&recipe.to_json().unwrap()).unwrap();
        assert_eq!(json["unit"], "px");
        assert_eq!(json["steps"][0]["tool"], "basePoint");
    }

    #[test]
    fn base_point_positions_come_out_in_document_units() {
        let mut doc = Document::new(Unit::Cm);
        let x = Unit::Cm.to_pixel(2.0);
        doc.apply_tool(base("A", x, 0.0)).unwrap();

        let recipe = Recipe::from_document(&doc).unwrap();
        let step = &recipe.steps[0];
        let x_cm = step.details["x"].as_f64().unwrap();
        assert!((x_cm - 2.0).abs() < 1e-9);
    }

    #[test]
    fn batch_step_lists_per_source_overrides() {
        use crate::geom::PenStyle;
        use crate::tools::{Rotation, SourceItem};

        let mut doc = Document::new(Unit::Px);
        let a = doc.apply_tool(base("A", 0.0, 0.0)).unwrap().ids[0];
        let b = doc.apply_tool(base("B", 5.0, 0.0)).unwrap().ids[0];
        let c = doc.apply_tool(base("C", 0.0, 5.0)).unwrap().ids[0];
        doc.apply_tool(ToolKind::Rotation(Rotation {
            origin: a,
            angle: Formula::new("90", Unit::Px, EvalOptions::ANY),
            suffix: "_r".to_owned(),
            sources: vec![
                SourceItem::plain(b),
                SourceItem {
                    id: c,
                    alias: Some("_back".to_owned()),
                    color: None,
                    pen_style: Some(PenStyle::Dash),
                },
            ],
        }))
        .unwrap();

        let recipe = Recipe::from_document(&doc).unwrap();
        let step = &recipe.steps[3];
        assert_eq!(step.tool, "rotation");
        assert_eq!(step.details["suffix"], "_r");

        let overrides = step.details["overrides"].as_array().unwrap();
        assert_eq!(overrides.len(), 1);
        assert_eq!(overrides[0]["object"], "C");
        assert_eq!(overrides[0]["alias"], "_back");
        assert_eq!(overrides[0]["penStyle"], "dash");
    }

    #[test]
    fn invalidated_formula_has_no_value() {
        let formula = Formula::new("2 + 2", Unit::Px, EvalOptions::ANY);
        let record = FormulaRecord::new("length", &formula);
        assert!(record.value.is_none());
    }
}
