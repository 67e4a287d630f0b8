//! The drafting document: the object container, the dependency graph and
//! the ordered tool history, kept consistent through every edit.

use std::collections::{HashMap, HashSet};

use crate::container::{Container, ObjectId};
use crate::geom::bezier::DEFAULT_APPROXIMATION_SCALE;
use crate::geom::core::Point2;
use crate::tools::{Policy, Target, ToolContext, ToolError, ToolKind, ToolOutcome};
use crate::units::Unit;

/// One applied tool and the ids it produced, in the tool's emission order.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub kind: ToolKind,
    pub ids: Vec<ObjectId>,
}

/// A tool that could not be refreshed during a recomputation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeFailure {
    /// Product ids of the failing tool.
    pub ids: Vec<ObjectId>,
    pub error: ToolError,
}

/// Outcome of a recomputation pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecomputeReport {
    /// Ids refreshed in dependency order.
    pub updated: Vec<ObjectId>,
    /// Tools whose errors were recorded without stopping the pass.
    pub failed: Vec<NodeFailure>,
    /// Set when a strict pass stopped early on a degenerate construction.
    pub aborted: Option<ToolError>,
}

impl RecomputeReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.aborted.is_none()
    }
}

/// A pattern document. Tools are applied in order; every produced object
/// keeps its id for the lifetime of the document, so edits only ever
/// refresh geometry in place.
#[derive(Debug, Clone)]
pub struct Document {
    container: Container,
    graph: crate::graph::DepGraph,
    history: Vec<HistoryEntry>,
    tool_of: HashMap<ObjectId, usize>,
    unit: Unit,
    default_scale: f64,
    block: String,
}

impl Document {
    #[must_use]
    pub fn new(unit: Unit) -> Self {
        Self {
            container: Container::new(),
            graph: crate::graph::DepGraph::new(),
            history: Vec::new(),
            tool_of: HashMap::new(),
            unit,
            default_scale: DEFAULT_APPROXIMATION_SCALE,
            block: "draft".to_owned(),
        }
    }

    #[must_use]
    pub fn unit(&self) -> Unit {
        self.unit
    }

    #[must_use]
    pub fn container(&self) -> &Container {
        &self.container
    }

    #[must_use]
    pub fn graph(&self) -> &crate::graph::DepGraph {
        &self.graph
    }

    #[must_use]
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Curve approximation scale used where a curve carries no preference.
    pub fn set_approximation_scale(&mut self, scale: f64) {
        self.default_scale = scale;
    }

    /// Draw block new objects are filed under.
    pub fn set_block(&mut self, name: impl Into<String>) {
        self.block = name.into();
    }

    /// Apply a tool at the end of the history. Creation is always strict:
    /// a tool that cannot produce its objects is not recorded.
    pub fn apply_tool(&mut self, mut tool: ToolKind) -> Result<ToolOutcome, ToolError> {
        let sources = tool.source_ids();
        for &source in &sources {
            self.container.get(source)?;
        }

        let mut ctx = ToolContext {
            container: &mut self.container,
            unit: self.unit,
            default_scale: self.default_scale,
            policy: Policy::Strict,
        };
        let outcome = tool.apply(&mut ctx, &Target::Create)?;
        log::debug!(
            "applied {} -> {:?} (sources {:?})",
            tool.tag(),
            outcome.ids,
            sources
        );

        for &id in &outcome.ids {
            let kind = self.container.get(id)?.kind();
            self.graph.add_vertex(id, kind, &self.block);
            self.tool_of.insert(id, self.history.len());
        }
        for &source in &sources {
            for &id in &outcome.ids {
                self.graph.add_edge(source, id)?;
            }
        }

        self.history.push(HistoryEntry {
            kind: tool,
            ids: outcome.ids.clone(),
        });
        Ok(outcome)
    }

    /// The tool that produced the given object, if any.
    #[must_use]
    pub fn tool_for(&self, id: ObjectId) -> Option<&ToolKind> {
        self.tool_of.get(&id).map(|&index| &self.history[index].kind)
    }

    /// Reposition a base point in place. The dependents are stale until the
    /// caller recomputes from this id.
    pub fn move_base_point(&mut self, id: ObjectId, position: Point2) -> Result<(), ToolError> {
        let index = *self
            .tool_of
            .get(&id)
            .ok_or(crate::container::ContainerError::UnknownId(id))?;
        let entry = &mut self.history[index];
        let ToolKind::BasePoint(base) = &mut entry.kind else {
            return Err(ToolError::Construction(format!(
                "object {id} is not a base point"
            )));
        };
        base.position = position;

        let target = Target::Update {
            ids: entry.ids.clone(),
        };
        let mut ctx = ToolContext {
            container: &mut self.container,
            unit: self.unit,
            default_scale: self.default_scale,
            policy: Policy::Strict,
        };
        entry.kind.apply(&mut ctx, &target)?;
        Ok(())
    }

    /// Replace the tool behind an object, keeping its product ids. The
    /// replacement must read the same sources so the graph stays valid.
    pub fn set_tool(&mut self, id: ObjectId, tool: ToolKind) -> Result<(), ToolError> {
        let index = *self
            .tool_of
            .get(&id)
            .ok_or(crate::container::ContainerError::UnknownId(id))?;
        if tool.source_ids() != self.history[index].kind.source_ids() {
            return Err(ToolError::Construction(
                "replacement tool reads different source objects".to_owned(),
            ));
        }

        let entry = &mut self.history[index];
        entry.kind = tool;
        let target = Target::Update {
            ids: entry.ids.clone(),
        };
        let mut ctx = ToolContext {
            container: &mut self.container,
            unit: self.unit,
            default_scale: self.default_scale,
            policy: Policy::Strict,
        };
        entry.kind.apply(&mut ctx, &target)?;
        Ok(())
    }

    /// Refresh every transitive dependent of the changed objects, in
    /// dependency order, reusing their ids. Recoverable errors mark the
    /// tool failed and the pass continues; a degenerate construction stops
    /// a strict pass and is recorded in a lenient one.
    pub fn recompute(&mut self, changed: &[ObjectId], policy: Policy) -> RecomputeReport {
        let order = self.graph.dependents_in_order(changed);
        let mut seen = HashSet::new();
        let indices: Vec<usize> = order
            .iter()
            .filter_map(|id| self.tool_of.get(id).copied())
            .filter(|&index| seen.insert(index))
            .collect();
        log::debug!(
            "recompute from {changed:?}: {} dependents, {} tools",
            order.len(),
            indices.len()
        );

        let mut report = RecomputeReport::default();
        for index in indices {
            let entry = &mut self.history[index];
            let target = Target::Update {
                ids: entry.ids.clone(),
            };
            let mut ctx = ToolContext {
                container: &mut self.container,
                unit: self.unit,
                default_scale: self.default_scale,
                policy,
            };
            match entry.kind.apply(&mut ctx, &target) {
                Ok(outcome) => report.updated.extend(outcome.ids),
                Err(error) if error.is_recoverable() || policy == Policy::Lenient => {
                    log::warn!("tool {} failed: {error}", entry.kind.tag());
                    report.failed.push(NodeFailure {
                        ids: entry.ids.clone(),
                        error,
                    });
                }
                Err(error) => {
                    log::warn!("strict recompute aborted at {}: {error}", entry.kind.tag());
                    report.aborted = Some(error);
                    break;
                }
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::{EvalOptions, Formula};
    use crate::tools::{AlongLine, BasePoint, LineIntersect};

    fn length(text: &str) -> Formula {
        Formula::new(text, Unit::Px, EvalOptions::POSITIVE)
    }

    fn base(name: &str, x: f64, y: f64) -> ToolKind {
        ToolKind::BasePoint(BasePoint {
            name: name.to_owned(),
            position: Point2::new(x, y),
        })
    }

    #[test]
    fn applied_tools_register_vertices_and_edges() {
        let mut doc = Document::new(Unit::Px);
        let a = doc.apply_tool(base("A", 0.0, 0.0)).unwrap().ids[0];
        let b = doc.apply_tool(base("B", 10.0, 0.0)).unwrap().ids[0];
        let c = doc
            .apply_tool(ToolKind::AlongLine(AlongLine {
                name: "C".to_owned(),
                first: a,
                second: b,
                length: length("4"),
            }))
            .unwrap()
            .ids[0];

        assert!(doc.graph().contains(c));
        assert_eq!(doc.graph().dependents_in_order(&[a]), vec![c]);
        assert!(doc.container().point(c).unwrap().position.fuzzy_eq(Point2::new(4.0, 0.0)));
    }

    #[test]
    fn tool_referencing_missing_object_is_not_recorded() {
        let mut doc = Document::new(Unit::Px);
        let result = doc.apply_tool(ToolKind::AlongLine(AlongLine {
            name: "C".to_owned(),
            first: 98,
            second: 99,
            length: length("4"),
        }));
        assert!(result.is_err());
        assert!(doc.history().is_empty());
    }

    #[test]
    fn recompute_follows_a_base_point_move_with_stable_ids() {
        let mut doc = Document::new(Unit::Px);
        let a = doc.apply_tool(base("A", 0.0, 0.0)).unwrap().ids[0];
        let b = doc.apply_tool(base("B", 10.0, 0.0)).unwrap().ids[0];
        let c = doc
            .apply_tool(ToolKind::AlongLine(AlongLine {
                name: "C".to_owned(),
                first: a,
                second: b,
                length: length("4"),
            }))
            .unwrap()
            .ids[0];

        doc.move_base_point(b, Point2::new(0.0, 10.0)).unwrap();
        let report = doc.recompute(&[b], Policy::Strict);
        assert!(report.is_clean());
        assert_eq!(report.updated, vec![c]);
        assert!(doc.container().point(c).unwrap().position.fuzzy_eq(Point2::new(0.0, 4.0)));
    }

    #[test]
    fn chained_dependents_refresh_in_order() {
        let mut doc = Document::new(Unit::Px);
        let a = doc.apply_tool(base("A", 0.0, 0.0)).unwrap().ids[0];
        let b = doc.apply_tool(base("B", 10.0, 0.0)).unwrap().ids[0];
        let c = doc
            .apply_tool(ToolKind::AlongLine(AlongLine {
                name: "C".to_owned(),
                first: a,
                second: b,
                length: length("4"),
            }))
            .unwrap()
            .ids[0];
        let d = doc
            .apply_tool(ToolKind::AlongLine(AlongLine {
                name: "D".to_owned(),
                first: c,
                second: b,
                length: length("2"),
            }))
            .unwrap()
            .ids[0];

        doc.move_base_point(a, Point2::new(2.0, 0.0)).unwrap();
        let report = doc.recompute(&[a], Policy::Strict);
        assert_eq!(report.updated, vec![c, d]);
        assert!(doc.container().point(c).unwrap().position.fuzzy_eq(Point2::new(6.0, 0.0)));
        assert!(doc.container().point(d).unwrap().position.fuzzy_eq(Point2::new(8.0, 0.0)));
    }

    #[test]
    fn strict_recompute_stops_on_a_degenerate_construction() {
        let mut doc = Document::new(Unit::Px);
        let a = doc.apply_tool(base("A", 0.0, 0.0)).unwrap().ids[0];
        let b = doc.apply_tool(base("B", 10.0, 0.0)).unwrap().ids[0];
        let c = doc.apply_tool(base("C", 0.0, 10.0)).unwrap().ids[0];
        let d = doc.apply_tool(base("D", 10.0, 10.0)).unwrap().ids[0];
        // A-D crosses B-C while the points sit on two parallel rails.
        doc.apply_tool(ToolKind::LineIntersect(LineIntersect {
            name: "X".to_owned(),
            line1_p1: a,
            line1_p2: d,
            line2_p1: b,
            line2_p2: c,
        }))
        .unwrap();

        // Move D so A-D becomes parallel to B-C.
        doc.move_base_point(d, Point2::new(-10.0, 10.0)).unwrap();
        let strict = doc.recompute(&[d], Policy::Strict);
        assert!(strict.aborted.is_some());

        let lenient = doc.recompute(&[d], Policy::Lenient);
        assert!(lenient.aborted.is_none());
        assert_eq!(lenient.failed.len(), 1);
    }

    #[test]
    fn set_tool_keeps_ids_and_requires_matching_sources() {
        let mut doc = Document::new(Unit::Px);
        let a = doc.apply_tool(base("A", 0.0, 0.0)).unwrap().ids[0];
        let b = doc.apply_tool(base("B", 10.0, 0.0)).unwrap().ids[0];
        let c = doc
            .apply_tool(ToolKind::AlongLine(AlongLine {
                name: "C".to_owned(),
                first: a,
                second: b,
                length: length("4"),
            }))
            .unwrap()
            .ids[0];

        doc.set_tool(
            c,
            ToolKind::AlongLine(AlongLine {
                name: "C".to_owned(),
                first: a,
                second: b,
                length: length("7"),
            }),
        )
        .unwrap();
        assert!(doc.container().point(c).unwrap().position.fuzzy_eq(Point2::new(7.0, 0.0)));

        let swapped = doc.set_tool(
            c,
            ToolKind::AlongLine(AlongLine {
                name: "C".to_owned(),
                first: b,
                second: a,
                length: length("7"),
            }),
        );
        assert!(matches!(swapped, Err(ToolError::Construction(_))));
    }
}
