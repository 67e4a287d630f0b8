#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Parametric construction engine for garment pattern drafting.
//!
//! A pattern is an ordered history of construction tools. Each tool reads
//! previously created objects and formula inputs and produces points and
//! curves; the dependency graph between objects makes edits propagate:
//! move a base point or change a formula and every dependent object is
//! recomputed in order, keeping its id.
//!
//! Geometry lives in pixel space at 96 dpi with mathematical angles
//! (degrees, counterclockwise, y up). Formulas and the recipe speak the
//! document unit; conversion happens at the tool boundary.

pub mod container;
pub mod document;
pub mod formula;
pub mod geom;
pub mod graph;
pub mod recipe;
pub mod tools;
pub mod units;

pub use container::{Container, ContainerError, NULL_ID, ObjectId};
pub use document::{Document, HistoryEntry, NodeFailure, RecomputeReport};
pub use formula::{EvalOptions, Formula, FormulaError};
pub use recipe::{Recipe, RecipeError};
pub use tools::{Policy, Target, ToolContext, ToolError, ToolKind, ToolOutcome};
pub use units::Unit;
