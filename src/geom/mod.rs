//! Geometric primitives of the drafting engine.

pub mod arc;
pub mod bezier;
pub mod core;
pub mod curve;
pub mod elliptical;
pub mod intersect;
pub mod path;
pub mod point;
pub mod spline;

use serde::{Deserialize, Serialize};

/// Stroke style of a drafted curve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PenStyle {
    #[default]
    Solid,
    Dash,
    Dot,
    DashDot,
    DashDotDot,
}

/// Presentation and naming state every curve carries through transforms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveInfo {
    pub name: String,
    pub color: String,
    pub pen_style: PenStyle,
    /// Per-curve approximation scale; 0 defers to the document default.
    pub approximation_scale: f64,
    /// Counter distinguishing same-named duplicates.
    pub duplicate: u32,
}

impl CurveInfo {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: "black".to_owned(),
            pen_style: PenStyle::default(),
            approximation_scale: 0.0,
            duplicate: 0,
        }
    }

    /// Info for a curve derived by a transform: the name gains `suffix`,
    /// styling is carried over.
    #[must_use]
    pub fn derived(&self, suffix: &str) -> Self {
        let mut info = self.clone();
        info.name = format!("{}{suffix}", self.name);
        info
    }
}
