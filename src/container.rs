//! ID-indexed store of drafting objects plus the variable table formulas
//! evaluate against.

use std::collections::HashMap;

use thiserror::Error;

use crate::geom::arc::Arc;
use crate::geom::curve::{Curve, GObject, GObjectKind};
use crate::geom::elliptical::EllipticalArc;
use crate::geom::path::{CubicBezier, CubicBezierPath};
use crate::geom::point::Point;
use crate::geom::spline::{Spline, SplinePath};

/// Identifier of a stored object. Ids are minted monotonically from 1;
/// 0 is never a valid id.
pub type ObjectId = u32;

/// The null id, used where a reference is structurally absent.
pub const NULL_ID: ObjectId = 0;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContainerError {
    #[error("no object with id {0}")]
    UnknownId(ObjectId),
    #[error("object {id} is a {actual}, not a {expected}")]
    TypeMismatch {
        id: ObjectId,
        expected: GObjectKind,
        actual: GObjectKind,
    },
    #[error("object {id} is a {actual}, not a curve")]
    NotACurve { id: ObjectId, actual: GObjectKind },
    #[error("unknown variable `{0}`")]
    UnknownVariable(String),
}

/// Object store of one document. Updating keeps the id stable so downstream
/// references survive recomputation.
#[derive(Debug, Clone, Default)]
pub struct Container {
    objects: HashMap<ObjectId, GObject>,
    variables: HashMap<String, f64>,
    next_id: ObjectId,
}

impl Container {
    #[must_use]
    pub fn new() -> Self {
        Self {
            objects: HashMap::new(),
            variables: HashMap::new(),
            next_id: 1,
        }
    }

    /// Store a new object under a fresh id.
    pub fn add(&mut self, object: GObject) -> ObjectId {
        let id = self.next_id;
        self.next_id += 1;
        self.objects.insert(id, object);
        id
    }

    /// Replace the object stored under an existing id.
    pub fn update(&mut self, id: ObjectId, object: GObject) -> Result<(), ContainerError> {
        match self.objects.get_mut(&id) {
            Some(slot) => {
                *slot = object;
                Ok(())
            }
            None => Err(ContainerError::UnknownId(id)),
        }
    }

    #[must_use]
    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    pub fn get(&self, id: ObjectId) -> Result<&GObject, ContainerError> {
        self.objects.get(&id).ok_or(ContainerError::UnknownId(id))
    }

    pub fn point(&self, id: ObjectId) -> Result<&Point, ContainerError> {
        match self.get(id)? {
            GObject::Point(point) => Ok(point),
            other => Err(self.mismatch(id, GObjectKind::Point, other)),
        }
    }

    pub fn arc(&self, id: ObjectId) -> Result<&Arc, ContainerError> {
        match self.get(id)? {
            GObject::Arc(arc) => Ok(arc),
            other => Err(self.mismatch(id, GObjectKind::Arc, other)),
        }
    }

    pub fn elliptical_arc(&self, id: ObjectId) -> Result<&EllipticalArc, ContainerError> {
        match self.get(id)? {
            GObject::EllipticalArc(arc) => Ok(arc),
            other => Err(self.mismatch(id, GObjectKind::EllipticalArc, other)),
        }
    }

    pub fn spline(&self, id: ObjectId) -> Result<&Spline, ContainerError> {
        match self.get(id)? {
            GObject::Spline(spline) => Ok(spline),
            other => Err(self.mismatch(id, GObjectKind::Spline, other)),
        }
    }

    pub fn spline_path(&self, id: ObjectId) -> Result<&SplinePath, ContainerError> {
        match self.get(id)? {
            GObject::SplinePath(path) => Ok(path),
            other => Err(self.mismatch(id, GObjectKind::SplinePath, other)),
        }
    }

    pub fn cubic_bezier(&self, id: ObjectId) -> Result<&CubicBezier, ContainerError> {
        match self.get(id)? {
            GObject::CubicBezier(bezier) => Ok(bezier),
            other => Err(self.mismatch(id, GObjectKind::CubicBezier, other)),
        }
    }

    pub fn cubic_bezier_path(&self, id: ObjectId) -> Result<&CubicBezierPath, ContainerError> {
        match self.get(id)? {
            GObject::CubicBezierPath(path) => Ok(path),
            other => Err(self.mismatch(id, GObjectKind::CubicBezierPath, other)),
        }
    }

    /// Any curve variant, cloned out of the store. Points are rejected with
    /// a type mismatch.
    pub fn curve(&self, id: ObjectId) -> Result<Curve, ContainerError> {
        let object = self.get(id)?.clone();
        Curve::try_from(object).map_err(|actual| ContainerError::NotACurve { id, actual })
    }

    fn mismatch(&self, id: ObjectId, expected: GObjectKind, actual: &GObject) -> ContainerError {
        ContainerError::TypeMismatch {
            id,
            expected,
            actual: actual.kind(),
        }
    }

    pub fn set_variable(&mut self, name: impl Into<String>, value: f64) {
        self.variables.insert(name.into(), value);
    }

    pub fn variable(&self, name: &str) -> Result<f64, ContainerError> {
        self.variables
            .get(name)
            .copied()
            .ok_or_else(|| ContainerError::UnknownVariable(name.to_owned()))
    }

    /// Snapshot used as the binding environment of formula evaluation.
    #[must_use]
    pub fn variables(&self) -> &HashMap<String, f64> {
        &self.variables
    }
}
