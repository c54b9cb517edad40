//! Ordered collection of committed annotations.
//!
//! Insertion order is draw order: later shapes are drawn on top and win
//! hit tests.

use radiokit_core::ShapeError;
use std::fmt;

use crate::model::{AnnotationShape, Color, Point, Shape, ShapeId, TextShape};
use crate::text_metrics::TextMetrics;

/// A targeted change to one stored shape.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapePatch {
    Translate { dx: f64, dy: f64 },
    Recolor(Color),
    SetText(String),
    /// New text scale and anchor x, as produced by a handle drag
    ScaleText { scale: f64, x: f64 },
    /// Whole-shape replacement; the id must match
    Replace(Shape),
}

impl fmt::Display for ShapePatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShapePatch::Translate { .. } => "translate",
            ShapePatch::Recolor(_) => "recolor",
            ShapePatch::SetText(_) => "set_text",
            ShapePatch::ScaleText { .. } => "scale_text",
            ShapePatch::Replace(_) => "replace",
        };
        f.write_str(name)
    }
}

impl ShapePatch {
    fn apply(self, shape: &mut Shape) -> Result<(), ShapeError> {
        let mismatch = |patch: &ShapePatch, shape: &Shape| ShapeError::PatchMismatch {
            patch: patch.to_string(),
            kind: shape.shape_type().to_string(),
        };

        match self {
            ShapePatch::Translate { dx, dy } => shape.translate(dx, dy),
            ShapePatch::Recolor(color) => shape.set_color(color),
            ShapePatch::SetText(text) => match shape {
                Shape::Text(t) => t.text = text,
                _ => return Err(mismatch(&ShapePatch::SetText(text), shape)),
            },
            ShapePatch::ScaleText { scale, x } => match shape {
                Shape::Text(t) => {
                    t.scale = scale;
                    t.x = x;
                }
                _ => return Err(mismatch(&ShapePatch::ScaleText { scale, x }, shape)),
            },
            ShapePatch::Replace(replacement) => {
                if replacement.id() != shape.id() {
                    return Err(ShapeError::PatchMismatch {
                        patch: "replace".to_string(),
                        kind: format!("shape {} with {}", shape.id(), replacement.id()),
                    });
                }
                *shape = replacement;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ShapeStore {
    shapes: Vec<Shape>,
}

impl ShapeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a shape on top of the others.
    pub fn add(&mut self, shape: Shape) -> Result<ShapeId, ShapeError> {
        let id = shape.id();
        if self.get(id).is_some() {
            return Err(ShapeError::DuplicateId { id: id.to_string() });
        }
        tracing::debug!("Added {} {}", shape.shape_type(), id);
        self.shapes.push(shape);
        Ok(id)
    }

    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.id() == id)
    }

    pub fn text(&self, id: ShapeId) -> Option<&TextShape> {
        self.get(id).and_then(Shape::as_text)
    }

    pub fn update(&mut self, id: ShapeId, patch: ShapePatch) -> Result<&Shape, ShapeError> {
        let shape = self
            .shapes
            .iter_mut()
            .find(|s| s.id() == id)
            .ok_or_else(|| ShapeError::NotFound { id: id.to_string() })?;
        patch.apply(shape)?;
        Ok(shape)
    }

    pub fn remove(&mut self, id: ShapeId) -> Option<Shape> {
        let index = self.shapes.iter().position(|s| s.id() == id)?;
        Some(self.shapes.remove(index))
    }

    pub fn list(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn iter(&self) -> impl Iterator<Item = &Shape> {
        self.shapes.iter()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Replaces the whole collection, dropping duplicate ids.
    pub fn replace_all(&mut self, shapes: Vec<Shape>) {
        self.shapes.clear();
        for shape in shapes {
            if let Err(err) = self.add(shape) {
                tracing::warn!("Skipping loaded shape: {}", err);
            }
        }
    }

    pub fn clear(&mut self) {
        self.shapes.clear();
    }

    /// Topmost text whose box contains `p`.
    pub fn text_at(&self, p: Point, tolerance: f64, metrics: &dyn TextMetrics) -> Option<ShapeId> {
        self.shapes
            .iter()
            .rev()
            .filter_map(Shape::as_text)
            .find(|text| text.bounds(metrics).contains(p, tolerance))
            .map(|text| text.id)
    }

    /// Topmost text with a resize handle within `tolerance` of `p`.
    pub fn text_handle_at(
        &self,
        p: Point,
        tolerance: f64,
        metrics: &dyn TextMetrics,
    ) -> Option<(ShapeId, crate::model::Corner)> {
        self.shapes
            .iter()
            .rev()
            .filter_map(Shape::as_text)
            .find_map(|text| text.handle_at(p, tolerance, metrics).map(|corner| (text.id, corner)))
    }
}
