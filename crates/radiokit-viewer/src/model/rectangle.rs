use serde::{Deserialize, Serialize};

use super::{AnnotationShape, Bounds, Color, Point, ShapeId};
use crate::text_metrics::TextMetrics;

/// Axis-aligned rectangle, stored by its top-left corner.
///
/// Rectangles produced by AI detection carry the detector's label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RectangleShape {
    pub id: ShapeId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: Color,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl RectangleShape {
    pub fn new(x: f64, y: f64, width: f64, height: f64, color: Color) -> Self {
        Self {
            id: ShapeId::new(),
            x,
            y,
            width,
            height,
            color,
            label: None,
        }
    }

    /// Rectangle spanning two opposite corners, in either drag direction.
    ///
    /// A zero-size drag yields a degenerate rectangle, which is kept.
    pub fn from_corners(a: Point, b: Point, color: Color) -> Self {
        Self::new(
            a.x.min(b.x),
            a.y.min(b.y),
            (a.x - b.x).abs(),
            (a.y - b.y).abs(),
            color,
        )
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

impl AnnotationShape for RectangleShape {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn color(&self) -> Color {
        self.color
    }

    fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    fn bounds(&self, _metrics: &dyn TextMetrics) -> Bounds {
        Bounds::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }
}
