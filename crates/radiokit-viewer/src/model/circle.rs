use serde::{Deserialize, Serialize};

use super::{AnnotationShape, Bounds, Color, Point, ShapeId};
use crate::text_metrics::TextMetrics;

/// Circle defined by its center and radius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircleShape {
    pub id: ShapeId,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub color: Color,
}

impl CircleShape {
    pub fn new(center: Point, radius: f64, color: Color) -> Self {
        Self {
            id: ShapeId::new(),
            x: center.x,
            y: center.y,
            radius: radius.abs(),
            color,
        }
    }

    /// Circle centered on the drag start, through the drag end.
    pub fn from_drag(center: Point, edge: Point, color: Color) -> Self {
        Self::new(center, center.distance_to(&edge), color)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

impl AnnotationShape for CircleShape {
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
        Bounds::new(
            self.x - self.radius,
            self.y - self.radius,
            self.x + self.radius,
            self.y + self.radius,
        )
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }
}
