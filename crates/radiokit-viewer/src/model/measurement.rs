use radiokit_core::{format_length, format_pixels, LengthUnit};
use serde::{Deserialize, Serialize};

use super::{AnnotationShape, Bounds, Color, Point, ShapeId};
use crate::text_metrics::TextMetrics;

/// A committed two-point measurement.
///
/// `real_length` is present only when the image was calibrated at the time
/// of measuring; otherwise the mark reports pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementMark {
    pub id: ShapeId,
    pub start: Point,
    pub end: Point,
    pub pixel_length: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub real_length: Option<f64>,
    #[serde(default)]
    pub unit: LengthUnit,
    pub color: Color,
}

impl MeasurementMark {
    pub fn new(start: Point, end: Point, real_length: Option<f64>, color: Color) -> Self {
        Self {
            id: ShapeId::new(),
            start,
            end,
            pixel_length: start.distance_to(&end),
            real_length,
            unit: LengthUnit::default(),
            color,
        }
    }

    /// Display label, e.g. `30.0 mm` or `200 px`.
    pub fn label(&self) -> String {
        match self.real_length {
            Some(real) => format_length(real, self.unit),
            None => format_pixels(self.pixel_length),
        }
    }

    pub fn is_calibrated(&self) -> bool {
        self.real_length.is_some()
    }
}

impl AnnotationShape for MeasurementMark {
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
        Bounds::new(self.start.x, self.start.y, self.end.x, self.end.y)
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.start = Point::new(self.start.x + dx, self.start.y + dy);
        self.end = Point::new(self.end.x + dx, self.end.y + dy);
    }
}
