use serde::{Deserialize, Serialize};

use super::{AnnotationShape, Bounds, Color, Point, ShapeId};
use crate::text_metrics::TextMetrics;

/// Pointer path recorded while the pen is down.
///
/// Raw samples are stored; smoothing happens only when the path is drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreehandShape {
    pub id: ShapeId,
    pub points: Vec<Point>,
    pub color: Color,
    pub pen_width: f64,
}

/// One drawing command of a smoothed freehand path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    MoveTo(Point),
    LineTo(Point),
    QuadTo { control: Point, to: Point },
}

impl FreehandShape {
    pub fn new(start: Point, color: Color, pen_width: f64) -> Self {
        Self {
            id: ShapeId::new(),
            points: vec![start],
            color,
            pen_width,
        }
    }

    pub fn push(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Quadratic midpoint smoothing of the recorded samples.
    ///
    /// Each interior sample becomes the control point of a curve ending
    /// halfway to the next sample; the path still ends on the last sample.
    pub fn smoothed_segments(&self) -> Vec<PathSegment> {
        let Some((first, rest)) = self.points.split_first() else {
            return Vec::new();
        };

        let mut segments = Vec::with_capacity(self.points.len() + 1);
        segments.push(PathSegment::MoveTo(*first));

        match rest.len() {
            0 => {}
            1 => segments.push(PathSegment::LineTo(rest[0])),
            _ => {
                for pair in rest.windows(2) {
                    segments.push(PathSegment::QuadTo {
                        control: pair[0],
                        to: pair[0].midpoint(&pair[1]),
                    });
                }
                if let Some(last) = rest.last() {
                    segments.push(PathSegment::LineTo(*last));
                }
            }
        }
        segments
    }
}

impl AnnotationShape for FreehandShape {
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
        let half = self.pen_width / 2.0;
        let mut min = Point::new(f64::INFINITY, f64::INFINITY);
        let mut max = Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in &self.points {
            min = Point::new(min.x.min(p.x), min.y.min(p.y));
            max = Point::new(max.x.max(p.x), max.y.max(p.y));
        }
        if !min.is_finite() {
            return Bounds::new(0.0, 0.0, 0.0, 0.0);
        }
        Bounds::new(min.x - half, min.y - half, max.x + half, max.y + half)
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        for p in &mut self.points {
            p.x += dx;
            p.y += dy;
        }
    }
}
