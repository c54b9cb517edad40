use serde::{Deserialize, Serialize};

use super::{AnnotationShape, Bounds, Color, Point, ShapeId};
use crate::text_metrics::TextMetrics;

/// Text label anchored at the left end of its baseline.
///
/// The font size is `base_font_px * scale`; the box around the text is
/// derived from font metrics and never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextShape {
    pub id: ShapeId,
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub color: Color,
    pub scale: f64,
}

/// Corner of a text bounding box, where the resize handles sit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    /// Left handles grow the text leftwards, keeping the right edge fixed.
    pub fn is_left(&self) -> bool {
        matches!(self, Corner::TopLeft | Corner::BottomLeft)
    }

    fn of(&self, bounds: &Bounds) -> Point {
        match self {
            Corner::TopLeft => Point::new(bounds.min_x, bounds.min_y),
            Corner::TopRight => Point::new(bounds.max_x, bounds.min_y),
            Corner::BottomLeft => Point::new(bounds.min_x, bounds.max_y),
            Corner::BottomRight => Point::new(bounds.max_x, bounds.max_y),
        }
    }
}

impl TextShape {
    pub fn new(text: impl Into<String>, at: Point, color: Color, scale: f64) -> Self {
        Self {
            id: ShapeId::new(),
            text: text.into(),
            x: at.x,
            y: at.y,
            color,
            scale,
        }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn handles(&self, metrics: &dyn TextMetrics) -> [(Corner, Point); 4] {
        let bounds = self.bounds(metrics);
        Corner::ALL.map(|corner| (corner, corner.of(&bounds)))
    }

    /// The handle closest to `p`, if it is within `tolerance`.
    pub fn handle_at(&self, p: Point, tolerance: f64, metrics: &dyn TextMetrics) -> Option<Corner> {
        self.handles(metrics)
            .into_iter()
            .map(|(corner, at)| (corner, at.distance_to(&p)))
            .filter(|(_, distance)| *distance <= tolerance)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(corner, _)| corner)
    }

    /// The handle closest to `p`, regardless of distance.
    pub fn nearest_handle(&self, p: Point, metrics: &dyn TextMetrics) -> Corner {
        self.handles(metrics)
            .into_iter()
            .min_by(|a, b| a.1.distance_to(&p).total_cmp(&b.1.distance_to(&p)))
            .map(|(corner, _)| corner)
            .unwrap_or(Corner::BottomRight)
    }

    /// Scale and anchor after dragging `corner` horizontally by `dx`
    /// from the state captured in `original`.
    ///
    /// Only the horizontal drag contributes. The new scale is the new box
    /// width over the width at scale 1.0, floored at `min_scale`. The
    /// baseline never moves; a left-handle drag keeps the right edge where
    /// it was.
    pub fn resized(
        original: &TextShape,
        corner: Corner,
        dx: f64,
        min_scale: f64,
        metrics: &dyn TextMetrics,
    ) -> (f64, f64) {
        let unscaled = metrics.measure(&original.text, 1.0).width;
        if unscaled <= 0.0 {
            return (original.scale, original.x);
        }

        let width = metrics.measure(&original.text, original.scale).width;
        let target = if corner.is_left() { width - dx } else { width + dx };
        let scale = (target / unscaled).max(min_scale);

        let x = if corner.is_left() {
            let right = original.x + width;
            right - metrics.measure(&original.text, scale).width
        } else {
            original.x
        };
        (scale, x)
    }
}

impl AnnotationShape for TextShape {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn color(&self) -> Color {
        self.color
    }

    fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    fn bounds(&self, metrics: &dyn TextMetrics) -> Bounds {
        let extent = metrics.measure(&self.text, self.scale);
        Bounds::new(
            self.x,
            self.y - extent.ascent,
            self.x + extent.width,
            self.y + extent.descent,
        )
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }
}
