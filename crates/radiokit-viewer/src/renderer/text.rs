//! Glyph outlines and on-screen labels.

use rusttype::{point as rt_point, Font, OutlineBuilder, Scale};
use tiny_skia::{FillRule, Path, PathBuilder, Pixmap, Rect, Transform};

use super::paint;
use crate::model::{Color, Point};
use crate::text_metrics::{FixedAdvanceMetrics, FontMetrics, TextMetrics};

/// Pixel size of measurement and detection labels.
pub const LABEL_PX: f64 = 13.0;
const LABEL_PADDING: f64 = 3.0;

struct SkiaOutline {
    builder: PathBuilder,
}

impl OutlineBuilder for SkiaOutline {
    fn move_to(&mut self, x: f32, y: f32) {
        self.builder.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.builder.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.builder.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.builder.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.builder.close();
    }
}

/// Outline of `text` laid out with its baseline starting at `baseline`.
pub fn text_path(font: &Font<'_>, text: &str, px: f64, baseline: Point) -> Option<Path> {
    let mut sink = SkiaOutline {
        builder: PathBuilder::new(),
    };
    let start = rt_point(baseline.x as f32, baseline.y as f32);
    for glyph in font.layout(text, Scale::uniform(px as f32), start) {
        glyph.build_outline(&mut sink);
    }
    sink.builder.finish()
}

/// Draws `text` on a backing plate, centered horizontally on `anchor` and
/// sitting just above it. Works in canvas pixels, unaffected by the view.
pub fn draw_label(
    pixmap: &mut Pixmap,
    text: &str,
    anchor: Point,
    font: Option<&'static Font<'static>>,
    foreground: Color,
    background: Color,
) {
    let extent = match font {
        Some(font) => FontMetrics::new(font, LABEL_PX).measure(text, 1.0),
        None => FixedAdvanceMetrics::new(LABEL_PX).measure(text, 1.0),
    };

    let left = anchor.x - extent.width / 2.0;
    let baseline = anchor.y - LABEL_PADDING - extent.descent;
    let plate = Rect::from_xywh(
        (left - LABEL_PADDING) as f32,
        (baseline - extent.ascent - LABEL_PADDING) as f32,
        (extent.width + 2.0 * LABEL_PADDING) as f32,
        (extent.height() + 2.0 * LABEL_PADDING) as f32,
    );
    if let Some(plate) = plate {
        pixmap.fill_rect(plate, &paint(background), Transform::identity(), None);
    }

    let Some(font) = font else {
        return;
    };
    if let Some(path) = text_path(font, text, LABEL_PX, Point::new(left, baseline)) {
        pixmap.fill_path(&path, &paint(foreground), FillRule::Winding, Transform::identity(), None);
    }
}
