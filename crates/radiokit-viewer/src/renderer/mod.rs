//! Canvas renderer using tiny-skia.
//!
//! Every frame starts from a full clear and draws, in order:
//! 1. the brightness/contrast adjusted base image under the view transform
//! 2. shapes in insertion order, skipping measurement marks
//! 3. the preview of the shape being drawn or the text being edited
//! 4. measurement marks with labels, then the live ruler

mod filter;
mod ruler;
mod text;

pub use filter::{apply_filters, filter_lut, to_pixmap, to_rgba_image};
pub use ruler::{ruler_label, ruler_ticks, Tick};
pub use text::{draw_label, text_path, LABEL_PX};

use tiny_skia::{
    FillRule, FilterQuality, Paint, Path, PathBuilder, Pixmap, PixmapPaint, Stroke, StrokeDash,
    Transform,
};

use crate::calibration::CalibrationModel;
use crate::canvas::BaseImage;
use crate::model::{
    AnnotationShape, CircleShape, Color, FreehandShape, MeasurementMark, PathSegment, Point,
    RectangleShape, Shape, ShapeId, TextShape,
};
use crate::shape_store::ShapeStore;
use crate::style::CanvasStyle;
use crate::text_metrics::TextMetrics;
use crate::tools::{DraftShape, InteractionState, TextEdit, TextTarget};
use crate::viewport::{ViewState, ViewTransform};

const BACKGROUND: Color = Color::rgb(0, 0, 0);
const LABEL_BACKGROUND: Color = Color::rgba(0, 0, 0, 200);
const LABEL_FOREGROUND: Color = Color::rgb(255, 255, 255);
const HANDLE_FILL: Color = Color::rgb(255, 255, 255);
const HANDLE_HIGHLIGHT: Color = Color::rgb(10, 132, 255);

/// Everything one frame is drawn from.
pub struct Scene<'a> {
    pub image: Option<&'a BaseImage>,
    pub view: &'a ViewState,
    pub transform: ViewTransform,
    pub width: u32,
    pub height: u32,
    pub shapes: &'a ShapeStore,
    pub interaction: &'a InteractionState,
    pub calibration: &'a CalibrationModel,
    /// Pointer position in image space
    pub pointer: Option<Point>,
    pub style: &'a CanvasStyle,
    pub metrics: &'a dyn TextMetrics,
}

struct FilteredImage {
    generation: u64,
    brightness: f64,
    contrast: f64,
    pixmap: Pixmap,
}

/// Draws frames, caching the filtered base image between them.
#[derive(Default)]
pub struct Renderer {
    filtered: Option<FilteredImage>,
}

pub(crate) fn paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = true;
    paint
}

fn skia_transform(transform: &ViewTransform) -> Transform {
    let [sx, ky, kx, sy, tx, ty] = transform.canvas_affine();
    Transform::from_row(
        sx as f32, ky as f32, kx as f32, sy as f32, tx as f32, ty as f32,
    )
}

/// Per-frame drawing state shared by the passes.
struct Frame<'s, 'a> {
    scene: &'s Scene<'a>,
    transform: Transform,
    /// Image pixels per canvas pixel, for view-independent line widths
    unit: f64,
}

impl Frame<'_, '_> {
    fn stroke(
        &self,
        pixmap: &mut Pixmap,
        path: Option<Path>,
        color: Color,
        width: f64,
        dashed: bool,
    ) {
        let Some(path) = path else {
            return;
        };
        let mut stroke = Stroke {
            width: width as f32,
            line_cap: tiny_skia::LineCap::Round,
            line_join: tiny_skia::LineJoin::Round,
            ..Default::default()
        };
        if dashed {
            let dash = (6.0 * self.unit) as f32;
            let gap = (4.0 * self.unit) as f32;
            stroke.dash = StrokeDash::new(vec![dash, gap], 0.0);
        }
        pixmap.stroke_path(&path, &paint(color), &stroke, self.transform, None);
    }

    fn fill(&self, pixmap: &mut Pixmap, path: Option<Path>, color: Color) {
        if let Some(path) = path {
            pixmap.fill_path(&path, &paint(color), FillRule::Winding, self.transform, None);
        }
    }

    fn label(&self, pixmap: &mut Pixmap, text: &str, at: Point) {
        let anchor = self.scene.transform.image_to_canvas(at);
        draw_label(
            pixmap,
            text,
            anchor,
            self.scene.metrics.font(),
            LABEL_FOREGROUND,
            LABEL_BACKGROUND,
        );
    }
}

fn rect_path(min: Point, max: Point) -> Option<Path> {
    let mut pb = PathBuilder::new();
    pb.move_to(min.x as f32, min.y as f32);
    pb.line_to(max.x as f32, min.y as f32);
    pb.line_to(max.x as f32, max.y as f32);
    pb.line_to(min.x as f32, max.y as f32);
    pb.close();
    pb.finish()
}

fn line_path(from: Point, to: Point) -> Option<Path> {
    let mut pb = PathBuilder::new();
    pb.move_to(from.x as f32, from.y as f32);
    pb.line_to(to.x as f32, to.y as f32);
    pb.finish()
}

fn freehand_path(shape: &FreehandShape) -> Option<Path> {
    let mut pb = PathBuilder::new();
    for segment in shape.smoothed_segments() {
        match segment {
            PathSegment::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
            PathSegment::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
            PathSegment::QuadTo { control, to } => {
                pb.quad_to(control.x as f32, control.y as f32, to.x as f32, to.y as f32)
            }
        }
    }
    pb.finish()
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draws a frame into a new pixmap of the scene's size.
    pub fn render(&mut self, scene: &Scene<'_>) -> Option<Pixmap> {
        let Some(mut pixmap) = Pixmap::new(scene.width, scene.height) else {
            tracing::warn!("Cannot allocate {}x{} frame", scene.width, scene.height);
            return None;
        };
        self.render_into(scene, &mut pixmap);
        Some(pixmap)
    }

    /// Draws a frame into `pixmap`, clearing it first.
    pub fn render_into(&mut self, scene: &Scene<'_>, pixmap: &mut Pixmap) {
        pixmap.fill(tiny_skia::Color::from_rgba8(
            BACKGROUND.r,
            BACKGROUND.g,
            BACKGROUND.b,
            BACKGROUND.a,
        ));

        let frame = Frame {
            scene,
            transform: skia_transform(&scene.transform),
            unit: scene.transform.image_units_per_canvas_px(),
        };

        if let Some(image) = scene.image {
            if let Some(filtered) = self.filtered(image, scene.view) {
                let paint = PixmapPaint {
                    quality: FilterQuality::Bilinear,
                    ..Default::default()
                };
                pixmap.draw_pixmap(0, 0, filtered.as_ref(), &paint, frame.transform, None);
            }
        }

        let editing = match scene.interaction {
            InteractionState::EditingText(edit) => Some(edit),
            _ => None,
        };
        let hidden = editing.and_then(|edit| match edit.target {
            TextTarget::Existing(id) => Some(id),
            TextTarget::New => None,
        });

        draw_shapes(&frame, pixmap, hidden);
        draw_preview(&frame, pixmap, editing);
        draw_measurements(&frame, pixmap);
        draw_ruler(&frame, pixmap);
    }

    fn filtered(&mut self, image: &BaseImage, view: &ViewState) -> Option<&Pixmap> {
        let stale = match &self.filtered {
            Some(cached) => {
                cached.generation != image.generation()
                    || cached.brightness != view.brightness_percent
                    || cached.contrast != view.contrast_percent
            }
            None => true,
        };

        if stale {
            let adjusted =
                apply_filters(image.pixels(), view.brightness_percent, view.contrast_percent);
            let Some(pixmap) = to_pixmap(&adjusted) else {
                tracing::warn!("Base image has no pixels");
                self.filtered = None;
                return None;
            };
            tracing::debug!(
                "Filtered base image {} at brightness {}%, contrast {}%",
                image.generation(),
                view.brightness_percent,
                view.contrast_percent
            );
            self.filtered = Some(FilteredImage {
                generation: image.generation(),
                brightness: view.brightness_percent,
                contrast: view.contrast_percent,
                pixmap,
            });
        }
        self.filtered.as_ref().map(|cached| &cached.pixmap)
    }
}

fn draw_shapes(frame: &Frame<'_, '_>, pixmap: &mut Pixmap, hidden: Option<ShapeId>) {
    for shape in frame.scene.shapes.iter() {
        if Some(shape.id()) == hidden {
            continue;
        }
        match shape {
            Shape::Rectangle(rect) => draw_rectangle(frame, pixmap, rect, false),
            Shape::Circle(circle) => draw_circle(frame, pixmap, circle, false),
            Shape::Freehand(path) => draw_freehand(frame, pixmap, path),
            Shape::Text(text) => draw_text(frame, pixmap, text),
            Shape::Measurement(_) => {}
        }
    }
}

fn draw_rectangle(frame: &Frame<'_, '_>, pixmap: &mut Pixmap, rect: &RectangleShape, dashed: bool) {
    let min = Point::new(rect.x, rect.y);
    let max = Point::new(rect.x + rect.width, rect.y + rect.height);
    let width = frame.scene.style.stroke_width;
    frame.stroke(pixmap, rect_path(min, max), rect.color, width, dashed);
    if let Some(label) = &rect.label {
        frame.label(pixmap, label, min);
    }
}

fn draw_circle(frame: &Frame<'_, '_>, pixmap: &mut Pixmap, circle: &CircleShape, dashed: bool) {
    let path = PathBuilder::from_circle(circle.x as f32, circle.y as f32, circle.radius as f32);
    frame.stroke(pixmap, path, circle.color, frame.scene.style.stroke_width, dashed);
}

fn draw_freehand(frame: &Frame<'_, '_>, pixmap: &mut Pixmap, shape: &FreehandShape) {
    if shape.points.len() == 1 {
        let p = shape.points[0];
        let dot = PathBuilder::from_circle(p.x as f32, p.y as f32, (shape.pen_width / 2.0) as f32);
        frame.fill(pixmap, dot, shape.color);
        return;
    }
    frame.stroke(pixmap, freehand_path(shape), shape.color, shape.pen_width, false);
}

fn draw_text(frame: &Frame<'_, '_>, pixmap: &mut Pixmap, text: &TextShape) {
    let metrics = frame.scene.metrics;
    if let Some(font) = metrics.font() {
        let glyphs = text_path(font, &text.text, metrics.font_px(text.scale), text.origin());
        frame.fill(pixmap, glyphs, text.color);
    }

    let bounds = text.bounds(metrics);
    let box_path = rect_path(
        Point::new(bounds.min_x, bounds.min_y),
        Point::new(bounds.max_x, bounds.max_y),
    );
    frame.stroke(pixmap, box_path, text.color, frame.unit, true);

    let handle =
        frame.scene.style.handle_size_px * frame.scene.transform.image_units_per_screen_px();
    let tolerance = handle * 2.0;
    let highlighted = frame
        .scene
        .pointer
        .filter(|p| bounds.contains(*p, tolerance))
        .map(|p| text.nearest_handle(p, metrics));

    for (corner, at) in text.handles(metrics) {
        let half = handle / 2.0;
        let square = rect_path(
            Point::new(at.x - half, at.y - half),
            Point::new(at.x + half, at.y + half),
        );
        let fill = if highlighted == Some(corner) {
            HANDLE_HIGHLIGHT
        } else {
            HANDLE_FILL
        };
        frame.fill(pixmap, square.clone(), fill);
        frame.stroke(pixmap, square, text.color, frame.unit, false);
    }
}

fn draw_preview(frame: &Frame<'_, '_>, pixmap: &mut Pixmap, editing: Option<&TextEdit>) {
    let color = frame.scene.style.default_color;
    match frame.scene.interaction {
        InteractionState::Drawing(DraftShape::Rectangle { start, current }) => {
            let preview = RectangleShape::from_corners(*start, *current, color);
            draw_rectangle(frame, pixmap, &preview, true);
        }
        InteractionState::Drawing(DraftShape::Circle { center, current }) => {
            let preview = CircleShape::from_drag(*center, *current, color);
            draw_circle(frame, pixmap, &preview, true);
        }
        InteractionState::Drawing(DraftShape::Freehand(path)) => draw_freehand(frame, pixmap, path),
        _ => {}
    }

    let Some(edit) = editing else {
        return;
    };
    let mut preview = TextShape::new(
        edit.draft.clone(),
        edit.at,
        color,
        frame.scene.style.default_text_scale,
    );
    if let TextTarget::Existing(id) = edit.target {
        if let Some(existing) = frame.scene.shapes.text(id) {
            preview.color = existing.color;
            preview.scale = existing.scale;
        }
    }
    draw_text(frame, pixmap, &preview);
}

fn draw_measurements(frame: &Frame<'_, '_>, pixmap: &mut Pixmap) {
    for shape in frame.scene.shapes.iter() {
        if let Shape::Measurement(mark) = shape {
            draw_mark(frame, pixmap, mark);
        }
    }
}

fn draw_mark(frame: &Frame<'_, '_>, pixmap: &mut Pixmap, mark: &MeasurementMark) {
    let width = 1.5 * frame.unit;
    frame.stroke(pixmap, line_path(mark.start, mark.end), mark.color, width, false);
    for end in [mark.start, mark.end] {
        let dot = PathBuilder::from_circle(end.x as f32, end.y as f32, (3.0 * frame.unit) as f32);
        frame.fill(pixmap, dot, mark.color);
    }
    frame.label(pixmap, &mark.label(), mark.start.midpoint(&mark.end));
}

fn draw_ruler(frame: &Frame<'_, '_>, pixmap: &mut Pixmap) {
    let InteractionState::Measuring {
        kind,
        start,
        current,
    } = frame.scene.interaction
    else {
        return;
    };
    let style = &frame.scene.style.ruler;
    let width = 1.5 * frame.unit;

    frame.stroke(pixmap, line_path(*start, *current), style.color, width, false);
    for tick in ruler_ticks(*start, *current, style) {
        frame.stroke(pixmap, line_path(tick.from, tick.to), style.color, width, false);
    }

    let label = ruler_label(
        *kind,
        start.distance_to(current),
        frame.scene.calibration,
        frame.scene.style,
    );
    frame.label(pixmap, &label, *current);
}
