//! Canvas: the viewer engine for one open image.
//!
//! Owns the view state, the annotations, the calibration and the active
//! tool, routes pointer input through the view transform, and queues
//! [`Commit`]s for persistence.

mod operations;
mod types;

pub use types::{BaseImage, Commit};

use image::RgbaImage;
use radiokit_core::TransformError;
use radiokit_settings::{Config, ViewerSettings};
use std::time::{Duration, Instant};

use crate::animation::{Animator, FrameScheduler};
use crate::calibration::{Calibration, CalibrationModel};
use crate::model::{Point, Shape};
use crate::renderer::{Renderer, Scene};
use crate::shape_store::ShapeStore;
use crate::style::CanvasStyle;
use crate::text_metrics::{self, TextMetrics};
use crate::tools::{
    InteractionState, PointerEvent, TextEdit, ToolContext, ToolController, ToolKind,
};
use crate::viewport::{CanvasGeometry, ViewState, ViewTransform};

/// Canvas state for the open image.
pub struct Canvas {
    image: Option<BaseImage>,
    geometry: CanvasGeometry,
    view: ViewState,
    shapes: ShapeStore,
    calibration: CalibrationModel,
    tools: ToolController,
    animator: Animator,
    frames: FrameScheduler,
    style: CanvasStyle,
    settings: ViewerSettings,
    metrics: Box<dyn TextMetrics>,
    pointer: Option<Point>,
    commits: Vec<Commit>,
    generation: u64,
}

impl Canvas {
    /// Creates an empty canvas measuring text with the system font.
    pub fn new(config: &Config) -> Self {
        Self::with_metrics(
            config,
            text_metrics::default_metrics(config.annotation.text_base_font_px),
        )
    }

    pub fn with_metrics(config: &Config, metrics: Box<dyn TextMetrics>) -> Self {
        Self {
            image: None,
            geometry: CanvasGeometry::new(1.0, 1.0),
            view: ViewState::default(),
            shapes: ShapeStore::new(),
            calibration: CalibrationModel::new(),
            tools: ToolController::new(),
            animator: Animator::new(),
            frames: FrameScheduler::new(Duration::from_millis(config.viewer.frame_interval_ms)),
            style: CanvasStyle::from_config(config),
            settings: config.viewer.clone(),
            metrics,
            pointer: None,
            commits: Vec::new(),
            generation: 0,
        }
    }

    /// Opens an image with its stored annotations and calibration.
    ///
    /// Everything belonging to the previous image is dropped, including
    /// any commits that were never taken.
    pub fn load_image(
        &mut self,
        pixels: RgbaImage,
        shapes: Vec<Shape>,
        calibration: Option<Calibration>,
    ) {
        if !self.commits.is_empty() {
            tracing::warn!("Dropping {} untaken commits on image change", self.commits.len());
            self.commits.clear();
        }
        self.cancel_interaction();
        self.animator = Animator::new();

        let origin = self.geometry.origin;
        self.geometry = CanvasGeometry::new(pixels.width() as f64, pixels.height() as f64)
            .with_display(pixels.width() as f64, pixels.height() as f64, origin);
        self.generation += 1;
        tracing::info!(
            "Opened {}x{} image with {} annotations",
            pixels.width(),
            pixels.height(),
            shapes.len()
        );
        self.image = Some(BaseImage::new(pixels, self.generation));

        self.view = ViewState::default();
        self.shapes.replace_all(shapes);
        self.calibration.clear();
        self.calibration.set_calibration(calibration);
        self.pointer = None;
        self.frames.request_redraw();
    }

    /// Swaps the base image pixels, keeping annotations and calibration.
    ///
    /// Brightness and contrast go back to neutral since the new pixels
    /// already carry their own adjustment.
    pub fn replace_base_image(&mut self, pixels: RgbaImage) {
        if let Some(current) = &self.image {
            if current.width() != pixels.width() || current.height() != pixels.height() {
                tracing::warn!(
                    "Replacement image is {}x{}, was {}x{}",
                    pixels.width(),
                    pixels.height(),
                    current.width(),
                    current.height()
                );
                let display = (self.geometry.display_width, self.geometry.display_height);
                self.geometry = CanvasGeometry::new(pixels.width() as f64, pixels.height() as f64)
                    .with_display(display.0, display.1, self.geometry.origin);
            }
        }
        self.generation += 1;
        self.image = Some(BaseImage::new(pixels, self.generation));
        self.view.reset_filters();
        self.frames.request_redraw();
    }

    /// Places the surface on screen.
    pub fn set_display(&mut self, width: f64, height: f64, origin: Point) {
        self.geometry = self.geometry.with_display(width, height, origin);
        self.frames.request_redraw();
    }

    pub fn base_image(&self) -> Option<&BaseImage> {
        self.image.as_ref()
    }

    pub fn geometry(&self) -> &CanvasGeometry {
        &self.geometry
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn shapes(&self) -> &ShapeStore {
        &self.shapes
    }

    pub fn calibration(&self) -> &CalibrationModel {
        &self.calibration
    }

    pub fn style(&self) -> &CanvasStyle {
        &self.style
    }

    pub fn metrics(&self) -> &dyn TextMetrics {
        self.metrics.as_ref()
    }

    pub fn active_tool(&self) -> ToolKind {
        self.tools.active_tool()
    }

    pub fn interaction(&self) -> &InteractionState {
        self.tools.state()
    }

    pub fn text_edit(&self) -> Option<&TextEdit> {
        self.tools.text_edit()
    }

    /// Last pointer position in image space.
    pub fn pointer(&self) -> Option<Point> {
        self.pointer
    }

    /// The validated view transform for the current view and surface.
    pub fn try_transform(&self) -> Result<ViewTransform, TransformError> {
        let transform = ViewTransform::new(&self.view, &self.geometry)?;
        let (w, h) = (self.geometry.canvas_width, self.geometry.canvas_height);
        for sample in [
            Point::new(0.0, 0.0),
            Point::new(w, h),
            self.geometry.center(),
        ] {
            transform.check_round_trip(sample)?;
        }
        Ok(transform)
    }

    /// The view transform, or the identity when it fails validation.
    pub fn transform(&self) -> ViewTransform {
        self.try_transform().unwrap_or_else(|err| {
            tracing::error!("{}; drawing with identity transform", err);
            ViewTransform::identity()
        })
    }

    pub fn select_tool(&mut self, kind: ToolKind) {
        self.with_tools(|tools, ctx| tools.select_tool(kind, ctx));
        self.frames.request_redraw();
    }

    /// Abandons the gesture in progress.
    pub fn cancel_interaction(&mut self) {
        self.with_tools(|tools, ctx| tools.cancel(ctx));
        self.frames.request_redraw();
    }

    /// Any pointer press stops a running view animation where it is.
    pub fn pointer_down(&mut self, event: PointerEvent, now: Instant) {
        if let Some(frozen) = self.animator.cancel(now) {
            tracing::debug!("View animation interrupted by pointer");
            self.apply_animated_view(frozen);
        }
        self.track_pointer(&event);
        self.with_tools(|tools, ctx| tools.pointer_down(&event, ctx));
        self.frames.request_redraw();
    }

    /// A pan dragged while a zoom or rotation animates is carried into
    /// the animation, so the next tick does not undo it.
    pub fn pointer_move(&mut self, event: PointerEvent) {
        self.track_pointer(&event);
        let pan_before = self.view.pan;
        self.with_tools(|tools, ctx| tools.pointer_move(&event, ctx));
        let dragged = self.view.pan - pan_before;
        if dragged != Point::default() {
            self.animator.shift_pan(dragged);
        }
        self.frames.request_redraw();
    }

    pub fn pointer_up(&mut self, event: PointerEvent) {
        self.track_pointer(&event);
        self.with_tools(|tools, ctx| tools.pointer_up(&event, ctx));
        self.frames.request_redraw();
    }

    pub fn set_text_draft(&mut self, draft: impl Into<String>) {
        if self.tools.set_text_draft(draft) {
            self.frames.request_redraw();
        }
    }

    pub fn commit_text_edit(&mut self) {
        self.with_tools(|tools, ctx| tools.commit_text(ctx));
        self.frames.request_redraw();
    }

    pub fn cancel_text_edit(&mut self) {
        if self.tools.cancel_text_edit() {
            self.frames.request_redraw();
        }
    }

    pub fn has_pending_commits(&self) -> bool {
        !self.commits.is_empty()
    }

    /// Hands over the queued commits in the order they happened.
    pub fn take_commits(&mut self) -> Vec<Commit> {
        std::mem::take(&mut self.commits)
    }

    /// Whether a frame is due; claims the pending redraw when it is.
    pub fn should_render(&mut self, now: Instant) -> bool {
        self.frames.should_render(now)
    }

    pub fn request_redraw(&mut self) {
        self.frames.request_redraw();
    }

    pub fn scene(&self) -> Scene<'_> {
        Scene {
            image: self.image.as_ref(),
            view: &self.view,
            transform: self.transform(),
            width: self.geometry.canvas_width.round().max(1.0) as u32,
            height: self.geometry.canvas_height.round().max(1.0) as u32,
            shapes: &self.shapes,
            interaction: self.tools.state(),
            calibration: &self.calibration,
            pointer: self.pointer,
            style: &self.style,
            metrics: self.metrics.as_ref(),
        }
    }

    /// Draws a full frame.
    pub fn render(&self, renderer: &mut Renderer) -> Option<tiny_skia::Pixmap> {
        renderer.render(&self.scene())
    }

    fn track_pointer(&mut self, event: &PointerEvent) {
        self.pointer = Some(self.transform().to_image_space(event.position));
    }

    fn with_tools<R>(
        &mut self,
        f: impl FnOnce(&mut ToolController, &mut ToolContext<'_>) -> R,
    ) -> R {
        let transform = self.transform();
        let mut ctx = ToolContext {
            view: &mut self.view,
            transform: &transform,
            shapes: &mut self.shapes,
            calibration: &mut self.calibration,
            metrics: self.metrics.as_ref(),
            style: &self.style,
            commits: &mut self.commits,
        };
        f(&mut self.tools, &mut ctx)
    }
}
