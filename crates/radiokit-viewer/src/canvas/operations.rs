//! Canvas operations: viewer chrome and direct shape edits.

use radiokit_core::{CalibrationError, ShapeError};
use std::time::{Duration, Instant};

use super::{Canvas, Commit};
use crate::model::{AnnotationShape, Shape, ShapeId};
use crate::shape_store::ShapePatch;
use crate::viewport::ViewState;

impl Canvas {
    fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.clamp(self.settings.zoom_min_percent, self.settings.zoom_max_percent)
    }

    fn animation_duration(&self) -> Duration {
        Duration::from_millis(self.settings.animation_duration_ms)
    }

    /// View the next animation builds on: the running target if any, so
    /// repeated clicks accumulate.
    fn animation_base(&self) -> ViewState {
        let mut base = self.animator.target().copied().unwrap_or(self.view);
        base.brightness_percent = self.view.brightness_percent;
        base.contrast_percent = self.view.contrast_percent;
        base
    }

    /// Animates from the current frame to `target`, replacing any running
    /// animation.
    pub fn animate_to(&mut self, target: ViewState, now: Instant) {
        self.animator.start(self.view, target, now, self.animation_duration());
        self.frames.request_redraw();
    }

    /// Advances the running animation. Returns whether the view changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(view) = self.animator.tick(now) else {
            return false;
        };
        self.apply_animated_view(view);
        if !self.animator.is_running() {
            self.view.rotation_deg = self.view.normalized_rotation();
        }
        self.frames.request_redraw();
        true
    }

    pub fn is_animating(&self) -> bool {
        self.animator.is_running()
    }

    pub(super) fn apply_animated_view(&mut self, animated: ViewState) {
        self.view.set_zoom_percent(animated.zoom_percent);
        self.view.set_rotation_deg(animated.rotation_deg);
        self.view.pan = animated.pan;
    }

    /// Sets zoom immediately, as from a slider.
    pub fn set_zoom_percent(&mut self, zoom: f64) {
        self.animator = Default::default();
        let zoom = self.clamp_zoom(zoom);
        self.view.set_zoom_percent(zoom);
        self.frames.request_redraw();
    }

    pub fn zoom_in(&mut self, now: Instant) {
        self.zoom_by(self.settings.zoom_step_percent, now);
    }

    pub fn zoom_out(&mut self, now: Instant) {
        self.zoom_by(-self.settings.zoom_step_percent, now);
    }

    fn zoom_by(&mut self, step: f64, now: Instant) {
        let mut target = self.animation_base();
        target.zoom_percent = self.clamp_zoom(target.zoom_percent + step);
        self.animate_to(target, now);
    }

    /// Rotates counter-clockwise by one step.
    pub fn rotate_left(&mut self, now: Instant) {
        self.rotate_by(-self.settings.rotation_step_deg, now);
    }

    /// Rotates clockwise by one step.
    pub fn rotate_right(&mut self, now: Instant) {
        self.rotate_by(self.settings.rotation_step_deg, now);
    }

    fn rotate_by(&mut self, degrees: f64, now: Instant) {
        let mut target = self.animation_base();
        target.rotation_deg += degrees;
        self.animate_to(target, now);
    }

    /// Animates back to 100% zoom, no rotation and no pan.
    pub fn reset_view(&mut self, now: Instant) {
        let mut target = self.view;
        target.reset_geometry();
        // Unwind to the nearest multiple of a full turn.
        let turns = (self.view.rotation_deg / 360.0).round();
        target.rotation_deg = turns * 360.0;
        self.animate_to(target, now);
    }

    /// Jumps to a saved view without animating.
    pub fn set_view(&mut self, view: ViewState) {
        self.animator = Default::default();
        self.view.set_zoom_percent(self.clamp_zoom(view.zoom_percent));
        self.view.set_rotation_deg(view.rotation_deg);
        if view.pan.is_finite() {
            self.view.pan = view.pan;
        }
        self.view.set_brightness_percent(view.brightness_percent);
        self.view.set_contrast_percent(view.contrast_percent);
        self.frames.request_redraw();
    }

    pub fn set_brightness_percent(&mut self, value: f64) {
        self.view.set_brightness_percent(value);
        self.frames.request_redraw();
    }

    pub fn set_contrast_percent(&mut self, value: f64) {
        self.view.set_contrast_percent(value);
        self.frames.request_redraw();
    }

    /// Adds a shape created outside the tools, e.g. an AI detection.
    pub fn add_shape(&mut self, shape: Shape) -> Result<ShapeId, ShapeError> {
        let id = self.shapes.add(shape.clone())?;
        self.commits.push(Commit::Created(shape));
        self.frames.request_redraw();
        Ok(id)
    }

    /// Adds a shape that is already persisted; nothing is committed.
    pub fn insert_persisted(&mut self, shape: Shape) -> Result<ShapeId, ShapeError> {
        let id = self.shapes.add(shape)?;
        self.frames.request_redraw();
        Ok(id)
    }

    pub fn update_shape(&mut self, id: ShapeId, patch: ShapePatch) -> Result<(), ShapeError> {
        let shape = self.shapes.update(id, patch)?.clone();
        self.commits.push(Commit::Updated(shape));
        self.frames.request_redraw();
        Ok(())
    }

    pub fn delete_shape(&mut self, id: ShapeId) -> Result<Shape, ShapeError> {
        let shape = self
            .shapes
            .remove(id)
            .ok_or_else(|| ShapeError::NotFound { id: id.to_string() })?;
        tracing::info!("Deleted {} {}", shape.shape_type(), shape.id());
        self.commits.push(Commit::Deleted(id));
        self.frames.request_redraw();
        Ok(shape)
    }

    pub fn to_real_length(&self, pixels: f64) -> Result<f64, CalibrationError> {
        self.calibration.to_real_length(pixels)
    }

    pub fn format_length(&self, pixels: f64) -> String {
        self.calibration.format_length(pixels)
    }
}
