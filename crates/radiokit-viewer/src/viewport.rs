//! View state and coordinate transformation.
//!
//! Three coordinate spaces are involved:
//!
//! - **Image space**: pixels of the unrotated, unzoomed base image. All
//!   annotations live here.
//! - **Canvas space**: pixels of the drawing surface backing store, which is
//!   the size of the base image.
//! - **Screen space**: pointer coordinates. The surface is displayed at some
//!   on-screen size and offset, which may differ from its backing size.
//!
//! Image to canvas:
//!
//! ```text
//! canvas = c + z · R(θ) · (p − c + pan / z)
//! ```
//!
//! where `c` is the canvas center, `z = zoom / 100` and `R(θ)` rotates
//! clockwise on the y-down canvas. Canvas to screen is a per-axis scale by
//! `display / canvas` followed by the element offset. [`ViewTransform`] is
//! the only place either mapping or its inverse is computed.

use radiokit_core::TransformError;
use serde::{Deserialize, Serialize};

use crate::model::Point;

/// User-controlled view parameters.
///
/// Changing any of these never touches annotation geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    /// Zoom in percent, within [`ViewState::ZOOM_RANGE`]
    pub zoom_percent: f64,
    /// Clockwise rotation in degrees
    pub rotation_deg: f64,
    /// Pan offset in image pixels before rotation
    pub pan: Point,
    /// CSS-style brightness in percent
    pub brightness_percent: f64,
    /// CSS-style contrast in percent
    pub contrast_percent: f64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            zoom_percent: 100.0,
            rotation_deg: 0.0,
            pan: Point::default(),
            brightness_percent: 100.0,
            contrast_percent: 100.0,
        }
    }
}

impl ViewState {
    pub const ZOOM_RANGE: (f64, f64) = (10.0, 400.0);
    pub const FILTER_RANGE: (f64, f64) = (0.0, 200.0);

    pub fn zoom_factor(&self) -> f64 {
        self.zoom_percent / 100.0
    }

    /// Sets the zoom, clamped to [`ViewState::ZOOM_RANGE`].
    pub fn set_zoom_percent(&mut self, zoom: f64) {
        if zoom.is_finite() {
            self.zoom_percent = zoom.clamp(Self::ZOOM_RANGE.0, Self::ZOOM_RANGE.1);
        }
    }

    pub fn set_rotation_deg(&mut self, degrees: f64) {
        if degrees.is_finite() {
            self.rotation_deg = degrees;
        }
    }

    pub fn set_brightness_percent(&mut self, value: f64) {
        if value.is_finite() {
            self.brightness_percent = value.clamp(Self::FILTER_RANGE.0, Self::FILTER_RANGE.1);
        }
    }

    pub fn set_contrast_percent(&mut self, value: f64) {
        if value.is_finite() {
            self.contrast_percent = value.clamp(Self::FILTER_RANGE.0, Self::FILTER_RANGE.1);
        }
    }

    pub fn pan_by(&mut self, delta: Point) {
        if delta.is_finite() {
            self.pan = self.pan + delta;
        }
    }

    /// Resets geometry (zoom, rotation, pan), keeping the image filters.
    pub fn reset_geometry(&mut self) {
        let defaults = Self::default();
        self.zoom_percent = defaults.zoom_percent;
        self.rotation_deg = defaults.rotation_deg;
        self.pan = defaults.pan;
    }

    pub fn reset_filters(&mut self) {
        self.brightness_percent = 100.0;
        self.contrast_percent = 100.0;
    }

    /// Rotation folded into `[0, 360)`.
    pub fn normalized_rotation(&self) -> f64 {
        self.rotation_deg.rem_euclid(360.0)
    }

    /// Linear interpolation of zoom, rotation and pan towards `to`.
    ///
    /// Filters are not animated and are taken from `to`.
    pub fn interpolate(&self, to: &ViewState, t: f64) -> ViewState {
        let t = t.clamp(0.0, 1.0);
        let lerp = |a: f64, b: f64| a + (b - a) * t;
        ViewState {
            zoom_percent: lerp(self.zoom_percent, to.zoom_percent),
            rotation_deg: lerp(self.rotation_deg, to.rotation_deg),
            pan: Point::new(lerp(self.pan.x, to.pan.x), lerp(self.pan.y, to.pan.y)),
            brightness_percent: to.brightness_percent,
            contrast_percent: to.contrast_percent,
        }
    }
}

/// Placement of the drawing surface on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasGeometry {
    /// Backing store size, equal to the base image size
    pub canvas_width: f64,
    pub canvas_height: f64,
    /// On-screen size of the surface
    pub display_width: f64,
    pub display_height: f64,
    /// Screen position of the surface's top-left corner
    pub origin: Point,
}

impl CanvasGeometry {
    /// A surface displayed at its backing size at the screen origin.
    pub fn new(canvas_width: f64, canvas_height: f64) -> Self {
        Self {
            canvas_width,
            canvas_height,
            display_width: canvas_width,
            display_height: canvas_height,
            origin: Point::default(),
        }
    }

    pub fn with_display(mut self, width: f64, height: f64, origin: Point) -> Self {
        self.display_width = width;
        self.display_height = height;
        self.origin = origin;
        self
    }

    pub fn center(&self) -> Point {
        Point::new(self.canvas_width / 2.0, self.canvas_height / 2.0)
    }

    fn validate(&self) -> Result<(), TransformError> {
        let sizes = [
            ("canvas width", self.canvas_width),
            ("canvas height", self.canvas_height),
            ("display width", self.display_width),
            ("display height", self.display_height),
        ];
        for (name, value) in sizes {
            if !value.is_finite() || value <= 0.0 {
                return Err(TransformError::Inversion {
                    reason: format!("{} is {}", name, value),
                });
            }
        }
        if !self.origin.is_finite() {
            return Err(TransformError::Inversion {
                reason: "surface origin is not finite".to_string(),
            });
        }
        Ok(())
    }
}

/// Forward and inverse mapping between image and screen space for one
/// view state and surface placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    center: Point,
    zoom: f64,
    cos: f64,
    sin: f64,
    pan: Point,
    scale_x: f64,
    scale_y: f64,
    origin: Point,
}

impl ViewTransform {
    /// Relative tolerance of the round-trip check.
    pub const ROUND_TRIP_EPSILON: f64 = 1e-6;

    pub fn new(view: &ViewState, geometry: &CanvasGeometry) -> Result<Self, TransformError> {
        geometry.validate()?;

        let zoom = view.zoom_factor();
        if !zoom.is_finite() || zoom <= 0.0 {
            return Err(TransformError::Inversion {
                reason: format!("zoom factor is {}", zoom),
            });
        }
        if !view.rotation_deg.is_finite() || !view.pan.is_finite() {
            return Err(TransformError::Inversion {
                reason: "rotation or pan is not finite".to_string(),
            });
        }

        let theta = view.rotation_deg.to_radians();
        Ok(Self {
            center: geometry.center(),
            zoom,
            cos: theta.cos(),
            sin: theta.sin(),
            pan: view.pan,
            scale_x: geometry.display_width / geometry.canvas_width,
            scale_y: geometry.display_height / geometry.canvas_height,
            origin: geometry.origin,
        })
    }

    /// Image drawn 1:1 on the canvas with no zoom, rotation or pan.
    pub fn identity() -> Self {
        Self {
            center: Point::default(),
            zoom: 1.0,
            cos: 1.0,
            sin: 0.0,
            pan: Point::default(),
            scale_x: 1.0,
            scale_y: 1.0,
            origin: Point::default(),
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn image_to_canvas(&self, p: Point) -> Point {
        let dx = p.x - self.center.x + self.pan.x / self.zoom;
        let dy = p.y - self.center.y + self.pan.y / self.zoom;
        let rx = dx * self.cos - dy * self.sin;
        let ry = dx * self.sin + dy * self.cos;
        Point::new(self.center.x + self.zoom * rx, self.center.y + self.zoom * ry)
    }

    pub fn canvas_to_image(&self, q: Point) -> Point {
        let rx = (q.x - self.center.x) / self.zoom;
        let ry = (q.y - self.center.y) / self.zoom;
        let dx = rx * self.cos + ry * self.sin;
        let dy = -rx * self.sin + ry * self.cos;
        Point::new(
            dx - self.pan.x / self.zoom + self.center.x,
            dy - self.pan.y / self.zoom + self.center.y,
        )
    }

    pub fn canvas_to_screen(&self, q: Point) -> Point {
        Point::new(
            self.origin.x + q.x * self.scale_x,
            self.origin.y + q.y * self.scale_y,
        )
    }

    pub fn screen_to_canvas(&self, s: Point) -> Point {
        Point::new(
            (s.x - self.origin.x) / self.scale_x,
            (s.y - self.origin.y) / self.scale_y,
        )
    }

    /// Image space to screen space.
    pub fn to_screen_space(&self, p: Point) -> Point {
        self.canvas_to_screen(self.image_to_canvas(p))
    }

    /// Screen space to image space; the exact inverse of
    /// [`ViewTransform::to_screen_space`].
    pub fn to_image_space(&self, s: Point) -> Point {
        self.canvas_to_image(self.screen_to_canvas(s))
    }

    /// Pan change that makes the image follow a screen-space drag.
    ///
    /// The drag is undone through the display scale and the rotation, so
    /// the point under the pointer stays under the pointer.
    pub fn screen_delta_to_pan(&self, delta: Point) -> Point {
        let cx = delta.x / self.scale_x;
        let cy = delta.y / self.scale_y;
        Point::new(cx * self.cos + cy * self.sin, -cx * self.sin + cy * self.cos)
    }

    /// Length in image pixels of one screen pixel.
    pub fn image_units_per_screen_px(&self) -> f64 {
        2.0 / (self.zoom * (self.scale_x + self.scale_y))
    }

    /// Length in image pixels of one canvas pixel.
    pub fn image_units_per_canvas_px(&self) -> f64 {
        1.0 / self.zoom
    }

    /// Image-to-canvas mapping as `[sx, ky, kx, sy, tx, ty]`, where
    /// `x' = sx·x + kx·y + tx` and `y' = ky·x + sy·y + ty`.
    pub fn canvas_affine(&self) -> [f64; 6] {
        let sx = self.zoom * self.cos;
        let ky = self.zoom * self.sin;
        let kx = -self.zoom * self.sin;
        let sy = self.zoom * self.cos;
        let t = self.image_to_canvas(Point::default());
        [sx, ky, kx, sy, t.x, t.y]
    }

    /// Checks that `p` survives an image→screen→image round trip.
    pub fn check_round_trip(&self, p: Point) -> Result<(), TransformError> {
        let back = self.to_image_space(self.to_screen_space(p));
        let error = back.distance_to(&p);
        let tolerance = Self::ROUND_TRIP_EPSILON * p.x.abs().max(p.y.abs()).max(1.0);
        if error.is_finite() && error <= tolerance {
            Ok(())
        } else {
            Err(TransformError::Inversion {
                reason: format!(
                    "({:.3}, {:.3}) came back as ({:.3}, {:.3})",
                    p.x, p.y, back.x, back.y
                ),
            })
        }
    }
}
