//! Brightness/contrast adjustment of the base image.
//!
//! Matches the CSS filter chain `brightness(b%) contrast(c%)`: each step is
//! a per-channel linear transfer clamped to `[0, 1]`, alpha untouched.

use image::{Rgba, RgbaImage};
use tiny_skia::{ColorU8, Pixmap};

/// Per-channel lookup table for the filter chain.
pub fn filter_lut(brightness_percent: f64, contrast_percent: f64) -> [u8; 256] {
    let brightness = brightness_percent / 100.0;
    let contrast = contrast_percent / 100.0;
    let mut lut = [0u8; 256];
    for (v, out) in lut.iter_mut().enumerate() {
        let x = (v as f64 / 255.0 * brightness).clamp(0.0, 1.0);
        let x = ((x - 0.5) * contrast + 0.5).clamp(0.0, 1.0);
        *out = (x * 255.0).round() as u8;
    }
    lut
}

pub fn is_neutral(brightness_percent: f64, contrast_percent: f64) -> bool {
    brightness_percent == 100.0 && contrast_percent == 100.0
}

pub fn apply_filters(
    image: &RgbaImage,
    brightness_percent: f64,
    contrast_percent: f64,
) -> RgbaImage {
    if is_neutral(brightness_percent, contrast_percent) {
        return image.clone();
    }
    let lut = filter_lut(brightness_percent, contrast_percent);
    let mut out = image.clone();
    for Rgba([r, g, b, _]) in out.pixels_mut() {
        *r = lut[*r as usize];
        *g = lut[*g as usize];
        *b = lut[*b as usize];
    }
    out
}

/// Copies an RGBA image into a premultiplied pixmap.
pub fn to_pixmap(image: &RgbaImage) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(image.width(), image.height())?;
    for (dst, Rgba([r, g, b, a])) in pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
        *dst = ColorU8::from_rgba(*r, *g, *b, *a).premultiply();
    }
    Some(pixmap)
}

/// Copies a pixmap out as straight-alpha RGBA.
pub fn to_rgba_image(pixmap: &Pixmap) -> RgbaImage {
    let mut image = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in image.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    image
}
