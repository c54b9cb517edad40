//! Text measurement used for text bounding boxes and handle placement.

use rusttype::{point as rt_point, Font, Scale};

use crate::font_manager;

/// Size of a laid out line of text in image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextExtent {
    /// Advance width of the whole line
    pub width: f64,
    /// Distance from baseline to the top of the box
    pub ascent: f64,
    /// Distance from baseline to the bottom of the box
    pub descent: f64,
}

impl TextExtent {
    pub fn height(&self) -> f64 {
        self.ascent + self.descent
    }
}

/// Measures text at a given scale.
///
/// Implementations must be linear in `scale` so that a resize computed from
/// widths reproduces the dragged width exactly.
pub trait TextMetrics: Send + Sync {
    /// Font size in pixels at scale 1.0.
    fn base_font_px(&self) -> f64;

    fn measure(&self, text: &str, scale: f64) -> TextExtent;

    /// Font used to draw glyphs, if any is available.
    fn font(&self) -> Option<&'static Font<'static>> {
        None
    }

    fn font_px(&self, scale: f64) -> f64 {
        self.base_font_px() * scale
    }
}

/// Metrics backed by a real font.
pub struct FontMetrics {
    font: &'static Font<'static>,
    base_font_px: f64,
}

impl FontMetrics {
    pub fn new(font: &'static Font<'static>, base_font_px: f64) -> Self {
        Self { font, base_font_px }
    }

    /// Metrics for the system sans-serif face, if one is installed.
    pub fn system(base_font_px: f64) -> Option<Self> {
        font_manager::sans_font().map(|font| Self::new(font, base_font_px))
    }
}

impl TextMetrics for FontMetrics {
    fn base_font_px(&self) -> f64 {
        self.base_font_px
    }

    fn measure(&self, text: &str, scale: f64) -> TextExtent {
        let px = self.font_px(scale) as f32;
        let rt_scale = Scale::uniform(px);
        let v_metrics = self.font.v_metrics(rt_scale);

        let width = self
            .font
            .layout(text, rt_scale, rt_point(0.0, 0.0))
            .last()
            .map(|glyph| glyph.position().x + glyph.unpositioned().h_metrics().advance_width)
            .unwrap_or(0.0);

        TextExtent {
            width: width as f64,
            ascent: v_metrics.ascent as f64,
            descent: -v_metrics.descent as f64,
        }
    }

    fn font(&self) -> Option<&'static Font<'static>> {
        Some(self.font)
    }
}

/// Font-free metrics with a fixed advance per character.
///
/// Used when no system font can be found, and in tests where exact widths
/// matter.
#[derive(Debug, Clone, Copy)]
pub struct FixedAdvanceMetrics {
    base_font_px: f64,
    advance_em: f64,
}

impl FixedAdvanceMetrics {
    const ASCENT_EM: f64 = 0.8;
    const DESCENT_EM: f64 = 0.2;

    pub fn new(base_font_px: f64) -> Self {
        Self {
            base_font_px,
            advance_em: 0.6,
        }
    }
}

impl TextMetrics for FixedAdvanceMetrics {
    fn base_font_px(&self) -> f64 {
        self.base_font_px
    }

    fn measure(&self, text: &str, scale: f64) -> TextExtent {
        let px = self.font_px(scale);
        TextExtent {
            width: text.chars().count() as f64 * self.advance_em * px,
            ascent: Self::ASCENT_EM * px,
            descent: Self::DESCENT_EM * px,
        }
    }
}

/// System font metrics, falling back to fixed advances.
pub fn default_metrics(base_font_px: f64) -> Box<dyn TextMetrics> {
    match FontMetrics::system(base_font_px) {
        Some(metrics) => Box::new(metrics),
        None => {
            tracing::warn!("No system sans-serif font found; text is measured with fixed advances");
            Box::new(FixedAdvanceMetrics::new(base_font_px))
        }
    }
}
