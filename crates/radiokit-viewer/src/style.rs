//! Drawing defaults resolved from the settings file.

use radiokit_core::LengthUnit;
use radiokit_settings::Config;

use crate::model::Color;

#[derive(Debug, Clone, PartialEq)]
pub struct RulerStyle {
    pub tick_interval: f64,
    pub major_tick_every: u32,
    pub minor_tick_length: f64,
    pub major_tick_length: f64,
    pub color: Color,
}

/// Colors and sizes used when creating and drawing annotations.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasStyle {
    pub default_color: Color,
    pub detection_color: Color,
    pub stroke_width: f64,
    pub pen_width: f64,
    pub default_text_scale: f64,
    pub min_text_scale: f64,
    pub handle_size_px: f64,
    pub reference_length: f64,
    pub unit: LengthUnit,
    pub ruler: RulerStyle,
}

impl CanvasStyle {
    pub fn from_config(config: &Config) -> Self {
        let annotation = &config.annotation;
        let defaults = Self::default();
        Self {
            default_color: parse_color(&annotation.default_color, defaults.default_color),
            detection_color: parse_color(&annotation.detection_color, defaults.detection_color),
            stroke_width: annotation.stroke_width,
            pen_width: annotation.pen_width,
            default_text_scale: annotation.default_text_scale,
            min_text_scale: annotation.min_text_scale,
            handle_size_px: annotation.handle_size_px,
            reference_length: config.calibration.reference_length_mm,
            unit: LengthUnit::Millimeter,
            ruler: RulerStyle {
                tick_interval: config.ruler.tick_interval_px,
                major_tick_every: config.ruler.major_tick_every.max(1),
                minor_tick_length: config.ruler.minor_tick_length,
                major_tick_length: config.ruler.major_tick_length,
                color: parse_color(&config.ruler.color, defaults.ruler.color),
            },
        }
    }
}

impl Default for CanvasStyle {
    fn default() -> Self {
        Self {
            default_color: Color::rgb(0xff, 0x3b, 0x30),
            detection_color: Color::rgb(0x34, 0xc7, 0x59),
            stroke_width: 2.0,
            pen_width: 3.0,
            default_text_scale: 1.0,
            min_text_scale: 0.1,
            handle_size_px: 8.0,
            reference_length: 15.0,
            unit: LengthUnit::Millimeter,
            ruler: RulerStyle {
                tick_interval: 10.0,
                major_tick_every: 5,
                minor_tick_length: 4.0,
                major_tick_length: 9.0,
                color: Color::rgb(0xff, 0xd6, 0x0a),
            },
        }
    }
}

fn parse_color(value: &str, fallback: Color) -> Color {
    value.parse().unwrap_or_else(|err| {
        tracing::warn!("Invalid color in settings ({}); using {}", err, fallback);
        fallback
    })
}
