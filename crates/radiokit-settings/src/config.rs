//! Viewer configuration
//!
//! Configuration is organized into logical sections:
//! - Viewer chrome (zoom limits, rotation step, animation timing)
//! - Calibration policy (reference length)
//! - Annotation defaults (colors, stroke widths, text sizing, handles)
//! - Ruler preview (tick spacing)
//! - Remote services (timeouts)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{SettingsError, SettingsResult};

/// Viewer chrome settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerSettings {
    /// Lowest allowed zoom in percent
    pub zoom_min_percent: f64,
    /// Highest allowed zoom in percent
    pub zoom_max_percent: f64,
    /// Zoom change per zoom-in/zoom-out click in percent
    pub zoom_step_percent: f64,
    /// Rotation per rotate-left/rotate-right click in degrees
    pub rotation_step_deg: f64,
    /// Duration of pan/zoom/rotate animations in milliseconds
    pub animation_duration_ms: u64,
    /// Minimum time between two redraws in milliseconds
    pub frame_interval_ms: u64,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            zoom_min_percent: 10.0,
            zoom_max_percent: 400.0,
            zoom_step_percent: 10.0,
            rotation_step_deg: 90.0,
            animation_duration_ms: 300,
            frame_interval_ms: 16,
        }
    }
}

/// Calibration policy
///
/// The reference length is fixed product policy (a calibration jig of known
/// size) rather than a per-use prompt. Calibrated lengths are always in
/// millimeters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationSettings {
    /// Real length of the calibration reference in millimeters
    pub reference_length_mm: f64,
}

impl Default for CalibrationSettings {
    fn default() -> Self {
        Self {
            reference_length_mm: 15.0,
        }
    }
}

/// Annotation defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationSettings {
    /// Color for new shapes (`#rrggbb` or `#rrggbbaa`)
    pub default_color: String,
    /// Color for rectangles created from AI detections
    pub detection_color: String,
    /// Outline width for rectangles and circles in image pixels
    pub stroke_width: f64,
    /// Pen width for freehand paths in image pixels
    pub pen_width: f64,
    /// Font size of text at scale 1.0 in image pixels
    pub text_base_font_px: f64,
    /// Scale given to newly placed text
    pub default_text_scale: f64,
    /// Smallest scale a text resize can reach
    pub min_text_scale: f64,
    /// Size of text resize handles in screen pixels
    pub handle_size_px: f64,
}

impl Default for AnnotationSettings {
    fn default() -> Self {
        Self {
            default_color: "#ff3b30".to_string(),
            detection_color: "#34c759".to_string(),
            stroke_width: 2.0,
            pen_width: 3.0,
            text_base_font_px: 16.0,
            default_text_scale: 1.0,
            min_text_scale: 0.1,
            handle_size_px: 8.0,
        }
    }
}

/// Measurement ruler preview
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulerSettings {
    /// Distance between ticks in image pixels
    pub tick_interval_px: f64,
    /// Every n-th tick is drawn as a major tick
    pub major_tick_every: u32,
    /// Minor tick length in image pixels
    pub minor_tick_length: f64,
    /// Major tick length in image pixels
    pub major_tick_length: f64,
    /// Ruler and measurement color
    pub color: String,
}

impl Default for RulerSettings {
    fn default() -> Self {
        Self {
            tick_interval_px: 10.0,
            major_tick_every: 5,
            minor_tick_length: 4.0,
            major_tick_length: 9.0,
            color: "#ffd60a".to_string(),
        }
    }
}

/// Remote collaborator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Timeout applied to every persistence and AI call
    pub request_timeout_ms: u64,
    /// Store AI detections as annotations
    pub persist_detections: bool,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            request_timeout_ms: 15_000,
            persist_detections: true,
        }
    }
}

/// Complete viewer configuration
///
/// Aggregates all settings sections and provides file I/O operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Viewer chrome
    pub viewer: ViewerSettings,
    /// Calibration policy
    pub calibration: CalibrationSettings,
    /// Annotation defaults
    pub annotation: AnnotationSettings,
    /// Ruler preview
    pub ruler: RulerSettings,
    /// Remote collaborators
    pub services: ServiceSettings,
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Default location: `<config dir>/radiokit/config.toml`
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("radiokit").join("config.toml"))
            .ok_or_else(|| {
                SettingsError::ConfigDirectory("no platform config directory".to_string())
            })
    }

    /// Load the config from the default location, falling back to defaults
    /// when no file exists there.
    pub fn load_or_default() -> SettingsResult<Self> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from_file(&path)
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path)?;

        let config: Self = match Format::of(path)? {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match Format::of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        let viewer = &self.viewer;
        if viewer.zoom_min_percent <= 0.0 {
            return Err(SettingsError::invalid(
                "viewer.zoom_min_percent",
                "must be > 0",
            ));
        }
        if viewer.zoom_max_percent < viewer.zoom_min_percent {
            return Err(SettingsError::invalid(
                "viewer.zoom_max_percent",
                "must be >= viewer.zoom_min_percent",
            ));
        }
        if viewer.zoom_step_percent <= 0.0 {
            return Err(SettingsError::invalid(
                "viewer.zoom_step_percent",
                "must be > 0",
            ));
        }
        if viewer.frame_interval_ms == 0 {
            return Err(SettingsError::invalid(
                "viewer.frame_interval_ms",
                "must be > 0",
            ));
        }

        let reference = self.calibration.reference_length_mm;
        if reference.is_nan() || reference <= 0.0 {
            return Err(SettingsError::invalid(
                "calibration.reference_length_mm",
                "must be > 0",
            ));
        }

        let annotation = &self.annotation;
        for (key, value) in [
            ("annotation.default_color", &annotation.default_color),
            ("annotation.detection_color", &annotation.detection_color),
            ("ruler.color", &self.ruler.color),
        ] {
            if !is_hex_color(value) {
                return Err(SettingsError::invalid(key, "expected #rrggbb or #rrggbbaa"));
            }
        }
        if annotation.text_base_font_px <= 0.0 {
            return Err(SettingsError::invalid(
                "annotation.text_base_font_px",
                "must be > 0",
            ));
        }
        if annotation.min_text_scale <= 0.0
            || annotation.default_text_scale < annotation.min_text_scale
        {
            return Err(SettingsError::invalid(
                "annotation.default_text_scale",
                "must be >= annotation.min_text_scale > 0",
            ));
        }

        if self.ruler.tick_interval_px <= 0.0 {
            return Err(SettingsError::invalid("ruler.tick_interval_px", "must be > 0"));
        }
        if self.ruler.major_tick_every == 0 {
            return Err(SettingsError::invalid("ruler.major_tick_every", "must be > 0"));
        }
        if self.services.request_timeout_ms == 0 {
            return Err(SettingsError::invalid("services.request_timeout_ms", "must be > 0"));
        }

        Ok(())
    }
}

enum Format {
    Json,
    Toml,
}

impl Format {
    fn of(path: &Path) -> SettingsResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Format::Json),
            Some("toml") => Ok(Format::Toml),
            other => Err(SettingsError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}

fn is_hex_color(value: &str) -> bool {
    value.strip_prefix('#').is_some_and(|hex| {
        (hex.len() == 6 || hex.len() == 8) && hex.chars().all(|c| c.is_ascii_hexdigit())
    })
}
