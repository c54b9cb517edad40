//! # RadioKit
//!
//! Annotation and calibrated measurement engine for diagnostic radiographs.
//!
//! ## Architecture
//!
//! RadioKit is organized as a workspace with multiple crates:
//!
//! 1. **radiokit-core** - Error taxonomy, length units, event bus
//! 2. **radiokit-settings** - Configuration files and validation
//! 3. **radiokit-viewer** - Canvas engine: view transform, tools, calibration, rendering
//! 4. **radiokit-services** - Persistence gateway, AI collaborators, async session
//! 5. **radiokit** - Headless renderer binary that integrates all crates
//!
//! ## Features
//!
//! - **Image-anchored annotations**: rectangles, circles, freehand, text, measurements
//! - **Calibration**: pixel lengths reported in millimeters from one reference
//! - **View control**: animated zoom and rotation, pan, brightness and contrast
//! - **Persistence**: ordered, retrying writes to an annotation store

use anyhow::Context;
use image::RgbaImage;
use std::path::Path;

pub use radiokit_core::{
    event_bus, CalibrationError, Error, ImageId, LengthUnit, PersistenceError,
    RemoteServiceError, Result, ShapeError, TransformError,
};

pub use radiokit_settings::{Config, SettingsError};

pub use radiokit_viewer::{
    AnnotationDocument, AnnotationShape, Calibration, Canvas, Color, Commit, PointerEvent,
    Renderer, Shape, ShapeId, ToolKind, ViewState, ViewTransform,
};

pub use radiokit_services::{
    AiService, AnnotationStore, InMemoryAnnotationStore, PersistenceGateway, StaticAiService,
    ViewerSession,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    // Measurement reports go to stdout, so logs use stderr.
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(())
}

/// Loads the user config, falling back to defaults when it is unreadable.
pub fn load_config() -> Config {
    match Config::load_or_default() {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("Using default config: {}", err);
            Config::default()
        }
    }
}

/// Opens `image_path` on a canvas, with the shapes, calibration and view of
/// an annotation document when one is given.
pub fn open_canvas(
    config: &Config,
    image_path: &Path,
    document: Option<AnnotationDocument>,
) -> anyhow::Result<Canvas> {
    let pixels = image::open(image_path)
        .with_context(|| format!("Failed to open image {}", image_path.display()))?
        .to_rgba8();

    let mut canvas = Canvas::new(config);
    match document {
        Some(document) => {
            canvas.load_image(pixels, document.shapes, document.calibration);
            if let Some(view) = document.view {
                canvas.set_view(view);
            }
        }
        None => canvas.load_image(pixels, Vec::new(), None),
    }
    Ok(canvas)
}

/// Draws one frame of the canvas.
pub fn render_frame(canvas: &Canvas) -> anyhow::Result<RgbaImage> {
    let pixmap = canvas
        .render(&mut Renderer::new())
        .context("Canvas has no drawable surface")?;
    Ok(radiokit_viewer::renderer::to_rgba_image(&pixmap))
}

/// One line per measurement, e.g. `measurement 1: 30.0 mm`.
pub fn measurement_report(canvas: &Canvas) -> Vec<String> {
    canvas
        .shapes()
        .iter()
        .filter_map(|shape| match shape {
            Shape::Measurement(mark) => Some(mark.label()),
            _ => None,
        })
        .enumerate()
        .map(|(index, label)| format!("measurement {}: {}", index + 1, label))
        .collect()
}
