//! # RadioKit Viewer
//!
//! The annotation and calibration canvas engine for radiograph viewing.
//! Keeps shapes, text and measurements anchored to the image while the
//! user pans, zooms, rotates and adjusts brightness/contrast, and turns
//! pixel distances into millimeters from one reference measurement.
//!
//! ## Architecture
//!
//! ```text
//! Canvas (one open image)
//!   ├── ViewState + ViewTransform (image ⇄ screen)
//!   ├── ToolController (pan, rectangle, circle, text, freehand, calibrate, measure)
//!   ├── ShapeStore (annotations in image space)
//!   ├── CalibrationModel (pixel → mm)
//!   ├── Animator + FrameScheduler
//!   └── Commit queue (for persistence)
//!
//! Renderer (tiny-skia)
//!   └── filtered base image, shapes, previews, measurements, ruler
//! ```
//!
//! The engine is synchronous and single-threaded; time is passed in so
//! animations are deterministic.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use radiokit_viewer::{Canvas, PointerEvent, Renderer, ToolKind};
//! use std::time::Instant;
//!
//! let mut canvas = Canvas::new(&config);
//! canvas.load_image(pixels, Vec::new(), None);
//! canvas.select_tool(ToolKind::Rectangle);
//! canvas.pointer_down(PointerEvent::primary(10.0, 10.0), Instant::now());
//! canvas.pointer_up(PointerEvent::primary(60.0, 40.0));
//!
//! let frame = canvas.render(&mut Renderer::new());
//! ```

pub mod animation;
pub mod calibration;
pub mod canvas;
pub mod font_manager;
pub mod model;
pub mod renderer;
pub mod serialization;
pub mod shape_store;
pub mod style;
pub mod text_metrics;
pub mod tools;
pub mod viewport;

pub use animation::{ease_in_out_cubic, Animator, FrameScheduler, ViewAnimation};
pub use calibration::{Calibration, CalibrationModel, CompletedCalibration};
pub use canvas::{BaseImage, Canvas, Commit};
pub use model::{
    AnnotationShape, Bounds, CircleShape, Color, Corner, FreehandShape, MeasurementMark,
    PathSegment, Point, RectangleShape, Shape, ShapeId, ShapeType, TextShape,
};
pub use renderer::{Renderer, Scene};
pub use serialization::AnnotationDocument;
pub use shape_store::{ShapePatch, ShapeStore};
pub use style::{CanvasStyle, RulerStyle};
pub use text_metrics::{FixedAdvanceMetrics, FontMetrics, TextExtent, TextMetrics};
pub use tools::{
    DraftShape, InteractionState, MeasureKind, PointerButton, PointerEvent, TextEdit, TextTarget,
    ToolController, ToolKind,
};
pub use viewport::{CanvasGeometry, ViewState, ViewTransform};
