//! # RadioKit Services
//!
//! The async boundary of the viewer. The canvas engine is synchronous;
//! this crate connects it to its remote collaborators:
//!
//! - [`AnnotationStore`]: per-image annotations, calibration and images
//! - [`AiService`]: object detection and image enhancement
//! - [`PersistenceGateway`]: ordered, retrying writes of canvas commits
//! - [`ViewerSession`]: a canvas plus its collaborators, with a stale
//!   response guard keyed on the open image
//!
//! Wire records live in [`wire`]. In-memory collaborators are provided for
//! headless use and tests; no HTTP client is included.

pub mod ai;
pub mod gateway;
pub mod session;
pub mod store;
pub mod wire;

pub use ai::{AiService, StaticAiService};
pub use gateway::{FlushReport, LoadedImage, PersistenceGateway};
pub use session::{RemoteRequest, ViewerSession};
pub use store::{AnnotationStore, InMemoryAnnotationStore};
pub use wire::{AnnotationKind, AnnotationRecord, CalibrationRecord, Detection, DetectionResponse};
