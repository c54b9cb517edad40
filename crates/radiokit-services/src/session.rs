//! Async viewer session: one canvas wired to its remote collaborators.
//!
//! The canvas itself stays synchronous. The session loads stored state when
//! an image opens, flushes commits to the store, and applies AI results.
//! Every remote response carries the [`ImageId`] it was requested for and is
//! dropped when the user has moved on to another image.

use image::{ImageFormat, RgbaImage};
use radiokit_core::event_bus::{
    event_bus, AnnotationEvent, CalibrationEvent, EventBus, ImageEvent, Notification, ViewerEvent,
};
use radiokit_core::{Error, ImageId, RemoteServiceError, Result};
use radiokit_settings::Config;
use radiokit_viewer::{Canvas, Commit};
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use crate::ai::AiService;
use crate::gateway::{FlushReport, PersistenceGateway};
use crate::store::AnnotationStore;
use crate::wire::DetectionResponse;

/// The encoded base image of a specific image, sent to the AI service.
#[derive(Debug, Clone)]
pub struct RemoteRequest {
    pub image: ImageId,
    pub png: Vec<u8>,
}

pub struct ViewerSession {
    canvas: Canvas,
    image: Option<ImageId>,
    gateway: PersistenceGateway,
    ai: Arc<dyn AiService>,
    bus: &'static EventBus,
    timeout: Duration,
    persist_detections: bool,
}

impl ViewerSession {
    pub fn new(config: &Config, store: Arc<dyn AnnotationStore>, ai: Arc<dyn AiService>) -> Self {
        Self::with_canvas(Canvas::new(config), config, store, ai)
    }

    pub fn with_canvas(
        canvas: Canvas,
        config: &Config,
        store: Arc<dyn AnnotationStore>,
        ai: Arc<dyn AiService>,
    ) -> Self {
        let timeout = Duration::from_millis(config.services.request_timeout_ms);
        Self {
            canvas,
            image: None,
            gateway: PersistenceGateway::new(store, timeout),
            ai,
            bus: event_bus(),
            timeout,
            persist_detections: config.services.persist_detections,
        }
    }

    /// Publishes to `bus` instead of the process-wide bus.
    pub fn with_event_bus(mut self, bus: &'static EventBus) -> Self {
        self.bus = bus;
        self
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    pub fn current_image(&self) -> Option<&ImageId> {
        self.image.as_ref()
    }

    pub fn gateway(&self) -> &PersistenceGateway {
        &self.gateway
    }

    pub fn ai_service(&self) -> Arc<dyn AiService> {
        Arc::clone(&self.ai)
    }

    /// Opens `image` with its stored annotations and calibration.
    ///
    /// Outstanding commits of the previous image are flushed first. When the
    /// store cannot be read the image still opens, without annotations.
    pub async fn open_image(&mut self, image: ImageId, pixels: RgbaImage) {
        if self.image.is_some() && self.canvas.has_pending_commits() {
            self.flush().await;
        }

        let loaded = match self.gateway.load(&image).await {
            Ok(loaded) => loaded,
            Err(err) => {
                tracing::warn!("Opening {} without stored annotations: {}", image, err);
                self.bus
                    .notify(Notification::warning(format!("Could not load annotations: {}", err)));
                Default::default()
            }
        };
        if loaded.skipped > 0 {
            self.bus.notify(Notification::warning(format!(
                "{} stored annotations could not be shown",
                loaded.skipped
            )));
        }

        let annotations = loaded.shapes.len();
        self.canvas.load_image(pixels, loaded.shapes, loaded.calibration);
        self.image = Some(image.clone());
        self.bus.publish(ViewerEvent::Image(ImageEvent::Opened {
            image_id: image,
            annotations,
        }));
    }

    /// Writes the canvas commits to the store.
    ///
    /// Failures become warning notifications; local state is kept and the
    /// failed commits are retried by the next flush.
    pub async fn flush(&mut self) -> FlushReport {
        let Some(image) = self.image.clone() else {
            return FlushReport::default();
        };
        let commits = self.canvas.take_commits();
        for commit in &commits {
            if let Commit::Calibrated(calibration) = commit {
                self.bus.publish(ViewerEvent::Calibration(CalibrationEvent::Set {
                    image_id: image.clone(),
                    pixel_length: calibration.pixel_length,
                    real_length: calibration.real_length,
                }));
            }
        }
        if commits.is_empty() && self.gateway.pending() == 0 {
            return FlushReport::default();
        }

        let report = self.gateway.flush(&image, commits).await;
        for failure in &report.failures {
            self.bus.notify(Notification::warning(format!(
                "{}; {} changes will be retried",
                failure, report.pending
            )));
        }
        if report.persisted > 0 {
            self.bus.publish(ViewerEvent::Annotation(AnnotationEvent::Persisted {
                image_id: image,
                count: report.persisted,
            }));
        }
        report
    }

    /// The current base image encoded for a remote call.
    pub fn remote_request(&self) -> Option<RemoteRequest> {
        let image = self.image.clone()?;
        let pixels = self.canvas.base_image()?.pixels();
        let mut png = Vec::new();
        if let Err(err) = pixels.write_to(&mut Cursor::new(&mut png), ImageFormat::Png) {
            tracing::error!("Cannot encode {} for remote call: {}", image, err);
            return None;
        }
        Some(RemoteRequest { image, png })
    }

    /// Runs AI detection on the open image and adds the results.
    pub async fn detect(&mut self) -> Result<usize> {
        let request = self.require_request()?;
        let ai = self.ai_service();
        let response = match tokio::time::timeout(self.timeout, ai.detect(&request.png)).await {
            Ok(result) => result,
            Err(_) => Err(RemoteServiceError::Detect {
                reason: self.timed_out(),
            }),
        };
        match response {
            Ok(response) => Ok(self.apply_detections(&request.image, response)),
            Err(err) => Err(self.remote_failure(err)),
        }
    }

    /// Adds detections as labeled rectangles. Returns how many were added;
    /// a response for another image adds nothing.
    pub fn apply_detections(&mut self, origin: &ImageId, response: DetectionResponse) -> usize {
        if !self.is_current(origin) {
            tracing::debug!("Discarding stale detections for {}", origin);
            return 0;
        }

        let color = self.canvas.style().detection_color;
        let mut added = 0;
        for detection in &response.detections {
            let Some(shape) = detection.to_shape(color) else {
                tracing::warn!("Ignoring detection with unusable box {:?}", detection.bounds);
                continue;
            };
            let result = if self.persist_detections {
                self.canvas.add_shape(shape)
            } else {
                self.canvas.insert_persisted(shape)
            };
            match result {
                Ok(_) => added += 1,
                Err(err) => tracing::warn!("Could not add detection: {}", err),
            }
        }

        self.bus
            .publish(ViewerEvent::Annotation(AnnotationEvent::DetectionsApplied {
                image_id: origin.clone(),
                count: added,
            }));
        added
    }

    /// Runs AI enhancement and swaps in the enhanced pixels.
    pub async fn enhance(&mut self) -> Result<bool> {
        let request = self.require_request()?;
        let ai = self.ai_service();
        let response = match tokio::time::timeout(self.timeout, ai.enhance(&request.png)).await {
            Ok(result) => result,
            Err(_) => Err(RemoteServiceError::Enhance {
                reason: self.timed_out(),
            }),
        };
        match response {
            Ok(bytes) => self.apply_enhanced(&request.image, bytes).await,
            Err(err) => Err(self.remote_failure(err)),
        }
    }

    /// Replaces the base image with enhanced pixels and stores them.
    ///
    /// Returns `false` for a response that belongs to another image.
    /// Brightness and contrast go back to neutral; annotations stay.
    pub async fn apply_enhanced(&mut self, origin: &ImageId, bytes: Vec<u8>) -> Result<bool> {
        if !self.is_current(origin) {
            tracing::debug!("Discarding stale enhancement for {}", origin);
            return Ok(false);
        }

        let pixels = match image::load_from_memory(&bytes) {
            Ok(decoded) => decoded.to_rgba8(),
            Err(err) => {
                let err = RemoteServiceError::InvalidImage {
                    reason: err.to_string(),
                };
                return Err(self.remote_failure(err));
            }
        };
        self.canvas.replace_base_image(pixels);

        if let Err(err) = self.gateway.save_image(origin, &bytes).await {
            tracing::warn!("Enhanced image kept locally only: {}", err);
            self.bus
                .notify(Notification::warning(format!("Could not save enhanced image: {}", err)));
        }
        self.bus.publish(ViewerEvent::Image(ImageEvent::Enhanced {
            image_id: origin.clone(),
        }));
        Ok(true)
    }

    fn is_current(&self, origin: &ImageId) -> bool {
        self.image.as_ref() == Some(origin)
    }

    fn require_request(&self) -> Result<RemoteRequest> {
        self.remote_request()
            .ok_or_else(|| Error::other("No image is open"))
    }

    fn timed_out(&self) -> String {
        format!("timed out after {} ms", self.timeout.as_millis())
    }

    fn remote_failure(&self, err: RemoteServiceError) -> Error {
        tracing::warn!("{}", err);
        self.bus.notify(Notification::error(err.to_string()));
        Error::from(err)
    }
}
