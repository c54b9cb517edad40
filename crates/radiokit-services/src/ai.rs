//! AI detection and enhancement collaborator.

use async_trait::async_trait;
use radiokit_core::RemoteServiceError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::wire::{Detection, DetectionResponse};

/// Remote image analysis. Both calls take the encoded base image.
#[async_trait]
pub trait AiService: Send + Sync {
    async fn detect(&self, image: &[u8]) -> Result<DetectionResponse, RemoteServiceError>;

    /// Returns the encoded enhanced image.
    async fn enhance(&self, image: &[u8]) -> Result<Vec<u8>, RemoteServiceError>;
}

/// Canned responses for headless use and tests.
#[derive(Default)]
pub struct StaticAiService {
    detections: Vec<Detection>,
    enhanced: Option<Vec<u8>>,
    latency: Option<Duration>,
    failing: AtomicBool,
}

impl StaticAiService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_detections(mut self, detections: Vec<Detection>) -> Self {
        self.detections = detections;
        self
    }

    /// Bytes returned by `enhance`; without them the input is echoed back.
    pub fn with_enhanced(mut self, bytes: Vec<u8>) -> Self {
        self.enhanced = Some(bytes);
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    async fn wait(&self) -> bool {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.failing.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AiService for StaticAiService {
    async fn detect(&self, image: &[u8]) -> Result<DetectionResponse, RemoteServiceError> {
        if self.wait().await {
            return Err(RemoteServiceError::Detect {
                reason: "service unavailable".to_string(),
            });
        }
        tracing::debug!("Static detection for {} byte image", image.len());
        Ok(DetectionResponse {
            detections: self.detections.clone(),
        })
    }

    async fn enhance(&self, image: &[u8]) -> Result<Vec<u8>, RemoteServiceError> {
        if self.wait().await {
            return Err(RemoteServiceError::Enhance {
                reason: "service unavailable".to_string(),
            });
        }
        Ok(self.enhanced.clone().unwrap_or_else(|| image.to_vec()))
    }
}
