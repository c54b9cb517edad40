//! Annotation and calibration storage collaborator.

use async_trait::async_trait;
use parking_lot::Mutex;
use radiokit_core::{ImageId, PersistenceError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::wire::{AnnotationRecord, CalibrationRecord};

/// External store for per-image annotations, calibration and enhanced
/// images.
///
/// Every call is fallible; callers keep their local state when a call
/// fails.
#[async_trait]
pub trait AnnotationStore: Send + Sync {
    /// `None` when the image was never calibrated.
    async fn load_calibration(
        &self,
        image: &ImageId,
    ) -> Result<Option<CalibrationRecord>, PersistenceError>;

    async fn save_calibration(
        &self,
        image: &ImageId,
        record: &CalibrationRecord,
    ) -> Result<(), PersistenceError>;

    async fn load_annotations(
        &self,
        image: &ImageId,
    ) -> Result<Vec<AnnotationRecord>, PersistenceError>;

    /// Stores a new annotation and returns it with its store id.
    async fn create_annotation(
        &self,
        image: &ImageId,
        record: &AnnotationRecord,
    ) -> Result<AnnotationRecord, PersistenceError>;

    async fn update_annotation(
        &self,
        image: &ImageId,
        id: &str,
        record: &AnnotationRecord,
    ) -> Result<(), PersistenceError>;

    async fn delete_annotation(&self, image: &ImageId, id: &str) -> Result<(), PersistenceError>;

    /// Replaces the stored pixels of the image, e.g. after enhancement.
    async fn save_image(&self, image: &ImageId, bytes: &[u8]) -> Result<(), PersistenceError>;
}

#[derive(Default)]
struct StoreState {
    calibrations: HashMap<ImageId, CalibrationRecord>,
    annotations: HashMap<ImageId, Vec<AnnotationRecord>>,
    images: HashMap<ImageId, Vec<u8>>,
    calls: Vec<String>,
}

/// Process-local store, used headless and in tests.
///
/// Can be switched into a failing mode and given an artificial latency to
/// exercise retry and timeout paths.
#[derive(Default)]
pub struct InMemoryAnnotationStore {
    state: Mutex<StoreState>,
    failing: AtomicBool,
    latency: Mutex<Option<Duration>>,
}

impl InMemoryAnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following call fail until switched back.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.lock() = latency;
    }

    /// Seeds an image with stored records, assigning ids where missing.
    pub fn insert_annotations(&self, image: &ImageId, records: Vec<AnnotationRecord>) {
        let mut state = self.state.lock();
        let stored = state.annotations.entry(image.clone()).or_default();
        for mut record in records {
            record.id.get_or_insert_with(new_record_id);
            stored.push(record);
        }
    }

    pub fn insert_calibration(&self, image: &ImageId, record: CalibrationRecord) {
        self.state.lock().calibrations.insert(image.clone(), record);
    }

    pub fn annotations(&self, image: &ImageId) -> Vec<AnnotationRecord> {
        self.state
            .lock()
            .annotations
            .get(image)
            .cloned()
            .unwrap_or_default()
    }

    pub fn calibration(&self, image: &ImageId) -> Option<CalibrationRecord> {
        self.state.lock().calibrations.get(image).copied()
    }

    pub fn image_bytes(&self, image: &ImageId) -> Option<Vec<u8>> {
        self.state.lock().images.get(image).cloned()
    }

    /// Operations attempted so far, as `operation image`.
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().calls.clone()
    }

    async fn begin(&self, operation: &str, image: &ImageId) -> Result<(), PersistenceError> {
        self.state.lock().calls.push(format!("{} {}", operation, image));

        let latency = *self.latency.lock();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(PersistenceError::Failed {
                operation: operation.to_string(),
                image_id: image.to_string(),
                reason: "store unavailable".to_string(),
            });
        }
        Ok(())
    }
}

fn new_record_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn missing(operation: &str, image: &ImageId, id: &str) -> PersistenceError {
    PersistenceError::Failed {
        operation: operation.to_string(),
        image_id: image.to_string(),
        reason: format!("no annotation {}", id),
    }
}

#[async_trait]
impl AnnotationStore for InMemoryAnnotationStore {
    async fn load_calibration(
        &self,
        image: &ImageId,
    ) -> Result<Option<CalibrationRecord>, PersistenceError> {
        self.begin("load calibration", image).await?;
        Ok(self.calibration(image))
    }

    async fn save_calibration(
        &self,
        image: &ImageId,
        record: &CalibrationRecord,
    ) -> Result<(), PersistenceError> {
        self.begin("save calibration", image).await?;
        self.insert_calibration(image, *record);
        Ok(())
    }

    async fn load_annotations(
        &self,
        image: &ImageId,
    ) -> Result<Vec<AnnotationRecord>, PersistenceError> {
        self.begin("load annotations", image).await?;
        Ok(self.annotations(image))
    }

    async fn create_annotation(
        &self,
        image: &ImageId,
        record: &AnnotationRecord,
    ) -> Result<AnnotationRecord, PersistenceError> {
        self.begin("create annotation", image).await?;
        let mut created = record.clone();
        created.id = Some(new_record_id());
        self.state
            .lock()
            .annotations
            .entry(image.clone())
            .or_default()
            .push(created.clone());
        Ok(created)
    }

    async fn update_annotation(
        &self,
        image: &ImageId,
        id: &str,
        record: &AnnotationRecord,
    ) -> Result<(), PersistenceError> {
        const OPERATION: &str = "update annotation";
        self.begin(OPERATION, image).await?;
        let mut state = self.state.lock();
        let stored = state
            .annotations
            .get_mut(image)
            .and_then(|records| records.iter_mut().find(|r| r.id.as_deref() == Some(id)))
            .ok_or_else(|| missing(OPERATION, image, id))?;
        *stored = AnnotationRecord {
            id: Some(id.to_string()),
            ..record.clone()
        };
        Ok(())
    }

    async fn delete_annotation(&self, image: &ImageId, id: &str) -> Result<(), PersistenceError> {
        const OPERATION: &str = "delete annotation";
        self.begin(OPERATION, image).await?;
        let mut state = self.state.lock();
        let records = state
            .annotations
            .get_mut(image)
            .ok_or_else(|| missing(OPERATION, image, id))?;
        let before = records.len();
        records.retain(|r| r.id.as_deref() != Some(id));
        if records.len() == before {
            return Err(missing(OPERATION, image, id));
        }
        Ok(())
    }

    async fn save_image(&self, image: &ImageId, bytes: &[u8]) -> Result<(), PersistenceError> {
        self.begin("save image", image).await?;
        self.state.lock().images.insert(image.clone(), bytes.to_vec());
        Ok(())
    }
}
