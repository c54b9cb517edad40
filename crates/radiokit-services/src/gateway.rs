//! Persistence gateway.
//!
//! Turns canvas [`Commit`]s into store calls. Commits are written strictly
//! in the order they happened; the first failure stops the flush and
//! everything from the failed commit on stays queued for the next one, so
//! an update is never sent before the create it depends on.

use radiokit_core::{ImageId, PersistenceError};
use radiokit_viewer::{AnnotationShape, Calibration, Commit, Shape, ShapeId};
use std::collections::{HashMap, HashSet, VecDeque};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::store::AnnotationStore;
use crate::wire::{AnnotationRecord, CalibrationRecord};

/// Stored state of one image, ready for the canvas.
#[derive(Debug, Clone, Default)]
pub struct LoadedImage {
    pub shapes: Vec<Shape>,
    pub calibration: Option<Calibration>,
    /// Records that could not be mapped to shapes
    pub skipped: usize,
}

/// Outcome of one flush.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlushReport {
    pub persisted: usize,
    pub failures: Vec<PersistenceError>,
    /// Commits still queued for retry
    pub pending: usize,
}

impl FlushReport {
    pub fn is_complete(&self) -> bool {
        self.pending == 0
    }
}

#[derive(Debug, Clone)]
struct PendingCommit {
    image: ImageId,
    commit: Commit,
}

#[derive(Debug, Clone)]
struct RemoteShape {
    image: ImageId,
    id: String,
}

pub struct PersistenceGateway {
    store: Arc<dyn AnnotationStore>,
    timeout: Duration,
    backlog: VecDeque<PendingCommit>,
    /// Store ids of shapes known to exist remotely, with their image
    remote_ids: HashMap<ShapeId, RemoteShape>,
}

impl PersistenceGateway {
    pub fn new(store: Arc<dyn AnnotationStore>, timeout: Duration) -> Self {
        Self {
            store,
            timeout,
            backlog: VecDeque::new(),
            remote_ids: HashMap::new(),
        }
    }

    pub fn pending(&self) -> usize {
        self.backlog.len()
    }

    pub fn remote_id(&self, id: ShapeId) -> Option<&str> {
        self.remote_ids.get(&id).map(|remote| remote.id.as_str())
    }

    /// Number of shapes whose store id is known.
    pub fn tracked_shapes(&self) -> usize {
        self.remote_ids.len()
    }

    /// Forgets the store ids of `image`, except for shapes that queued
    /// commits still refer to.
    fn forget_image(&mut self, image: &ImageId) {
        let queued: HashSet<ShapeId> = self
            .backlog
            .iter()
            .filter(|pending| &pending.image == image)
            .filter_map(|pending| commit_shape(&pending.commit))
            .collect();
        self.remote_ids
            .retain(|id, remote| &remote.image != image || queued.contains(id));
    }

    /// Loads the stored annotations and calibration of `image`.
    ///
    /// Records that fail to map are skipped with a warning; an unusable
    /// calibration is treated as absent.
    pub async fn load(&mut self, image: &ImageId) -> Result<LoadedImage, PersistenceError> {
        let store = Arc::clone(&self.store);
        let calibration = self
            .call("load calibration", image, store.load_calibration(image))
            .await?;
        let records = self
            .call("load annotations", image, store.load_annotations(image))
            .await?;

        let mut loaded = LoadedImage {
            calibration: calibration.and_then(|record| match record.to_calibration() {
                Ok(calibration) => Some(calibration),
                Err(err) => {
                    tracing::warn!("Ignoring stored calibration of {}: {}", image, err);
                    None
                }
            }),
            ..LoadedImage::default()
        };

        // Reloading hands out fresh local ids, so the old mapping is stale.
        self.forget_image(image);
        for record in records {
            match record.to_shape() {
                Ok(shape) => {
                    if let Some(remote) = record.id {
                        self.track(image, shape.id(), remote);
                    }
                    loaded.shapes.push(shape);
                }
                Err(err) => {
                    tracing::warn!("Skipping annotation {:?} of {}: {}", record.id, image, err);
                    loaded.skipped += 1;
                }
            }
        }

        tracing::info!(
            "Loaded {} annotations for {} ({} skipped, calibrated: {})",
            loaded.shapes.len(),
            image,
            loaded.skipped,
            loaded.calibration.is_some()
        );
        Ok(loaded)
    }

    /// Queues `commits` for `image` and writes the backlog in order.
    pub async fn flush(&mut self, image: &ImageId, commits: Vec<Commit>) -> FlushReport {
        self.backlog.extend(commits.into_iter().map(|commit| PendingCommit {
            image: image.clone(),
            commit,
        }));

        let mut report = FlushReport::default();
        while let Some(pending) = self.backlog.pop_front() {
            match self.persist(&pending).await {
                Ok(()) => report.persisted += 1,
                Err(err) => {
                    tracing::warn!("Persisting {} failed: {}", pending.commit.describe(), err);
                    report.failures.push(err);
                    self.backlog.push_front(pending);
                    break;
                }
            }
        }

        report.pending = self.backlog.len();
        if report.pending > 0 {
            tracing::debug!("{} commits queued for retry", report.pending);
        }
        report
    }

    pub async fn save_image(&self, image: &ImageId, bytes: &[u8]) -> Result<(), PersistenceError> {
        let store = Arc::clone(&self.store);
        self.call("save image", image, store.save_image(image, bytes)).await
    }

    async fn persist(&mut self, pending: &PendingCommit) -> Result<(), PersistenceError> {
        let store = Arc::clone(&self.store);
        let image = &pending.image;

        match &pending.commit {
            Commit::Created(shape) => self.create(image, shape).await,
            Commit::Updated(shape) => match self.remote_id(shape.id()).map(str::to_string) {
                Some(remote) => {
                    let record = AnnotationRecord::from_shape(shape);
                    self.call(
                        "update annotation",
                        image,
                        store.update_annotation(image, &remote, &record),
                    )
                    .await
                }
                None => {
                    tracing::debug!("Shape {} was never stored; creating it", shape.id());
                    self.create(image, shape).await
                }
            },
            Commit::Deleted(id) => match self.remote_id(*id).map(str::to_string) {
                Some(remote) => {
                    self.call("delete annotation", image, store.delete_annotation(image, &remote))
                        .await?;
                    self.remote_ids.remove(id);
                    Ok(())
                }
                None => {
                    tracing::debug!("Shape {} was never stored; nothing to delete", id);
                    Ok(())
                }
            },
            Commit::Calibrated(calibration) => {
                let record = CalibrationRecord::from_calibration(calibration);
                self.call("save calibration", image, store.save_calibration(image, &record))
                    .await
            }
        }
    }

    async fn create(&mut self, image: &ImageId, shape: &Shape) -> Result<(), PersistenceError> {
        let store = Arc::clone(&self.store);
        let record = AnnotationRecord::from_shape(shape);
        let created = self
            .call("create annotation", image, store.create_annotation(image, &record))
            .await?;
        match created.id {
            Some(remote) => self.track(image, shape.id(), remote),
            None => tracing::warn!(
                "Store returned no id for {} {}",
                shape.shape_type(),
                shape.id()
            ),
        }
        Ok(())
    }

    fn track(&mut self, image: &ImageId, shape: ShapeId, remote: String) {
        self.remote_ids.insert(
            shape,
            RemoteShape {
                image: image.clone(),
                id: remote,
            },
        );
    }

    async fn call<T>(
        &self,
        operation: &str,
        image: &ImageId,
        request: impl Future<Output = Result<T, PersistenceError>>,
    ) -> Result<T, PersistenceError> {
        match tokio::time::timeout(self.timeout, request).await {
            Ok(result) => result,
            Err(_) => Err(PersistenceError::Failed {
                operation: operation.to_string(),
                image_id: image.to_string(),
                reason: format!("timed out after {} ms", self.timeout.as_millis()),
            }),
        }
    }
}

fn commit_shape(commit: &Commit) -> Option<ShapeId> {
    match commit {
        Commit::Created(shape) | Commit::Updated(shape) => Some(shape.id()),
        Commit::Deleted(id) => Some(*id),
        Commit::Calibrated(_) => None,
    }
}
