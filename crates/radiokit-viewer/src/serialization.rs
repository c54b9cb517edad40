//! Annotation document files.
//!
//! A document is a JSON snapshot of everything drawn on one image: shapes,
//! calibration and the view it was last seen with. Used by the headless
//! renderer and for offline export.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::calibration::Calibration;
use crate::canvas::Canvas;
use crate::model::Shape;
use crate::viewport::ViewState;

/// Document format version
const FILE_FORMAT_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// External id of the annotated image, if known
    #[serde(default)]
    pub image_id: Option<String>,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationDocument {
    pub version: String,
    pub metadata: DocumentMetadata,
    #[serde(default)]
    pub view: Option<ViewState>,
    #[serde(default)]
    pub calibration: Option<Calibration>,
    #[serde(default)]
    pub shapes: Vec<Shape>,
}

impl AnnotationDocument {
    pub fn new(image_id: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            version: FILE_FORMAT_VERSION.to_string(),
            metadata: DocumentMetadata {
                image_id,
                created: now,
                modified: now,
            },
            view: None,
            calibration: None,
            shapes: Vec::new(),
        }
    }

    /// Snapshot of the canvas.
    pub fn from_canvas(canvas: &Canvas, image_id: Option<String>) -> Self {
        let mut document = Self::new(image_id);
        document.view = Some(*canvas.view());
        document.calibration = canvas.calibration().calibration().copied();
        document.shapes = canvas.shapes().list().to_vec();
        document
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize annotations")?;
        std::fs::write(path.as_ref(), json).with_context(|| {
            format!("Failed to write annotation file {}", path.as_ref().display())
        })?;
        Ok(())
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read annotation file {}", path.as_ref().display())
        })?;
        let mut document: AnnotationDocument =
            serde_json::from_str(&content).context("Failed to parse annotation file")?;

        if document.version != FILE_FORMAT_VERSION {
            tracing::warn!(
                "Annotation file version {} differs from {}",
                document.version,
                FILE_FORMAT_VERSION
            );
        }
        if let Some(calibration) = document.calibration {
            let valid = Calibration::new(
                calibration.pixel_length,
                calibration.real_length,
                calibration.unit,
            );
            if valid.is_err() {
                tracing::warn!("Ignoring calibration with zero reference length");
                document.calibration = None;
            }
        }
        document.metadata.modified = Utc::now();
        Ok(document)
    }
}
