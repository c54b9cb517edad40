//! Error handling for RadioKit
//!
//! Provides error types for all layers of the viewer:
//! - Calibration errors (missing or unusable reference measurement)
//! - Transform errors (view transform cannot be inverted)
//! - Shape errors (shape store integrity)
//! - Persistence errors (annotation/calibration/image storage)
//! - Remote service errors (AI detection and enhancement)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Calibration error type
///
/// Raised by the calibration model when a real-world length is requested
/// or a calibration is completed in an invalid state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalibrationError {
    /// No calibration has been established for the current image
    #[error("Image is not calibrated; lengths are only available in pixels")]
    Uncalibrated,

    /// A calibration was completed without a pending start point
    #[error("No calibration measurement in progress")]
    NotStarted,

    /// The reference measurement has no usable length
    #[error("Calibration reference has zero pixel length")]
    DegenerateReference,
}

/// Transform error type
///
/// A view transform that cannot be inverted is a programming defect,
/// not a recoverable runtime condition.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    /// Forward and inverse transforms disagree or cannot be computed
    #[error("View transform cannot be inverted: {reason}")]
    Inversion {
        /// What made the transform non-invertible.
        reason: String,
    },
}

/// Shape store error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShapeError {
    /// No shape with the given id exists
    #[error("Shape {id} not found")]
    NotFound {
        /// The missing shape id.
        id: String,
    },

    /// A shape id was inserted twice
    #[error("Shape id {id} already present")]
    DuplicateId {
        /// The colliding shape id.
        id: String,
    },

    /// A patch does not apply to the shape kind
    #[error("Patch {patch} does not apply to {kind} shapes")]
    PatchMismatch {
        /// The patch that was rejected.
        patch: String,
        /// The shape kind it was applied to.
        kind: String,
    },
}

/// Persistence error type
///
/// Any external save or load call that fails. Local in-memory state is
/// never rolled back because of one of these.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PersistenceError {
    /// The external store rejected or failed the call
    #[error("Failed to {operation} for image {image_id}: {reason}")]
    Failed {
        /// The operation being attempted.
        operation: String,
        /// The image the call was made for.
        image_id: String,
        /// The reason reported by the store.
        reason: String,
    },

    /// A record could not be mapped to or from the wire format
    #[error("Invalid annotation record: {reason}")]
    InvalidRecord {
        /// Why the record was rejected.
        reason: String,
    },
}

/// Remote service error type
///
/// Failures of the AI detect/enhance collaborators. The canvas is left
/// unchanged when one of these occurs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RemoteServiceError {
    /// Object detection call failed
    #[error("AI detection failed: {reason}")]
    Detect {
        /// The reason reported by the service.
        reason: String,
    },

    /// Enhancement call failed
    #[error("AI enhancement failed: {reason}")]
    Enhance {
        /// The reason reported by the service.
        reason: String,
    },

    /// The returned image could not be decoded
    #[error("Service returned an unreadable image: {reason}")]
    InvalidImage {
        /// The decoder error.
        reason: String,
    },
}

/// Main error type for RadioKit
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Calibration error
    #[error(transparent)]
    Calibration(#[from] CalibrationError),

    /// Transform error
    #[error(transparent)]
    Transform(#[from] TransformError),

    /// Shape store error
    #[error(transparent)]
    Shape(#[from] ShapeError),

    /// Persistence error
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// Remote service error
    #[error(transparent)]
    RemoteService(#[from] RemoteServiceError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is the uncalibrated guard
    pub fn is_uncalibrated(&self) -> bool {
        matches!(self, Error::Calibration(CalibrationError::Uncalibrated))
    }

    /// Check if this is an engine defect worth crash-reporting
    pub fn is_defect(&self) -> bool {
        matches!(self, Error::Transform(_))
    }

    /// Check if this is a persistence error
    pub fn is_persistence_error(&self) -> bool {
        matches!(self, Error::Persistence(_))
    }

    /// Check if this is a remote service error
    pub fn is_remote_service_error(&self) -> bool {
        matches!(self, Error::RemoteService(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
