//! Event type definitions for the event bus.
//!
//! Events are cloneable and serializable so the surrounding application can
//! log or forward them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::units::ImageId;

/// Root event enum for all viewer events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ViewerEvent {
    /// User-visible, non-blocking notifications
    Notification(Notification),
    /// Base image lifecycle
    Image(ImageEvent),
    /// Annotation persistence
    Annotation(AnnotationEvent),
    /// Calibration changes
    Calibration(CalibrationEvent),
}

impl ViewerEvent {
    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            ViewerEvent::Notification(_) => EventCategory::Notification,
            ViewerEvent::Image(_) => EventCategory::Image,
            ViewerEvent::Annotation(_) => EventCategory::Annotation,
            ViewerEvent::Calibration(_) => EventCategory::Calibration,
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            ViewerEvent::Notification(n) => format!("[{}] {}", n.level, n.message),
            ViewerEvent::Image(e) => e.description(),
            ViewerEvent::Annotation(e) => e.description(),
            ViewerEvent::Calibration(e) => e.description(),
        }
    }
}

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// User notifications.
    Notification,
    /// Image lifecycle events.
    Image,
    /// Annotation persistence events.
    Annotation,
    /// Calibration events.
    Calibration,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::Notification => write!(f, "Notification"),
            EventCategory::Image => write!(f, "Image"),
            EventCategory::Annotation => write!(f, "Annotation"),
            EventCategory::Calibration => write!(f, "Calibration"),
        }
    }
}

/// Severity of a user notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationLevel {
    /// Informational message.
    Info,
    /// Something failed but local state is intact.
    Warning,
    /// An operation failed outright.
    Error,
}

impl std::fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationLevel::Info => write!(f, "info"),
            NotificationLevel::Warning => write!(f, "warning"),
            NotificationLevel::Error => write!(f, "error"),
        }
    }
}

/// A non-blocking message for the user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Severity.
    pub level: NotificationLevel,
    /// Human readable text.
    pub message: String,
    /// When the notification was raised.
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    /// Creates a notification stamped with the current time.
    pub fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    /// Shorthand for a warning notification.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Warning, message)
    }

    /// Shorthand for an error notification.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, message)
    }
}

/// Base image events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ImageEvent {
    /// A new image was opened and its annotations loaded.
    Opened {
        /// The opened image.
        image_id: ImageId,
        /// Number of annotations loaded with it.
        annotations: usize,
    },
    /// The base image was replaced by an enhanced version.
    Enhanced {
        /// The enhanced image.
        image_id: ImageId,
    },
}

impl ImageEvent {
    fn description(&self) -> String {
        match self {
            ImageEvent::Opened {
                image_id,
                annotations,
            } => format!("Opened {} with {} annotations", image_id, annotations),
            ImageEvent::Enhanced { image_id } => format!("Enhanced {}", image_id),
        }
    }
}

/// Annotation persistence events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AnnotationEvent {
    /// Pending commits were written to the store.
    Persisted {
        /// The image the commits belong to.
        image_id: ImageId,
        /// How many commits were written.
        count: usize,
    },
    /// AI detections were added as labeled rectangles.
    DetectionsApplied {
        /// The image the detections belong to.
        image_id: ImageId,
        /// How many rectangles were added.
        count: usize,
    },
}

impl AnnotationEvent {
    fn description(&self) -> String {
        match self {
            AnnotationEvent::Persisted { image_id, count } => {
                format!("Persisted {} changes for {}", count, image_id)
            }
            AnnotationEvent::DetectionsApplied { image_id, count } => {
                format!("Applied {} detections to {}", count, image_id)
            }
        }
    }
}

/// Calibration events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CalibrationEvent {
    /// A calibration was established or replaced.
    Set {
        /// The calibrated image.
        image_id: ImageId,
        /// Reference length in image pixels.
        pixel_length: f64,
        /// Reference length in real units.
        real_length: f64,
    },
}

impl CalibrationEvent {
    fn description(&self) -> String {
        match self {
            CalibrationEvent::Set {
                image_id,
                pixel_length,
                real_length,
            } => format!(
                "Calibrated {}: {:.1} px = {:.1} mm",
                image_id, pixel_length, real_length
            ),
        }
    }
}
