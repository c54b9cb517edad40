//! # RadioKit Core
//!
//! Core types and utilities shared by the RadioKit crates.
//! Provides the error taxonomy, length units, image identity and the
//! notification bus used to surface non-blocking failures to the user.

pub mod error;
pub mod event_bus;
pub mod units;

pub use error::{
    CalibrationError, Error, PersistenceError, RemoteServiceError, Result, ShapeError,
    TransformError,
};

// Re-export event bus for convenience
pub use event_bus::{
    event_bus, EventBus, EventBusConfig, EventCategory, EventFilter, Notification,
    NotificationLevel, SubscriptionId, ViewerEvent,
};

pub use units::{format_length, format_pixels, ImageId, LengthUnit};
