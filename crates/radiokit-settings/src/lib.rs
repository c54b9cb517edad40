//! RadioKit Settings Crate
//!
//! Handles viewer configuration: loading, saving and validation of the
//! settings file. Supports JSON and TOML stored in the platform config
//! directory.

pub mod config;
pub mod error;

pub use config::{
    AnnotationSettings, CalibrationSettings, Config, RulerSettings, ServiceSettings,
    ViewerSettings,
};
pub use error::{SettingsError, SettingsResult};
