//! Unit handling for measurements
//!
//! Calibrated lengths are expressed in millimeters. Uncalibrated lengths
//! stay in image pixels and are always labelled as such.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Real-world length unit produced by calibration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum LengthUnit {
    /// Millimeters
    #[default]
    #[serde(rename = "mm")]
    Millimeter,
}

impl LengthUnit {
    /// Short symbol used in labels and on the wire
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Millimeter => "mm",
        }
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for LengthUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mm" | "millimeter" | "millimeters" => Ok(Self::Millimeter),
            _ => Err(format!("Unknown length unit: {}", s)),
        }
    }
}

/// Format a calibrated length for display, e.g. `30.0 mm`
pub fn format_length(value: f64, unit: LengthUnit) -> String {
    format!("{:.1} {}", value, unit)
}

/// Format an uncalibrated pixel length for display, e.g. `200 px`
pub fn format_pixels(pixels: f64) -> String {
    format!("{:.0} px", pixels)
}

/// Identity of the image currently open in a viewer session.
///
/// Assigned by the surrounding application; used to discard responses that
/// arrive after the user navigated to another image.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageId(String);

impl ImageId {
    /// Creates an image id from the external record id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ImageId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
