//! Pixel to real-world length calibration.
//!
//! A calibration is taken by measuring a reference of known size on the
//! image: the first click records a pending start point, the second click
//! completes the reference. Every calibrated length is a linear scaling of
//! a pixel length by `real_length / pixel_length` of that reference.

use radiokit_core::{format_length, format_pixels, CalibrationError, LengthUnit};
use serde::{Deserialize, Serialize};

use crate::model::Point;

/// An established pixel/real-length ratio for one image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    /// Measured length of the reference in image pixels, always > 0
    pub pixel_length: f64,
    /// Known real length of the reference
    pub real_length: f64,
    pub unit: LengthUnit,
}

impl Calibration {
    pub fn new(
        pixel_length: f64,
        real_length: f64,
        unit: LengthUnit,
    ) -> Result<Self, CalibrationError> {
        if !pixel_length.is_finite() || pixel_length <= 0.0 {
            return Err(CalibrationError::DegenerateReference);
        }
        Ok(Self {
            pixel_length,
            real_length,
            unit,
        })
    }

    /// Real length per image pixel.
    pub fn ratio(&self) -> f64 {
        self.real_length / self.pixel_length
    }

    pub fn to_real_length(&self, pixels: f64) -> f64 {
        pixels * self.ratio()
    }
}

/// A reference measurement that produced a calibration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletedCalibration {
    pub calibration: Calibration,
    pub start: Point,
    pub end: Point,
}

/// Calibration state of the open image.
#[derive(Debug, Clone, Default)]
pub struct CalibrationModel {
    pending_start: Option<Point>,
    calibration: Option<Calibration>,
}

impl CalibrationModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calibration(&self) -> Option<&Calibration> {
        self.calibration.as_ref()
    }

    pub fn is_calibrated(&self) -> bool {
        self.calibration.is_some()
    }

    pub fn pending_start(&self) -> Option<Point> {
        self.pending_start
    }

    /// Records the first reference point.
    ///
    /// Returns `false` and keeps the existing start if one is pending.
    pub fn begin_calibration(&mut self, point: Point) -> bool {
        if self.pending_start.is_some() {
            return false;
        }
        self.pending_start = Some(point);
        true
    }

    /// Completes the reference at `point`, replacing any previous
    /// calibration.
    ///
    /// The pending start is consumed even when the reference is rejected, so
    /// a zero-length reference leaves the previous calibration in place and
    /// the next click starts over.
    pub fn complete_calibration(
        &mut self,
        point: Point,
        real_length: f64,
        unit: LengthUnit,
    ) -> Result<CompletedCalibration, CalibrationError> {
        let start = self.pending_start.take().ok_or(CalibrationError::NotStarted)?;
        let calibration = Calibration::new(start.distance_to(&point), real_length, unit)?;

        tracing::info!(
            "Calibrated: {:.1} px = {}",
            calibration.pixel_length,
            format_length(real_length, unit)
        );
        self.calibration = Some(calibration);
        Ok(CompletedCalibration {
            calibration,
            start,
            end: point,
        })
    }

    /// Drops a pending start point without touching the current calibration.
    pub fn cancel_calibration(&mut self) -> Option<Point> {
        self.pending_start.take()
    }

    /// Installs a calibration loaded from storage.
    pub fn set_calibration(&mut self, calibration: Option<Calibration>) {
        self.calibration = calibration;
    }

    /// Forgets everything, e.g. when another image is opened.
    pub fn clear(&mut self) {
        self.pending_start = None;
        self.calibration = None;
    }

    pub fn to_real_length(&self, pixels: f64) -> Result<f64, CalibrationError> {
        self.calibration
            .map(|calibration| calibration.to_real_length(pixels))
            .ok_or(CalibrationError::Uncalibrated)
    }

    /// `30.0 mm` when calibrated, `200 px` otherwise.
    pub fn format_length(&self, pixels: f64) -> String {
        match self.calibration {
            Some(calibration) => {
                format_length(calibration.to_real_length(pixels), calibration.unit)
            }
            None => format_pixels(pixels),
        }
    }
}
