//! Canvas type definitions: Commit, BaseImage.

use image::RgbaImage;

use crate::calibration::Calibration;
use crate::model::{AnnotationShape, Shape, ShapeId};

/// A finished mutation, queued for persistence.
#[derive(Debug, Clone, PartialEq)]
pub enum Commit {
    Created(Shape),
    Updated(Shape),
    Deleted(ShapeId),
    Calibrated(Calibration),
}

impl Commit {
    pub fn describe(&self) -> String {
        match self {
            Commit::Created(shape) => format!("create {} {}", shape.shape_type(), shape.id()),
            Commit::Updated(shape) => format!("update {} {}", shape.shape_type(), shape.id()),
            Commit::Deleted(id) => format!("delete {}", id),
            Commit::Calibrated(c) => {
                format!("calibrate {:.1} px = {} {}", c.pixel_length, c.real_length, c.unit)
            }
        }
    }
}

/// The displayed radiograph.
///
/// `generation` changes whenever the pixels are replaced, so cached
/// derivatives can tell a new image from a re-render of the same one.
#[derive(Debug, Clone)]
pub struct BaseImage {
    pixels: RgbaImage,
    generation: u64,
}

impl BaseImage {
    pub fn new(pixels: RgbaImage, generation: u64) -> Self {
        Self { pixels, generation }
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}
