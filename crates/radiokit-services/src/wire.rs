//! Wire records exchanged with the annotation store and the AI service.
//!
//! Field names are camelCase and annotation types are uppercase tags, as
//! the remote endpoints expect. Every shape kind maps to exactly one
//! record layout:
//!
//! | type          | points                 | size      | extra          |
//! |---------------|------------------------|-----------|----------------|
//! | `RECTANGLE`   | two opposite corners   | unused    |                |
//! | `DETECTION`   | two opposite corners   | unused    | `label`        |
//! | `CIRCLE`      | center, point on rim   | unused    |                |
//! | `FREEHAND`    | every sample           | pen width |                |
//! | `TEXT`        | baseline origin        | scale     | `text`         |
//! | `MEASUREMENT` | start, end             | unused    | `measurement`  |

use radiokit_core::{LengthUnit, PersistenceError};
use radiokit_viewer::{
    Calibration, CircleShape, Color, FreehandShape, MeasurementMark, Point, RectangleShape, Shape,
    TextShape,
};
use serde::{Deserialize, Serialize};

/// Persisted calibration of one image.
///
/// The store keeps a width and a height reference; the viewer calibrates
/// with a single length and writes it to both.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationRecord {
    pub pixel_width: f64,
    pub pixel_height: f64,
    pub real_width: f64,
    pub real_height: f64,
    #[serde(default)]
    pub unit: LengthUnit,
}

impl CalibrationRecord {
    pub fn from_calibration(calibration: &Calibration) -> Self {
        Self {
            pixel_width: calibration.pixel_length,
            pixel_height: calibration.pixel_length,
            real_width: calibration.real_length,
            real_height: calibration.real_length,
            unit: calibration.unit,
        }
    }

    /// The width reference, or the height reference when no width was
    /// recorded.
    pub fn to_calibration(&self) -> Result<Calibration, PersistenceError> {
        let (pixels, real) = if self.pixel_width > 0.0 {
            (self.pixel_width, self.real_width)
        } else {
            (self.pixel_height, self.real_height)
        };
        Calibration::new(pixels, real, self.unit).map_err(|err| PersistenceError::InvalidRecord {
            reason: err.to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AnnotationKind {
    Rectangle,
    Circle,
    Freehand,
    Text,
    Measurement,
    /// Labeled rectangle produced by AI detection
    Detection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationRecord {
    /// Store-assigned id; absent until created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: AnnotationKind,
    pub points: Vec<Point>,
    pub color: Color,
    #[serde(default)]
    pub size: f64,
    /// Real length of a calibrated measurement
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measurement: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl AnnotationRecord {
    fn new(kind: AnnotationKind, points: Vec<Point>, color: Color) -> Self {
        Self {
            id: None,
            kind,
            points,
            color,
            size: 0.0,
            measurement: None,
            text: None,
            label: None,
        }
    }

    pub fn from_shape(shape: &Shape) -> Self {
        match shape {
            Shape::Rectangle(rect) => {
                let kind = if rect.label.is_some() {
                    AnnotationKind::Detection
                } else {
                    AnnotationKind::Rectangle
                };
                let corners = vec![
                    Point::new(rect.x, rect.y),
                    Point::new(rect.x + rect.width, rect.y + rect.height),
                ];
                Self {
                    label: rect.label.clone(),
                    ..Self::new(kind, corners, rect.color)
                }
            }
            Shape::Circle(circle) => {
                let rim = Point::new(circle.x + circle.radius, circle.y);
                Self::new(AnnotationKind::Circle, vec![circle.center(), rim], circle.color)
            }
            Shape::Freehand(path) => Self {
                size: path.pen_width,
                ..Self::new(AnnotationKind::Freehand, path.points.clone(), path.color)
            },
            Shape::Text(text) => Self {
                size: text.scale,
                text: Some(text.text.clone()),
                ..Self::new(AnnotationKind::Text, vec![text.origin()], text.color)
            },
            Shape::Measurement(mark) => Self {
                measurement: mark.real_length,
                ..Self::new(AnnotationKind::Measurement, vec![mark.start, mark.end], mark.color)
            },
        }
    }

    /// Rebuilds the shape with a fresh local id.
    pub fn to_shape(&self) -> Result<Shape, PersistenceError> {
        if let Some(p) = self.points.iter().find(|p| !p.is_finite()) {
            return Err(invalid(format!("non-finite point ({}, {})", p.x, p.y)));
        }

        let shape = match self.kind {
            AnnotationKind::Rectangle | AnnotationKind::Detection => {
                let [a, b] = self.two_points()?;
                let rect = RectangleShape::from_corners(a, b, self.color);
                match &self.label {
                    Some(label) => Shape::Rectangle(rect.with_label(label.clone())),
                    None => Shape::Rectangle(rect),
                }
            }
            AnnotationKind::Circle => {
                let [center, rim] = self.two_points()?;
                Shape::Circle(CircleShape::from_drag(center, rim, self.color))
            }
            AnnotationKind::Freehand => {
                let Some((first, rest)) = self.points.split_first() else {
                    return Err(invalid("freehand path without points"));
                };
                if !is_positive(self.size) {
                    return Err(invalid(format!("pen width {}", self.size)));
                }
                let mut path = FreehandShape::new(*first, self.color, self.size);
                rest.iter().for_each(|p| path.push(*p));
                Shape::Freehand(path)
            }
            AnnotationKind::Text => {
                let [origin] = self.points.as_slice() else {
                    return Err(invalid(format!("text needs 1 point, got {}", self.points.len())));
                };
                let text = self.text.as_deref().unwrap_or_default();
                if text.trim().is_empty() {
                    return Err(invalid("text annotation without text"));
                }
                if !is_positive(self.size) {
                    return Err(invalid(format!("text scale {}", self.size)));
                }
                Shape::Text(TextShape::new(text, *origin, self.color, self.size))
            }
            AnnotationKind::Measurement => {
                let [start, end] = self.two_points()?;
                Shape::Measurement(MeasurementMark::new(start, end, self.measurement, self.color))
            }
        };
        Ok(shape)
    }

    fn two_points(&self) -> Result<[Point; 2], PersistenceError> {
        match self.points.as_slice() {
            [a, b] => Ok([*a, *b]),
            points => Err(invalid(format!(
                "{:?} needs 2 points, got {}",
                self.kind,
                points.len()
            ))),
        }
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn invalid(reason: impl Into<String>) -> PersistenceError {
    PersistenceError::InvalidRecord {
        reason: reason.into(),
    }
}

/// One object found by AI detection, in image pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// `[x0, y0, x1, y1]`
    #[serde(rename = "box")]
    pub bounds: [f64; 4],
    pub label: String,
    #[serde(default)]
    pub score: f64,
}

impl Detection {
    /// Label shown on the rectangle, e.g. `nodule 91%`.
    pub fn caption(&self) -> String {
        format!("{} {:.0}%", self.label, self.score * 100.0)
    }

    /// The labeled rectangle for this detection, if its box is usable.
    pub fn to_shape(&self, color: Color) -> Option<Shape> {
        let [x0, y0, x1, y1] = self.bounds;
        if !self.bounds.iter().all(|v| v.is_finite()) {
            return None;
        }
        let rect = RectangleShape::from_corners(Point::new(x0, y0), Point::new(x1, y1), color)
            .with_label(self.caption());
        Some(Shape::Rectangle(rect))
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DetectionResponse {
    #[serde(default)]
    pub detections: Vec<Detection>,
}
