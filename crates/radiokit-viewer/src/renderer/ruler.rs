//! Tick layout for the live measurement ruler.

use radiokit_core::{format_length, format_pixels};

use crate::calibration::CalibrationModel;
use crate::model::Point;
use crate::style::{CanvasStyle, RulerStyle};
use crate::tools::MeasureKind;

/// Upper bound on ticks drawn for one ruler.
const MAX_TICKS: usize = 2_000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    pub from: Point,
    pub to: Point,
    pub major: bool,
}

/// Ticks along `start → end` in image space, perpendicular to the line.
///
/// The first tick sits on `start` and is major.
pub fn ruler_ticks(start: Point, end: Point, style: &RulerStyle) -> Vec<Tick> {
    let length = start.distance_to(&end);
    if length <= f64::EPSILON || style.tick_interval <= 0.0 {
        return Vec::new();
    }

    let dir = Point::new((end.x - start.x) / length, (end.y - start.y) / length);
    let normal = Point::new(-dir.y, dir.x);
    let count = ((length / style.tick_interval).floor() as usize + 1).min(MAX_TICKS);
    let major_every = style.major_tick_every.max(1) as usize;

    (0..count)
        .map(|i| {
            let along = i as f64 * style.tick_interval;
            let at = Point::new(start.x + dir.x * along, start.y + dir.y * along);
            let major = i % major_every == 0;
            let half = if major {
                style.major_tick_length
            } else {
                style.minor_tick_length
            } / 2.0;
            Tick {
                from: Point::new(at.x - normal.x * half, at.y - normal.y * half),
                to: Point::new(at.x + normal.x * half, at.y + normal.y * half),
                major,
            }
        })
        .collect()
}

/// Text shown at the pointer end of the live ruler.
///
/// Distances read in real units once calibrated. A calibration in progress
/// shows the reference it will be set to, plus the current reading when a
/// calibration already exists.
pub fn ruler_label(
    kind: MeasureKind,
    pixels: f64,
    calibration: &CalibrationModel,
    style: &CanvasStyle,
) -> String {
    match kind {
        MeasureKind::Distance => calibration.format_length(pixels),
        MeasureKind::Calibration => {
            let reference = format_length(style.reference_length, style.unit);
            if calibration.is_calibrated() {
                format!(
                    "{} ({}) = {}",
                    calibration.format_length(pixels),
                    format_pixels(pixels),
                    reference
                )
            } else {
                format!("{} = {}", format_pixels(pixels), reference)
            }
        }
    }
}
