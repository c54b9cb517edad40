use radiokit_core::CalibrationError;

use super::{InteractionState, PointerEvent, Tool, ToolContext, ToolKind};
use crate::canvas::Commit;
use crate::model::{MeasurementMark, Point, Shape};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasureKind {
    /// Reference measurement that sets the calibration
    Calibration,
    /// Plain distance measurement
    Distance,
}

/// Two-click measuring tool.
///
/// The first click fixes the start point; a ruler follows the pointer until
/// the second click completes the measurement.
pub struct MeasureTool {
    pub kind: MeasureKind,
}

impl MeasureTool {
    fn start(&self, p: Point, ctx: &mut ToolContext<'_>) -> InteractionState {
        let start = match self.kind {
            MeasureKind::Calibration => {
                if !ctx.calibration.begin_calibration(p) {
                    tracing::debug!("Calibration already pending; keeping its start point");
                }
                ctx.calibration.pending_start().unwrap_or(p)
            }
            MeasureKind::Distance => p,
        };
        InteractionState::Measuring {
            kind: self.kind,
            start,
            current: p,
        }
    }

    fn complete(&self, start: Point, end: Point, ctx: &mut ToolContext<'_>) {
        match self.kind {
            MeasureKind::Calibration => {
                let completed = ctx.calibration.complete_calibration(
                    end,
                    ctx.style.reference_length,
                    ctx.style.unit,
                );
                match completed {
                    Ok(done) => {
                        let mut mark = MeasurementMark::new(
                            done.start,
                            done.end,
                            Some(done.calibration.real_length),
                            ctx.style.ruler.color,
                        );
                        mark.unit = done.calibration.unit;
                        ctx.commits.push(Commit::Calibrated(done.calibration));
                        ctx.create(Shape::Measurement(mark));
                    }
                    Err(err) => tracing::warn!("Calibration rejected: {}", err),
                }
            }
            MeasureKind::Distance => {
                let pixels = start.distance_to(&end);
                let real = match ctx.calibration.to_real_length(pixels) {
                    Ok(real) => Some(real),
                    Err(CalibrationError::Uncalibrated) => {
                        tracing::debug!("Image not calibrated; measurement recorded in pixels");
                        None
                    }
                    Err(err) => {
                        tracing::warn!("Measurement conversion failed: {}", err);
                        None
                    }
                };
                let mut mark = MeasurementMark::new(start, end, real, ctx.style.ruler.color);
                if let Some(calibration) = ctx.calibration.calibration() {
                    mark.unit = calibration.unit;
                }
                ctx.create(Shape::Measurement(mark));
            }
        }
    }
}

impl Tool for MeasureTool {
    fn kind(&self) -> ToolKind {
        match self.kind {
            MeasureKind::Calibration => ToolKind::Calibrate,
            MeasureKind::Distance => ToolKind::Measure,
        }
    }

    fn pointer_down(
        &self,
        state: InteractionState,
        event: &PointerEvent,
        ctx: &mut ToolContext<'_>,
    ) -> InteractionState {
        let p = ctx.image_point(event);
        match state {
            InteractionState::Measuring { kind, start, .. } if kind == self.kind => {
                self.complete(start, p, ctx);
                InteractionState::Idle
            }
            _ => self.start(p, ctx),
        }
    }

    fn pointer_move(
        &self,
        state: InteractionState,
        event: &PointerEvent,
        ctx: &mut ToolContext<'_>,
    ) -> InteractionState {
        match state {
            InteractionState::Measuring { kind, start, .. } => InteractionState::Measuring {
                kind,
                start,
                current: ctx.image_point(event),
            },
            other => other,
        }
    }
}
