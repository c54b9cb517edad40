//! Interaction tools.
//!
//! Exactly one tool is active at a time. Pointer events arrive in screen
//! space, are converted to image space through the current view transform,
//! and are handed to the active tool together with the in-progress
//! [`InteractionState`]. Tools are stateless; everything a gesture needs is
//! carried in the state value they return.

use radiokit_core::ShapeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::calibration::CalibrationModel;
use crate::canvas::Commit;
use crate::model::{FreehandShape, Point, Shape, ShapeId, TextShape};
use crate::shape_store::{ShapePatch, ShapeStore};
use crate::style::CanvasStyle;
use crate::text_metrics::TextMetrics;
use crate::viewport::{ViewState, ViewTransform};

mod draw;
mod freehand;
mod measure;
mod pan;
mod text;

pub use draw::{DrawKind, DrawTool};
pub use freehand::FreehandTool;
pub use measure::{MeasureKind, MeasureTool};
pub use pan::PanTool;
pub use text::{TextResize, TextTool};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    #[default]
    Pan,
    Rectangle,
    Circle,
    Text,
    Freehand,
    Calibrate,
    Measure,
}

impl ToolKind {
    pub const ALL: [ToolKind; 7] = [
        ToolKind::Pan,
        ToolKind::Rectangle,
        ToolKind::Circle,
        ToolKind::Text,
        ToolKind::Freehand,
        ToolKind::Calibrate,
        ToolKind::Measure,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::Pan => "pan",
            ToolKind::Rectangle => "rectangle",
            ToolKind::Circle => "circle",
            ToolKind::Text => "text",
            ToolKind::Freehand => "freehand",
            ToolKind::Calibrate => "calibrate",
            ToolKind::Measure => "measure",
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ToolKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s.trim().to_lowercase())
            .ok_or_else(|| format!("Unknown tool: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerButton {
    #[default]
    Primary,
    /// Right click or long press
    Secondary,
}

/// A pointer event in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub position: Point,
    pub button: PointerButton,
}

impl PointerEvent {
    pub fn primary(x: f64, y: f64) -> Self {
        Self {
            position: Point::new(x, y),
            button: PointerButton::Primary,
        }
    }

    pub fn secondary(x: f64, y: f64) -> Self {
        Self {
            position: Point::new(x, y),
            button: PointerButton::Secondary,
        }
    }
}

/// A shape being dragged out, not yet committed.
#[derive(Debug, Clone, PartialEq)]
pub enum DraftShape {
    Rectangle { start: Point, current: Point },
    Circle { center: Point, current: Point },
    Freehand(FreehandShape),
}

/// What the open text editor will write to on commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextTarget {
    New,
    Existing(ShapeId),
}

/// Inline text editing session.
#[derive(Debug, Clone, PartialEq)]
pub struct TextEdit {
    pub target: TextTarget,
    /// Baseline anchor of the text in image space
    pub at: Point,
    pub draft: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    Panning {
        last: Point,
    },
    Drawing(DraftShape),
    DraggingText {
        id: ShapeId,
        last: Point,
        original: TextShape,
    },
    ResizingText(TextResize),
    Measuring {
        kind: MeasureKind,
        start: Point,
        current: Point,
    },
    EditingText(TextEdit),
}

/// Everything a tool may read or change while handling one event.
pub struct ToolContext<'a> {
    pub view: &'a mut ViewState,
    pub transform: &'a ViewTransform,
    pub shapes: &'a mut ShapeStore,
    pub calibration: &'a mut CalibrationModel,
    pub metrics: &'a dyn TextMetrics,
    pub style: &'a CanvasStyle,
    pub commits: &'a mut Vec<Commit>,
}

impl ToolContext<'_> {
    pub fn image_point(&self, event: &PointerEvent) -> Point {
        self.transform.to_image_space(event.position)
    }

    /// Hit radius for handles, in image pixels.
    pub fn handle_tolerance(&self) -> f64 {
        self.style.handle_size_px * self.transform.image_units_per_screen_px()
    }

    /// Adds a new shape and records its creation.
    pub fn create(&mut self, shape: Shape) {
        let kind = shape.shape_type();
        match self.shapes.add(shape.clone()) {
            Ok(id) => {
                tracing::info!("Created {} {}", kind, id);
                self.commits.push(Commit::Created(shape));
            }
            Err(err) => tracing::error!("Failed to add {}: {}", kind, err),
        }
    }

    /// Applies a patch and records the updated shape.
    pub fn update(&mut self, id: ShapeId, patch: ShapePatch) -> Result<(), ShapeError> {
        let shape = self.shapes.update(id, patch)?.clone();
        self.commits.push(Commit::Updated(shape));
        Ok(())
    }

    pub fn delete(&mut self, id: ShapeId) {
        if self.shapes.remove(id).is_some() {
            tracing::info!("Deleted shape {}", id);
            self.commits.push(Commit::Deleted(id));
        }
    }
}

/// A pointer-driven tool.
pub trait Tool: Sync {
    fn kind(&self) -> ToolKind;

    fn pointer_down(
        &self,
        state: InteractionState,
        event: &PointerEvent,
        ctx: &mut ToolContext<'_>,
    ) -> InteractionState;

    fn pointer_move(
        &self,
        state: InteractionState,
        _event: &PointerEvent,
        _ctx: &mut ToolContext<'_>,
    ) -> InteractionState {
        state
    }

    fn pointer_up(
        &self,
        state: InteractionState,
        _event: &PointerEvent,
        _ctx: &mut ToolContext<'_>,
    ) -> InteractionState {
        state
    }
}

fn tool_for(kind: ToolKind) -> &'static dyn Tool {
    match kind {
        ToolKind::Pan => &PanTool,
        ToolKind::Rectangle => &DrawTool {
            kind: DrawKind::Rectangle,
        },
        ToolKind::Circle => &DrawTool {
            kind: DrawKind::Circle,
        },
        ToolKind::Text => &TextTool,
        ToolKind::Freehand => &FreehandTool,
        ToolKind::Calibrate => &MeasureTool {
            kind: MeasureKind::Calibration,
        },
        ToolKind::Measure => &MeasureTool {
            kind: MeasureKind::Distance,
        },
    }
}

/// Owns the active tool and the in-progress gesture.
#[derive(Debug, Clone, Default)]
pub struct ToolController {
    active: ToolKind,
    state: InteractionState,
}

impl ToolController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_tool(&self) -> ToolKind {
        self.active
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn text_edit(&self) -> Option<&TextEdit> {
        match &self.state {
            InteractionState::EditingText(edit) => Some(edit),
            _ => None,
        }
    }

    /// Switches tools, abandoning any gesture in progress.
    pub fn select_tool(&mut self, kind: ToolKind, ctx: &mut ToolContext<'_>) {
        if kind == self.active {
            return;
        }
        self.cancel(ctx);
        tracing::debug!("Tool {} -> {}", self.active, kind);
        self.active = kind;
    }

    /// Abandons the current gesture without committing anything.
    ///
    /// A text drag or resize is rolled back to where it started.
    pub fn cancel(&mut self, ctx: &mut ToolContext<'_>) {
        match std::mem::take(&mut self.state) {
            InteractionState::Measuring {
                kind: MeasureKind::Calibration,
                ..
            } => {
                ctx.calibration.cancel_calibration();
            }
            InteractionState::DraggingText { id, original, .. } => {
                restore_text(ctx, id, original);
            }
            InteractionState::ResizingText(resize) => {
                restore_text(ctx, resize.original.id, resize.original);
            }
            InteractionState::Idle => {}
            other => tracing::debug!("Discarded in-progress interaction {:?}", other),
        }
    }

    pub fn pointer_down(&mut self, event: &PointerEvent, ctx: &mut ToolContext<'_>) {
        let state = std::mem::take(&mut self.state);
        self.state = tool_for(self.active).pointer_down(state, event, ctx);
    }

    pub fn pointer_move(&mut self, event: &PointerEvent, ctx: &mut ToolContext<'_>) {
        let state = std::mem::take(&mut self.state);
        self.state = tool_for(self.active).pointer_move(state, event, ctx);
    }

    pub fn pointer_up(&mut self, event: &PointerEvent, ctx: &mut ToolContext<'_>) {
        let state = std::mem::take(&mut self.state);
        self.state = tool_for(self.active).pointer_up(state, event, ctx);
    }

    /// Replaces the draft text of the open editor.
    pub fn set_text_draft(&mut self, draft: impl Into<String>) -> bool {
        match &mut self.state {
            InteractionState::EditingText(edit) => {
                edit.draft = draft.into();
                true
            }
            _ => false,
        }
    }

    /// Closes the open text editor without writing anything.
    pub fn cancel_text_edit(&mut self) -> bool {
        if matches!(self.state, InteractionState::EditingText(_)) {
            self.state = InteractionState::Idle;
            true
        } else {
            false
        }
    }

    /// Commits the open text editor, if any.
    pub fn commit_text(&mut self, ctx: &mut ToolContext<'_>) {
        match std::mem::take(&mut self.state) {
            InteractionState::EditingText(edit) => text::commit_edit(edit, ctx),
            other => {
                tracing::debug!("No text edit to commit");
                self.state = other;
            }
        }
    }
}

fn restore_text(ctx: &mut ToolContext<'_>, id: ShapeId, original: TextShape) {
    if let Err(err) = ctx.shapes.update(id, ShapePatch::Replace(Shape::Text(original))) {
        tracing::warn!("Could not roll back text {}: {}", id, err);
    }
}
