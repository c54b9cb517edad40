use super::{DraftShape, InteractionState, PointerEvent, Tool, ToolContext, ToolKind};
use crate::model::{CircleShape, Point, RectangleShape, Shape};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawKind {
    Rectangle,
    Circle,
}

/// Drag-out rectangle and circle tool.
///
/// The shape is committed on pointer up using the pointer-up position.
pub struct DrawTool {
    pub kind: DrawKind,
}

impl DrawTool {
    fn draft(&self, start: Point) -> DraftShape {
        match self.kind {
            DrawKind::Rectangle => DraftShape::Rectangle {
                start,
                current: start,
            },
            DrawKind::Circle => DraftShape::Circle {
                center: start,
                current: start,
            },
        }
    }
}

impl Tool for DrawTool {
    fn kind(&self) -> ToolKind {
        match self.kind {
            DrawKind::Rectangle => ToolKind::Rectangle,
            DrawKind::Circle => ToolKind::Circle,
        }
    }

    fn pointer_down(
        &self,
        _state: InteractionState,
        event: &PointerEvent,
        ctx: &mut ToolContext<'_>,
    ) -> InteractionState {
        InteractionState::Drawing(self.draft(ctx.image_point(event)))
    }

    fn pointer_move(
        &self,
        state: InteractionState,
        event: &PointerEvent,
        ctx: &mut ToolContext<'_>,
    ) -> InteractionState {
        let p = ctx.image_point(event);
        match state {
            InteractionState::Drawing(DraftShape::Rectangle { start, .. }) => {
                InteractionState::Drawing(DraftShape::Rectangle { start, current: p })
            }
            InteractionState::Drawing(DraftShape::Circle { center, .. }) => {
                InteractionState::Drawing(DraftShape::Circle { center, current: p })
            }
            other => other,
        }
    }

    fn pointer_up(
        &self,
        state: InteractionState,
        event: &PointerEvent,
        ctx: &mut ToolContext<'_>,
    ) -> InteractionState {
        let end = ctx.image_point(event);
        let color = ctx.style.default_color;
        let shape = match state {
            InteractionState::Drawing(DraftShape::Rectangle { start, .. }) => {
                Shape::Rectangle(RectangleShape::from_corners(start, end, color))
            }
            InteractionState::Drawing(DraftShape::Circle { center, .. }) => {
                Shape::Circle(CircleShape::from_drag(center, end, color))
            }
            _ => return InteractionState::Idle,
        };
        ctx.create(shape);
        InteractionState::Idle
    }
}
