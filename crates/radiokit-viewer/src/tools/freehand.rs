use super::{DraftShape, InteractionState, PointerEvent, Tool, ToolContext, ToolKind};
use crate::model::{FreehandShape, Shape};

/// Records the pointer path while the pen is down.
pub struct FreehandTool;

impl Tool for FreehandTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Freehand
    }

    fn pointer_down(
        &self,
        _state: InteractionState,
        event: &PointerEvent,
        ctx: &mut ToolContext<'_>,
    ) -> InteractionState {
        let path = FreehandShape::new(
            ctx.image_point(event),
            ctx.style.default_color,
            ctx.style.pen_width,
        );
        InteractionState::Drawing(DraftShape::Freehand(path))
    }

    fn pointer_move(
        &self,
        state: InteractionState,
        event: &PointerEvent,
        ctx: &mut ToolContext<'_>,
    ) -> InteractionState {
        match state {
            InteractionState::Drawing(DraftShape::Freehand(mut path)) => {
                path.push(ctx.image_point(event));
                InteractionState::Drawing(DraftShape::Freehand(path))
            }
            other => other,
        }
    }

    fn pointer_up(
        &self,
        state: InteractionState,
        _event: &PointerEvent,
        ctx: &mut ToolContext<'_>,
    ) -> InteractionState {
        if let InteractionState::Drawing(DraftShape::Freehand(path)) = state {
            ctx.create(Shape::Freehand(path));
        }
        InteractionState::Idle
    }
}
