use super::{InteractionState, PointerEvent, Tool, ToolContext, ToolKind};

/// Drags the image under the pointer.
pub struct PanTool;

impl Tool for PanTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Pan
    }

    fn pointer_down(
        &self,
        _state: InteractionState,
        event: &PointerEvent,
        _ctx: &mut ToolContext<'_>,
    ) -> InteractionState {
        InteractionState::Panning {
            last: event.position,
        }
    }

    fn pointer_move(
        &self,
        state: InteractionState,
        event: &PointerEvent,
        ctx: &mut ToolContext<'_>,
    ) -> InteractionState {
        let InteractionState::Panning { last } = state else {
            return state;
        };
        let delta = ctx.transform.screen_delta_to_pan(event.position - last);
        ctx.view.pan_by(delta);
        InteractionState::Panning {
            last: event.position,
        }
    }

    fn pointer_up(
        &self,
        _state: InteractionState,
        _event: &PointerEvent,
        _ctx: &mut ToolContext<'_>,
    ) -> InteractionState {
        InteractionState::Idle
    }
}
