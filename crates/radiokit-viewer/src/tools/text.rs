use super::{
    InteractionState, PointerButton, PointerEvent, TextEdit, TextTarget, Tool, ToolContext,
    ToolKind,
};
use crate::canvas::Commit;
use crate::model::{Corner, Point, Shape, TextShape};
use crate::shape_store::ShapePatch;

/// Handle drag in progress.
#[derive(Debug, Clone, PartialEq)]
pub struct TextResize {
    pub corner: Corner,
    /// Pointer position in image space when the drag started
    pub start: Point,
    /// The text as it was when the drag started
    pub original: TextShape,
}

/// Places, edits, moves and resizes text labels.
///
/// Primary press on a handle resizes, on a text body drags, and on empty
/// image opens an editor for new text. Secondary press on a text opens it
/// for editing.
pub struct TextTool;

impl Tool for TextTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Text
    }

    fn pointer_down(
        &self,
        state: InteractionState,
        event: &PointerEvent,
        ctx: &mut ToolContext<'_>,
    ) -> InteractionState {
        if let InteractionState::EditingText(edit) = state {
            commit_edit(edit, ctx);
        }

        let p = ctx.image_point(event);
        let tolerance = ctx.handle_tolerance();

        if event.button == PointerButton::Secondary {
            let hit = ctx
                .shapes
                .text_at(p, tolerance, ctx.metrics)
                .and_then(|id| ctx.shapes.text(id));
            return match hit {
                Some(text) => InteractionState::EditingText(TextEdit {
                    target: TextTarget::Existing(text.id),
                    at: text.origin(),
                    draft: text.text.clone(),
                }),
                None => InteractionState::Idle,
            };
        }

        if let Some((id, corner)) = ctx.shapes.text_handle_at(p, tolerance, ctx.metrics) {
            if let Some(original) = ctx.shapes.text(id).cloned() {
                return InteractionState::ResizingText(TextResize {
                    corner,
                    start: p,
                    original,
                });
            }
        }

        if let Some(original) = ctx
            .shapes
            .text_at(p, 0.0, ctx.metrics)
            .and_then(|id| ctx.shapes.text(id))
            .cloned()
        {
            return InteractionState::DraggingText {
                id: original.id,
                last: p,
                original,
            };
        }

        InteractionState::EditingText(TextEdit {
            target: TextTarget::New,
            at: p,
            draft: String::new(),
        })
    }

    fn pointer_move(
        &self,
        state: InteractionState,
        event: &PointerEvent,
        ctx: &mut ToolContext<'_>,
    ) -> InteractionState {
        let p = ctx.image_point(event);
        match state {
            InteractionState::DraggingText { id, last, original } => {
                let delta = p - last;
                let patch = ShapePatch::Translate {
                    dx: delta.x,
                    dy: delta.y,
                };
                if let Err(err) = ctx.shapes.update(id, patch) {
                    tracing::warn!("Text drag lost its target: {}", err);
                    return InteractionState::Idle;
                }
                InteractionState::DraggingText { id, last: p, original }
            }
            InteractionState::ResizingText(resize) => {
                let (scale, x) = TextShape::resized(
                    &resize.original,
                    resize.corner,
                    p.x - resize.start.x,
                    ctx.style.min_text_scale,
                    ctx.metrics,
                );
                let patch = ShapePatch::ScaleText { scale, x };
                if let Err(err) = ctx.shapes.update(resize.original.id, patch) {
                    tracing::warn!("Text resize lost its target: {}", err);
                    return InteractionState::Idle;
                }
                InteractionState::ResizingText(resize)
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
        match state {
            InteractionState::DraggingText { original, .. }
            | InteractionState::ResizingText(TextResize { original, .. }) => {
                commit_if_changed(original, ctx);
                InteractionState::Idle
            }
            other => other,
        }
    }
}

fn commit_if_changed(original: TextShape, ctx: &mut ToolContext<'_>) {
    match ctx.shapes.text(original.id) {
        Some(current) if *current != original => {
            ctx.commits.push(Commit::Updated(Shape::Text(current.clone())));
        }
        Some(_) => {}
        None => tracing::warn!("Text {} vanished during interaction", original.id),
    }
}

/// Writes the editor's draft back to the canvas.
///
/// An empty draft discards a new text and deletes an existing one.
pub(super) fn commit_edit(edit: TextEdit, ctx: &mut ToolContext<'_>) {
    let empty = edit.draft.trim().is_empty();
    match edit.target {
        TextTarget::New if empty => tracing::debug!("Discarded empty text"),
        TextTarget::New => {
            let text = TextShape::new(
                edit.draft,
                edit.at,
                ctx.style.default_color,
                ctx.style.default_text_scale,
            );
            ctx.create(Shape::Text(text));
        }
        TextTarget::Existing(id) if empty => ctx.delete(id),
        TextTarget::Existing(id) => {
            let unchanged = ctx.shapes.text(id).is_some_and(|t| t.text == edit.draft);
            if unchanged {
                return;
            }
            if let Err(err) = ctx.update(id, ShapePatch::SetText(edit.draft)) {
                tracing::warn!("Could not update text {}: {}", id, err);
            }
        }
    }
}
