use image::RgbaImage;
use radiokit_settings::Config;
use radiokit_viewer::{
    AnnotationShape, Canvas, Commit, FixedAdvanceMetrics, InteractionState, Point, PointerEvent,
    Shape, TextShape, TextTarget, ToolKind,
};
use std::time::Instant;

fn canvas() -> Canvas {
    let mut canvas =
        Canvas::with_metrics(&Config::default(), Box::new(FixedAdvanceMetrics::new(16.0)));
    canvas.load_image(RgbaImage::new(400, 400), Vec::new(), None);
    canvas.select_tool(ToolKind::Text);
    canvas
}

fn press(canvas: &mut Canvas, event: PointerEvent) {
    canvas.pointer_down(event, Instant::now());
    canvas.pointer_up(event);
}

/// Places "Hello" with its baseline starting at (100, 100).
fn place_hello(canvas: &mut Canvas) -> TextShape {
    press(canvas, PointerEvent::primary(100.0, 100.0));
    canvas.set_text_draft("Hello");
    canvas.commit_text_edit();
    canvas.take_commits();
    canvas.shapes().list()[0].as_text().cloned().unwrap()
}

#[test]
fn test_click_opens_editor_and_commit_creates_text() {
    let mut canvas = canvas();
    press(&mut canvas, PointerEvent::primary(100.0, 100.0));

    let edit = canvas.text_edit().unwrap();
    assert_eq!(edit.target, TextTarget::New);
    assert_eq!(edit.at, Point::new(100.0, 100.0));
    assert!(canvas.shapes().is_empty());

    canvas.set_text_draft("Hello");
    canvas.commit_text_edit();

    assert_eq!(*canvas.interaction(), InteractionState::Idle);
    let text = canvas.shapes().list()[0].as_text().unwrap();
    assert_eq!(text.text, "Hello");
    assert_eq!((text.x, text.y, text.scale), (100.0, 100.0, 1.0));
    assert!(matches!(&canvas.take_commits()[..], [Commit::Created(Shape::Text(_))]));
}

#[test]
fn test_empty_new_text_is_discarded() {
    let mut canvas = canvas();
    press(&mut canvas, PointerEvent::primary(50.0, 50.0));
    canvas.set_text_draft("   ");
    canvas.commit_text_edit();

    assert!(canvas.shapes().is_empty());
    assert!(!canvas.has_pending_commits());
}

#[test]
fn test_clicking_elsewhere_commits_open_editor() {
    let mut canvas = canvas();
    press(&mut canvas, PointerEvent::primary(50.0, 50.0));
    canvas.set_text_draft("Hi");
    press(&mut canvas, PointerEvent::primary(300.0, 300.0));

    assert_eq!(canvas.shapes().len(), 1);
    let edit = canvas.text_edit().unwrap();
    assert_eq!(edit.at, Point::new(300.0, 300.0));
    assert!(edit.draft.is_empty());
}

#[test]
fn test_cancel_edit_keeps_shapes_untouched() {
    let mut canvas = canvas();
    let hello = place_hello(&mut canvas);

    press(&mut canvas, PointerEvent::secondary(110.0, 95.0));
    canvas.set_text_draft("Changed");
    canvas.cancel_text_edit();

    assert_eq!(canvas.shapes().text(hello.id).unwrap().text, "Hello");
    assert!(!canvas.has_pending_commits());
}

#[test]
fn test_secondary_click_edits_existing_text() {
    let mut canvas = canvas();
    let hello = place_hello(&mut canvas);

    press(&mut canvas, PointerEvent::secondary(110.0, 95.0));
    let edit = canvas.text_edit().unwrap();
    assert_eq!(edit.target, TextTarget::Existing(hello.id));
    assert_eq!(edit.draft, "Hello");

    canvas.set_text_draft("Fracture");
    canvas.commit_text_edit();
    assert_eq!(canvas.shapes().text(hello.id).unwrap().text, "Fracture");
    assert!(matches!(&canvas.take_commits()[..], [Commit::Updated(s)] if s.id() == hello.id));
}

#[test]
fn test_clearing_existing_text_deletes_it() {
    let mut canvas = canvas();
    let hello = place_hello(&mut canvas);

    press(&mut canvas, PointerEvent::secondary(110.0, 95.0));
    canvas.set_text_draft("");
    canvas.commit_text_edit();

    assert!(canvas.shapes().is_empty());
    assert_eq!(canvas.take_commits(), vec![Commit::Deleted(hello.id)]);
}

#[test]
fn test_bottom_right_handle_doubles_scale() {
    let mut canvas = canvas();
    let hello = place_hello(&mut canvas);
    let width = canvas.metrics().measure("Hello", 1.0).width;
    let bounds = hello.bounds(canvas.metrics());
    assert_eq!(bounds.max_x, 100.0 + width);

    let handle = Point::new(bounds.max_x, bounds.max_y);
    canvas.pointer_down(PointerEvent::primary(handle.x, handle.y), Instant::now());
    assert!(matches!(canvas.interaction(), InteractionState::ResizingText(_)));
    canvas.pointer_move(PointerEvent::primary(handle.x + width, handle.y));
    canvas.pointer_up(PointerEvent::primary(handle.x + width, handle.y));

    let resized = canvas.shapes().text(hello.id).unwrap();
    assert!((resized.scale - 2.0).abs() < 1e-9);
    assert_eq!((resized.x, resized.y), (100.0, 100.0));
    assert!(matches!(
        &canvas.take_commits()[..],
        [Commit::Updated(Shape::Text(t))] if t.scale == resized.scale
    ));
}

#[test]
fn test_left_handle_keeps_right_edge() {
    let mut canvas = canvas();
    let hello = place_hello(&mut canvas);
    let bounds = hello.bounds(canvas.metrics());
    let right = bounds.max_x;

    canvas.pointer_down(PointerEvent::primary(bounds.min_x, bounds.min_y), Instant::now());
    canvas.pointer_move(PointerEvent::primary(bounds.min_x - 24.0, bounds.min_y));
    canvas.pointer_up(PointerEvent::primary(bounds.min_x - 24.0, bounds.min_y));

    let resized = canvas.shapes().text(hello.id).unwrap();
    assert!((resized.scale - 1.5).abs() < 1e-9);
    assert!((resized.bounds(canvas.metrics()).max_x - right).abs() < 1e-9);
    assert_eq!(resized.y, 100.0);
}

#[test]
fn test_resize_is_floored_at_minimum_scale() {
    let mut canvas = canvas();
    let hello = place_hello(&mut canvas);
    let bounds = hello.bounds(canvas.metrics());

    canvas.pointer_down(PointerEvent::primary(bounds.max_x, bounds.max_y), Instant::now());
    canvas.pointer_move(PointerEvent::primary(bounds.max_x - 1000.0, bounds.max_y));
    canvas.pointer_up(PointerEvent::primary(bounds.max_x - 1000.0, bounds.max_y));

    assert_eq!(canvas.shapes().text(hello.id).unwrap().scale, 0.1);
}

#[test]
fn test_drag_moves_text_body() {
    let mut canvas = canvas();
    let hello = place_hello(&mut canvas);

    canvas.pointer_down(PointerEvent::primary(120.0, 95.0), Instant::now());
    assert!(matches!(canvas.interaction(), InteractionState::DraggingText { .. }));
    canvas.pointer_move(PointerEvent::primary(125.0, 100.0));
    canvas.pointer_move(PointerEvent::primary(130.0, 105.0));
    canvas.pointer_up(PointerEvent::primary(130.0, 105.0));

    let moved = canvas.shapes().text(hello.id).unwrap();
    assert_eq!((moved.x, moved.y), (110.0, 110.0));
    assert_eq!(canvas.take_commits().len(), 1);
}

#[test]
fn test_cancelled_drag_restores_text() {
    let mut canvas = canvas();
    let hello = place_hello(&mut canvas);

    canvas.pointer_down(PointerEvent::primary(120.0, 95.0), Instant::now());
    canvas.pointer_move(PointerEvent::primary(180.0, 150.0));
    canvas.cancel_interaction();

    assert_eq!(canvas.shapes().text(hello.id), Some(&hello));
    assert!(!canvas.has_pending_commits());
}

#[test]
fn test_click_without_movement_commits_nothing() {
    let mut canvas = canvas();
    place_hello(&mut canvas);

    press(&mut canvas, PointerEvent::primary(120.0, 95.0));
    assert!(!canvas.has_pending_commits());
}
