use image::{Rgba, RgbaImage};
use radiokit_core::ShapeError;
use radiokit_settings::Config;
use radiokit_viewer::{
    AnnotationShape, Canvas, CircleShape, Color, Commit, DraftShape, FixedAdvanceMetrics,
    InteractionState, Point, PointerEvent, RectangleShape, Shape, ShapeId, ShapePatch, ToolKind,
};
use std::time::{Duration, Instant};

fn canvas(width: u32, height: u32) -> Canvas {
    let mut canvas =
        Canvas::with_metrics(&Config::default(), Box::new(FixedAdvanceMetrics::new(16.0)));
    canvas.load_image(RgbaImage::new(width, height), Vec::new(), None);
    canvas
}

fn rectangle(x: f64, y: f64, w: f64, h: f64) -> Shape {
    Shape::Rectangle(RectangleShape::new(x, y, w, h, Color::rgb(255, 0, 0)))
}

#[test]
fn test_zoom_leaves_shapes_in_image_space() {
    let mut canvas = canvas(400, 400);
    canvas.select_tool(ToolKind::Rectangle);
    canvas.pointer_down(PointerEvent::primary(10.0, 10.0), Instant::now());
    canvas.pointer_move(PointerEvent::primary(40.0, 30.0));
    canvas.pointer_up(PointerEvent::primary(60.0, 40.0));

    let before = canvas.shapes().list()[0].clone();
    match &before {
        Shape::Rectangle(r) => {
            assert_eq!((r.x, r.y, r.width, r.height), (10.0, 10.0, 50.0, 30.0));
        }
        other => panic!("expected rectangle, got {:?}", other),
    }

    canvas.set_zoom_percent(200.0);
    assert_eq!(canvas.shapes().list()[0], before);

    // The corner now sits twice as far from the canvas center on screen.
    let center = canvas.geometry().center();
    let screen = canvas.transform().to_screen_space(Point::new(10.0, 10.0));
    assert!((screen.x - (center.x + 2.0 * (10.0 - center.x))).abs() < 1e-9);
    assert!((screen.y - (center.y + 2.0 * (10.0 - center.y))).abs() < 1e-9);
}

#[test]
fn test_tool_switch_discards_draft() {
    let mut canvas = canvas(200, 200);
    canvas.select_tool(ToolKind::Circle);
    canvas.pointer_down(PointerEvent::primary(50.0, 50.0), Instant::now());
    canvas.pointer_move(PointerEvent::primary(80.0, 50.0));
    assert!(matches!(canvas.interaction(), InteractionState::Drawing(DraftShape::Circle { .. })));

    canvas.select_tool(ToolKind::Pan);
    assert_eq!(*canvas.interaction(), InteractionState::Idle);
    assert!(canvas.shapes().is_empty());
    assert!(!canvas.has_pending_commits());

    // A stray release after the switch pans nothing and creates nothing.
    canvas.pointer_up(PointerEvent::primary(90.0, 50.0));
    assert!(canvas.shapes().is_empty());
}

#[test]
fn test_commits_arrive_in_order() {
    let mut canvas = canvas(200, 200);
    let shape = rectangle(1.0, 2.0, 3.0, 4.0);
    let id = canvas.add_shape(shape).unwrap();
    canvas
        .update_shape(id, ShapePatch::Recolor(Color::rgb(0, 255, 0)))
        .unwrap();
    let removed = canvas.delete_shape(id).unwrap();
    assert_eq!(removed.color(), Color::rgb(0, 255, 0));

    let commits = canvas.take_commits();
    assert_eq!(commits.len(), 3);
    assert!(matches!(&commits[0], Commit::Created(s) if s.id() == id));
    assert!(matches!(&commits[1], Commit::Updated(s) if s.color() == Color::rgb(0, 255, 0)));
    assert_eq!(commits[2], Commit::Deleted(id));
    assert!(canvas.take_commits().is_empty());
}

#[test]
fn test_missing_shape_operations_fail() {
    let mut canvas = canvas(50, 50);
    let ghost = ShapeId::new();
    assert!(matches!(
        canvas.update_shape(ghost, ShapePatch::Translate { dx: 1.0, dy: 1.0 }),
        Err(ShapeError::NotFound { .. })
    ));
    assert!(matches!(canvas.delete_shape(ghost), Err(ShapeError::NotFound { .. })));
    assert!(!canvas.has_pending_commits());
}

#[test]
fn test_duplicate_id_is_rejected() {
    let mut canvas = canvas(50, 50);
    let shape = rectangle(0.0, 0.0, 5.0, 5.0);
    canvas.add_shape(shape.clone()).unwrap();
    assert!(matches!(canvas.add_shape(shape), Err(ShapeError::DuplicateId { .. })));
    assert_eq!(canvas.shapes().len(), 1);
    assert_eq!(canvas.take_commits().len(), 1);
}

#[test]
fn test_persisted_shapes_do_not_commit() {
    let mut canvas = canvas(50, 50);
    let circle = Shape::Circle(CircleShape::new(Point::new(10.0, 10.0), 4.0, Color::default()));
    canvas.insert_persisted(circle).unwrap();
    assert_eq!(canvas.shapes().len(), 1);
    assert!(!canvas.has_pending_commits());
}

#[test]
fn test_load_image_replaces_annotations() {
    let mut canvas = canvas(100, 100);
    canvas.add_shape(rectangle(0.0, 0.0, 1.0, 1.0)).unwrap();

    let stored = vec![rectangle(5.0, 5.0, 10.0, 10.0), rectangle(7.0, 7.0, 2.0, 2.0)];
    canvas.load_image(RgbaImage::new(80, 60), stored.clone(), None);

    assert_eq!(canvas.shapes().list(), stored.as_slice());
    assert!(!canvas.has_pending_commits());
    assert!(!canvas.calibration().is_calibrated());
}

#[test]
fn test_replace_base_image_keeps_shapes_and_resets_filters() {
    let mut canvas = canvas(100, 100);
    canvas.add_shape(rectangle(0.0, 0.0, 10.0, 10.0)).unwrap();
    canvas.set_zoom_percent(150.0);
    canvas.set_brightness_percent(140.0);
    canvas.set_contrast_percent(60.0);
    let before = canvas.base_image().unwrap().generation();

    canvas.replace_base_image(RgbaImage::from_pixel(100, 100, Rgba([9, 9, 9, 255])));

    let image = canvas.base_image().unwrap();
    assert!(image.generation() > before);
    assert_eq!(image.pixels().get_pixel(0, 0), &Rgba([9, 9, 9, 255]));
    assert_eq!(canvas.shapes().len(), 1);
    assert_eq!(canvas.view().zoom_percent, 150.0);
    assert_eq!(canvas.view().brightness_percent, 100.0);
    assert_eq!(canvas.view().contrast_percent, 100.0);
}

#[test]
fn test_redraws_are_coalesced() {
    let mut canvas = canvas(100, 100);
    let start = Instant::now();
    assert!(canvas.should_render(start));
    assert!(!canvas.should_render(start));

    canvas.set_brightness_percent(120.0);
    canvas.set_contrast_percent(80.0);
    assert!(!canvas.should_render(start + Duration::from_millis(1)));
    assert!(canvas.should_render(start + Duration::from_millis(16)));
    assert!(!canvas.should_render(start + Duration::from_millis(40)));
}

#[test]
fn test_pointer_is_tracked_in_image_space() {
    let mut canvas = canvas(100, 100);
    canvas.set_zoom_percent(200.0);
    canvas.pointer_move(PointerEvent::primary(50.0, 50.0));
    let pointer = canvas.pointer().unwrap();
    assert!(pointer.distance_to(&Point::new(50.0, 50.0)) < 1e-9);

    canvas.pointer_move(PointerEvent::primary(70.0, 50.0));
    let pointer = canvas.pointer().unwrap();
    assert!(pointer.distance_to(&Point::new(60.0, 50.0)) < 1e-9);
}
