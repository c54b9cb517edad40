use image::RgbaImage;
use radiokit_settings::Config;
use radiokit_viewer::{
    Canvas, Commit, DraftShape, FixedAdvanceMetrics, InteractionState, PathSegment, Point,
    PointerEvent, Shape, ToolKind,
};
use std::time::Instant;

fn canvas() -> Canvas {
    let mut canvas =
        Canvas::with_metrics(&Config::default(), Box::new(FixedAdvanceMetrics::new(16.0)));
    canvas.load_image(RgbaImage::new(300, 300), Vec::new(), None);
    canvas
}

fn drag(canvas: &mut Canvas, from: (f64, f64), to: (f64, f64)) {
    canvas.pointer_down(PointerEvent::primary(from.0, from.1), Instant::now());
    canvas.pointer_move(PointerEvent::primary(to.0, to.1));
    canvas.pointer_up(PointerEvent::primary(to.0, to.1));
}

#[test]
fn test_tool_kind_parsing() {
    assert_eq!("Freehand".parse::<ToolKind>().unwrap(), ToolKind::Freehand);
    assert_eq!(" measure ".parse::<ToolKind>().unwrap(), ToolKind::Measure);
    assert!("eraser".parse::<ToolKind>().is_err());
    assert_eq!(ToolKind::default(), ToolKind::Pan);
}

#[test]
fn test_rectangle_drag_in_any_direction_normalizes() {
    let mut canvas = canvas();
    canvas.select_tool(ToolKind::Rectangle);
    drag(&mut canvas, (80.0, 90.0), (20.0, 30.0));

    match &canvas.shapes().list()[0] {
        Shape::Rectangle(r) => {
            assert_eq!((r.x, r.y, r.width, r.height), (20.0, 30.0, 60.0, 60.0));
            assert_eq!(r.color, canvas.style().default_color);
        }
        other => panic!("expected rectangle, got {:?}", other),
    }
    assert_eq!(*canvas.interaction(), InteractionState::Idle);
}

#[test]
fn test_rectangle_preview_follows_pointer() {
    let mut canvas = canvas();
    canvas.select_tool(ToolKind::Rectangle);
    canvas.pointer_down(PointerEvent::primary(10.0, 10.0), Instant::now());
    canvas.pointer_move(PointerEvent::primary(40.0, 25.0));

    assert_eq!(
        *canvas.interaction(),
        InteractionState::Drawing(DraftShape::Rectangle {
            start: Point::new(10.0, 10.0),
            current: Point::new(40.0, 25.0),
        })
    );
    assert!(canvas.shapes().is_empty());
}

#[test]
fn test_circle_radius_is_drag_distance() {
    let mut canvas = canvas();
    canvas.select_tool(ToolKind::Circle);
    drag(&mut canvas, (100.0, 100.0), (130.0, 140.0));

    match &canvas.shapes().list()[0] {
        Shape::Circle(c) => {
            assert_eq!(c.center(), Point::new(100.0, 100.0));
            assert!((c.radius - 50.0).abs() < 1e-9);
        }
        other => panic!("expected circle, got {:?}", other),
    }
}

#[test]
fn test_click_without_drag_keeps_degenerate_shape() {
    let mut canvas = canvas();
    canvas.select_tool(ToolKind::Rectangle);
    canvas.pointer_down(PointerEvent::primary(5.0, 5.0), Instant::now());
    canvas.pointer_up(PointerEvent::primary(5.0, 5.0));

    assert_eq!(canvas.shapes().len(), 1);
    assert_eq!(canvas.take_commits().len(), 1);
}

#[test]
fn test_drawing_under_zoom_maps_to_image_space() {
    let mut canvas = canvas();
    canvas.set_zoom_percent(200.0);
    canvas.select_tool(ToolKind::Rectangle);
    // Canvas center is (150, 150); at 2x every screen pixel is half an image pixel.
    drag(&mut canvas, (150.0, 150.0), (190.0, 170.0));

    match &canvas.shapes().list()[0] {
        Shape::Rectangle(r) => {
            assert!((r.x - 150.0).abs() < 1e-9 && (r.y - 150.0).abs() < 1e-9);
            assert!((r.width - 20.0).abs() < 1e-9 && (r.height - 10.0).abs() < 1e-9);
        }
        other => panic!("expected rectangle, got {:?}", other),
    }
}

#[test]
fn test_freehand_records_every_pointer_position() {
    let mut canvas = canvas();
    canvas.select_tool(ToolKind::Freehand);
    canvas.pointer_down(PointerEvent::primary(0.0, 0.0), Instant::now());
    canvas.pointer_move(PointerEvent::primary(10.0, 0.0));
    canvas.pointer_move(PointerEvent::primary(20.0, 10.0));
    canvas.pointer_move(PointerEvent::primary(30.0, 10.0));
    canvas.pointer_up(PointerEvent::primary(30.0, 10.0));

    let path = match &canvas.shapes().list()[0] {
        Shape::Freehand(path) => path.clone(),
        other => panic!("expected freehand, got {:?}", other),
    };
    assert_eq!(
        path.points,
        vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(20.0, 10.0),
            Point::new(30.0, 10.0),
        ]
    );
    assert_eq!(path.pen_width, canvas.style().pen_width);

    let segments = path.smoothed_segments();
    assert_eq!(segments.first(), Some(&PathSegment::MoveTo(Point::new(0.0, 0.0))));
    assert_eq!(segments.last(), Some(&PathSegment::LineTo(Point::new(30.0, 10.0))));
    assert!(matches!(&canvas.take_commits()[..], [Commit::Created(Shape::Freehand(_))]));
}

#[test]
fn test_pan_drags_image_with_pointer() {
    let mut canvas = canvas();
    let before = canvas.transform().to_image_space(Point::new(100.0, 100.0));
    drag(&mut canvas, (100.0, 100.0), (130.0, 80.0));

    let after = canvas.transform().to_image_space(Point::new(130.0, 80.0));
    assert!(after.distance_to(&before) < 1e-9);
    assert!(canvas.shapes().is_empty());
    assert!(!canvas.has_pending_commits());
}

#[test]
fn test_measure_preview_tracks_pointer_until_second_click() {
    let mut canvas = canvas();
    canvas.select_tool(ToolKind::Measure);
    canvas.pointer_down(PointerEvent::primary(10.0, 10.0), Instant::now());
    canvas.pointer_up(PointerEvent::primary(10.0, 10.0));
    canvas.pointer_move(PointerEvent::primary(50.0, 40.0));

    match canvas.interaction() {
        InteractionState::Measuring { start, current, .. } => {
            assert_eq!(*start, Point::new(10.0, 10.0));
            assert_eq!(*current, Point::new(50.0, 40.0));
        }
        other => panic!("expected measuring, got {:?}", other),
    }
    assert!(canvas.shapes().is_empty());

    canvas.pointer_down(PointerEvent::primary(50.0, 40.0), Instant::now());
    match &canvas.shapes().list()[0] {
        Shape::Measurement(mark) => {
            assert!((mark.pixel_length - 50.0).abs() < 1e-9);
            assert_eq!(mark.label(), "50 px");
        }
        other => panic!("expected measurement, got {:?}", other),
    }
}
