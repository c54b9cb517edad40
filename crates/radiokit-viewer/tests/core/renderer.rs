use image::{Rgba, RgbaImage};
use radiokit_settings::Config;
use radiokit_viewer::{
    Canvas, Color, FixedAdvanceMetrics, PointerEvent, RectangleShape, Renderer, Shape, ToolKind,
};
use std::time::Instant;
use tiny_skia::Pixmap;

const GRAY: Rgba<u8> = Rgba([100, 100, 100, 255]);

fn canvas() -> Canvas {
    let mut canvas =
        Canvas::with_metrics(&Config::default(), Box::new(FixedAdvanceMetrics::new(16.0)));
    canvas.load_image(RgbaImage::from_pixel(200, 200, GRAY), Vec::new(), None);
    canvas
}

fn rgb(pixmap: &Pixmap, x: u32, y: u32) -> (u8, u8, u8) {
    let px = pixmap.pixel(x, y).unwrap();
    (px.red(), px.green(), px.blue())
}

fn red_square() -> Shape {
    Shape::Rectangle(RectangleShape::new(90.0, 90.0, 20.0, 20.0, Color::rgb(255, 0, 0)))
}

#[test]
fn test_frame_matches_canvas_size() {
    let canvas = canvas();
    let frame = canvas.render(&mut Renderer::new()).unwrap();
    assert_eq!((frame.width(), frame.height()), (200, 200));
    assert_eq!(rgb(&frame, 100, 100), (100, 100, 100));
}

#[test]
fn test_empty_canvas_renders_background() {
    let canvas = Canvas::with_metrics(&Config::default(), Box::new(FixedAdvanceMetrics::new(16.0)));
    let frame = canvas.render(&mut Renderer::new()).unwrap();
    assert_eq!(rgb(&frame, 0, 0), (0, 0, 0));
}

#[test]
fn test_brightness_changes_base_image_between_frames() {
    let mut canvas = canvas();
    let mut renderer = Renderer::new();
    assert_eq!(rgb(&canvas.render(&mut renderer).unwrap(), 50, 50), (100, 100, 100));

    canvas.set_brightness_percent(200.0);
    assert_eq!(rgb(&canvas.render(&mut renderer).unwrap(), 50, 50), (200, 200, 200));

    canvas.set_brightness_percent(100.0);
    canvas.set_contrast_percent(0.0);
    let (r, g, b) = rgb(&canvas.render(&mut renderer).unwrap(), 50, 50);
    assert_eq!((r, g, b), (128, 128, 128));
}

#[test]
fn test_replaced_pixels_are_drawn() {
    let mut canvas = canvas();
    let mut renderer = Renderer::new();
    canvas.render(&mut renderer).unwrap();

    canvas.replace_base_image(RgbaImage::from_pixel(200, 200, Rgba([10, 20, 30, 255])));
    assert_eq!(rgb(&canvas.render(&mut renderer).unwrap(), 50, 50), (10, 20, 30));
}

#[test]
fn test_shape_outline_is_drawn() {
    let mut canvas = canvas();
    canvas.add_shape(red_square()).unwrap();
    let frame = canvas.render(&mut Renderer::new()).unwrap();

    let (r, g, _) = rgb(&frame, 90, 100);
    assert!(r > 200 && g < 60, "edge pixel was {:?}", (r, g));
    assert_eq!(rgb(&frame, 100, 100), (100, 100, 100));
}

#[test]
fn test_outline_follows_zoom() {
    let mut canvas = canvas();
    canvas.add_shape(red_square()).unwrap();
    canvas.set_zoom_percent(200.0);
    let frame = canvas.render(&mut Renderer::new()).unwrap();

    // x = 90 in the image lands at 100 + 2 * (90 - 100) = 80 on the canvas.
    let (r, g, _) = rgb(&frame, 80, 100);
    assert!(r > 200 && g < 60);
    assert_eq!(rgb(&frame, 90, 100), (100, 100, 100));
}

#[test]
fn test_each_frame_starts_from_clear() {
    let mut canvas = canvas();
    let mut renderer = Renderer::new();
    let id = canvas.add_shape(red_square()).unwrap();
    let mut pixmap = canvas.render(&mut renderer).unwrap();
    assert_ne!(rgb(&pixmap, 90, 100), (100, 100, 100));

    canvas.delete_shape(id).unwrap();
    renderer.render_into(&canvas.scene(), &mut pixmap);
    assert_eq!(rgb(&pixmap, 90, 100), (100, 100, 100));
}

#[test]
fn test_draft_preview_is_drawn_before_commit() {
    let mut canvas = canvas();
    canvas.select_tool(ToolKind::Rectangle);
    canvas.pointer_down(PointerEvent::primary(40.0, 40.0), Instant::now());
    canvas.pointer_move(PointerEvent::primary(160.0, 160.0));

    let frame = canvas.render(&mut Renderer::new()).unwrap();
    assert!(canvas.shapes().is_empty());
    // Dashes start at the corner, so the first stretch of the top edge is inked.
    assert_ne!(rgb(&frame, 42, 40), (100, 100, 100));
}
