use image::{ImageFormat, Rgba, RgbaImage};
use radiokit_core::event_bus::{EventBus, NotificationLevel};
use radiokit_core::{Error, ImageId, LengthUnit};
use radiokit_services::{
    AnnotationKind, AnnotationRecord, CalibrationRecord, Detection, InMemoryAnnotationStore,
    StaticAiService, ViewerSession,
};
use radiokit_settings::Config;
use radiokit_viewer::{
    Canvas, Color, FixedAdvanceMetrics, PointerEvent, RectangleShape, Shape, ToolKind,
};
use std::io::Cursor;
use std::sync::Arc;
use std::time::Instant;

struct Harness {
    session: ViewerSession,
    store: Arc<InMemoryAnnotationStore>,
    bus: &'static EventBus,
}

fn harness_with(config: Config, ai: StaticAiService) -> Harness {
    let store = Arc::new(InMemoryAnnotationStore::new());
    let bus: &'static EventBus = Box::leak(Box::new(EventBus::new()));
    let canvas = Canvas::with_metrics(&config, Box::new(FixedAdvanceMetrics::new(16.0)));
    let session = ViewerSession::with_canvas(canvas, &config, store.clone(), Arc::new(ai))
        .with_event_bus(bus);
    Harness {
        session,
        store,
        bus,
    }
}

fn harness(ai: StaticAiService) -> Harness {
    harness_with(Config::default(), ai)
}

fn gray(width: u32, height: u32, value: u8) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba([value, value, value, 255]))
}

fn png(pixels: &RgbaImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    pixels
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

fn nodule() -> Detection {
    Detection {
        bounds: [20.0, 30.0, 60.0, 90.0],
        label: "nodule".to_string(),
        score: 0.91,
    }
}

fn draw_rectangle(session: &mut ViewerSession) {
    let canvas = session.canvas_mut();
    canvas.select_tool(ToolKind::Rectangle);
    canvas.pointer_down(PointerEvent::primary(10.0, 10.0), Instant::now());
    canvas.pointer_up(PointerEvent::primary(60.0, 40.0));
}

fn warnings(bus: &EventBus) -> Vec<String> {
    bus.recent_notifications()
        .into_iter()
        .filter(|n| n.level == NotificationLevel::Warning)
        .map(|n| n.message)
        .collect()
}

#[tokio::test]
async fn test_open_image_restores_stored_state() {
    let mut h = harness(StaticAiService::new());
    let image = ImageId::from("xray-1");
    let stored = Shape::Rectangle(RectangleShape::new(5.0, 5.0, 20.0, 20.0, Color::default()));
    h.store
        .insert_annotations(&image, vec![AnnotationRecord::from_shape(&stored)]);
    h.store.insert_calibration(
        &image,
        CalibrationRecord {
            pixel_width: 200.0,
            pixel_height: 200.0,
            real_width: 30.0,
            real_height: 30.0,
            unit: LengthUnit::Millimeter,
        },
    );

    h.session.open_image(image.clone(), gray(200, 200, 100)).await;

    assert_eq!(h.session.current_image(), Some(&image));
    assert_eq!(h.session.canvas().shapes().len(), 1);
    assert_eq!(h.session.canvas().format_length(100.0), "15.0 mm");
    assert!(!h.session.canvas().has_pending_commits());
}

#[tokio::test]
async fn test_open_image_survives_store_outage() {
    let mut h = harness(StaticAiService::new());
    h.store.set_failing(true);

    h.session.open_image(ImageId::from("xray-1"), gray(50, 50, 0)).await;

    assert!(h.session.canvas().base_image().is_some());
    assert!(h.session.canvas().shapes().is_empty());
    assert!(warnings(h.bus)[0].contains("Could not load annotations"));
}

#[tokio::test]
async fn test_flush_writes_drawn_shapes() {
    let mut h = harness(StaticAiService::new());
    let image = ImageId::from("xray-1");
    h.session.open_image(image.clone(), gray(200, 200, 0)).await;

    draw_rectangle(&mut h.session);
    let report = h.session.flush().await;

    assert_eq!(report.persisted, 1);
    let stored = h.store.annotations(&image);
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].kind, AnnotationKind::Rectangle);
    assert!(!h.session.canvas().has_pending_commits());
}

#[tokio::test]
async fn test_calibration_is_saved_with_its_mark() {
    let mut h = harness(StaticAiService::new());
    let image = ImageId::from("xray-1");
    h.session.open_image(image.clone(), gray(300, 300, 0)).await;

    let canvas = h.session.canvas_mut();
    canvas.select_tool(ToolKind::Calibrate);
    for x in [100.0, 200.0] {
        canvas.pointer_down(PointerEvent::primary(x, 100.0), Instant::now());
        canvas.pointer_up(PointerEvent::primary(x, 100.0));
    }
    let report = h.session.flush().await;

    assert_eq!(report.persisted, 2);
    let record = h.store.calibration(&image).unwrap();
    assert_eq!(record.pixel_width, 100.0);
    assert_eq!(record.real_width, 15.0);
    let marks = h.store.annotations(&image);
    assert_eq!(marks[0].kind, AnnotationKind::Measurement);
    assert_eq!(marks[0].measurement, Some(15.0));
}

#[tokio::test]
async fn test_failed_flush_keeps_shapes_and_notifies() {
    let mut h = harness(StaticAiService::new());
    let image = ImageId::from("xray-1");
    h.session.open_image(image.clone(), gray(200, 200, 0)).await;

    h.store.set_failing(true);
    draw_rectangle(&mut h.session);
    let report = h.session.flush().await;

    assert_eq!(report.pending, 1);
    assert_eq!(h.session.canvas().shapes().len(), 1);
    assert!(warnings(h.bus)
        .iter()
        .any(|message| message.contains("will be retried")));

    h.store.set_failing(false);
    let report = h.session.flush().await;
    assert!(report.is_complete());
    assert_eq!(h.store.annotations(&image).len(), 1);
}

#[tokio::test]
async fn test_switching_images_flushes_previous_commits() {
    let mut h = harness(StaticAiService::new());
    let first = ImageId::from("xray-1");
    h.session.open_image(first.clone(), gray(200, 200, 0)).await;
    draw_rectangle(&mut h.session);

    h.session.open_image(ImageId::from("xray-2"), gray(100, 100, 0)).await;

    assert_eq!(h.store.annotations(&first).len(), 1);
    assert!(h.session.canvas().shapes().is_empty());
}

#[tokio::test]
async fn test_detections_become_labeled_rectangles() {
    let mut h = harness(StaticAiService::new().with_detections(vec![nodule()]));
    let image = ImageId::from("xray-1");
    h.session.open_image(image.clone(), gray(200, 200, 0)).await;

    let added = h.session.detect().await.unwrap();
    assert_eq!(added, 1);

    match &h.session.canvas().shapes().list()[0] {
        Shape::Rectangle(rect) => {
            assert_eq!((rect.x, rect.y, rect.width, rect.height), (20.0, 30.0, 40.0, 60.0));
            assert_eq!(rect.label.as_deref(), Some("nodule 91%"));
            assert_eq!(rect.color, h.session.canvas().style().detection_color);
        }
        other => panic!("expected rectangle, got {:?}", other),
    }

    h.session.flush().await;
    let stored = h.store.annotations(&image);
    assert_eq!(stored[0].kind, AnnotationKind::Detection);
    assert_eq!(stored[0].label.as_deref(), Some("nodule 91%"));
}

#[tokio::test]
async fn test_unpersisted_detections_commit_nothing() {
    let mut config = Config::default();
    config.services.persist_detections = false;
    let mut h = harness_with(config, StaticAiService::new().with_detections(vec![nodule()]));
    h.session.open_image(ImageId::from("xray-1"), gray(200, 200, 0)).await;

    assert_eq!(h.session.detect().await.unwrap(), 1);
    assert!(!h.session.canvas().has_pending_commits());
}

#[tokio::test]
async fn test_stale_detections_are_discarded() {
    let mut h = harness(StaticAiService::new());
    h.session.open_image(ImageId::from("xray-1"), gray(200, 200, 0)).await;
    let request = h.session.remote_request().unwrap();

    h.session.open_image(ImageId::from("xray-2"), gray(200, 200, 0)).await;
    let response = radiokit_services::DetectionResponse {
        detections: vec![nodule()],
    };

    assert_eq!(h.session.apply_detections(&request.image, response), 0);
    assert!(h.session.canvas().shapes().is_empty());
}

#[tokio::test]
async fn test_enhance_swaps_pixels_and_keeps_annotations() {
    let enhanced = gray(200, 200, 180);
    let mut h = harness(StaticAiService::new().with_enhanced(png(&enhanced)));
    let image = ImageId::from("xray-1");
    h.session.open_image(image.clone(), gray(200, 200, 40)).await;
    draw_rectangle(&mut h.session);
    h.session.canvas_mut().set_brightness_percent(150.0);

    assert!(h.session.enhance().await.unwrap());

    let canvas = h.session.canvas();
    assert_eq!(canvas.base_image().unwrap().pixels().get_pixel(5, 5).0[0], 180);
    assert_eq!(canvas.view().brightness_percent, 100.0);
    assert_eq!(canvas.shapes().len(), 1);
    assert!(h.store.image_bytes(&image).is_some());
}

#[tokio::test]
async fn test_stale_enhancement_is_discarded() {
    let mut h = harness(StaticAiService::new());
    h.session.open_image(ImageId::from("xray-1"), gray(20, 20, 40)).await;
    let request = h.session.remote_request().unwrap();
    h.session.open_image(ImageId::from("xray-2"), gray(20, 20, 40)).await;

    let applied = h
        .session
        .apply_enhanced(&request.image, png(&gray(20, 20, 250)))
        .await
        .unwrap();

    assert!(!applied);
    let pixels = h.session.canvas().base_image().unwrap().pixels();
    assert_eq!(pixels.get_pixel(0, 0).0[0], 40);
}

#[tokio::test]
async fn test_undecodable_enhancement_is_an_error() {
    let mut h = harness(StaticAiService::new().with_enhanced(b"not an image".to_vec()));
    h.session.open_image(ImageId::from("xray-1"), gray(20, 20, 40)).await;

    let err = h.session.enhance().await.unwrap_err();
    assert!(matches!(err, Error::RemoteService(_)));
    assert_eq!(
        h.session.canvas().base_image().unwrap().pixels().get_pixel(0, 0).0[0],
        40
    );
}

#[tokio::test]
async fn test_ai_failure_leaves_canvas_untouched() {
    let ai = StaticAiService::new().with_detections(vec![nodule()]);
    ai.set_failing(true);
    let mut h = harness(ai);
    h.session.open_image(ImageId::from("xray-1"), gray(200, 200, 0)).await;

    let err = h.session.detect().await.unwrap_err();
    assert!(err.is_remote_service_error());
    assert!(h.session.canvas().shapes().is_empty());
    let errors: Vec<_> = h
        .bus
        .recent_notifications()
        .into_iter()
        .filter(|n| n.level == NotificationLevel::Error)
        .collect();
    assert_eq!(errors.len(), 1);
}

#[tokio::test]
async fn test_remote_calls_need_an_open_image() {
    let mut h = harness(StaticAiService::new());
    assert!(h.session.remote_request().is_none());
    assert!(h.session.detect().await.is_err());
    assert!(h.session.flush().await.is_complete());
}
