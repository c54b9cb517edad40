use image::RgbaImage;
use radiokit_core::LengthUnit;
use radiokit_settings::Config;
use radiokit_viewer::{
    AnnotationDocument, Calibration, Canvas, CircleShape, Color, FixedAdvanceMetrics,
    FreehandShape, MeasurementMark, Point, RectangleShape, Shape, TextShape,
};
use tempfile::TempDir;

fn annotated_canvas() -> Canvas {
    let mut canvas =
        Canvas::with_metrics(&Config::default(), Box::new(FixedAdvanceMetrics::new(16.0)));
    let mut path = FreehandShape::new(Point::new(1.0, 1.0), Color::rgb(0, 200, 0), 3.0);
    path.push(Point::new(4.5, 2.25));
    path.push(Point::new(9.0, 7.0));

    let shapes = vec![
        Shape::Rectangle(
            RectangleShape::new(10.0, 12.0, 30.0, 40.0, Color::rgb(255, 0, 0))
                .with_label("nodule 0.91"),
        ),
        Shape::Circle(CircleShape::new(Point::new(50.0, 60.0), 7.5, Color::default())),
        Shape::Freehand(path),
        Shape::Text(TextShape::new("Left", Point::new(20.0, 80.0), Color::rgb(255, 255, 0), 1.5)),
        Shape::Measurement(MeasurementMark::new(
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Some(15.0),
            Color::rgb(0, 255, 255),
        )),
    ];
    let calibration = Calibration::new(100.0, 15.0, LengthUnit::Millimeter).unwrap();
    canvas.load_image(RgbaImage::new(120, 120), shapes, Some(calibration));
    canvas.set_zoom_percent(180.0);
    canvas
}

#[test]
fn test_document_round_trip() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("annotations.json");
    let canvas = annotated_canvas();

    let document = AnnotationDocument::from_canvas(&canvas, Some("img-42".to_string()));
    document.save_to_file(&file).unwrap();
    let loaded = AnnotationDocument::load_from_file(&file).unwrap();

    assert_eq!(loaded.version, "1.0");
    assert_eq!(loaded.metadata.image_id.as_deref(), Some("img-42"));
    assert_eq!(loaded.metadata.created, document.metadata.created);
    assert_eq!(loaded.shapes, canvas.shapes().list());
    assert_eq!(loaded.calibration, canvas.calibration().calibration().copied());
    assert_eq!(loaded.view.unwrap().zoom_percent, 180.0);
}

#[test]
fn test_loaded_document_restores_canvas() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("annotations.json");
    AnnotationDocument::from_canvas(&annotated_canvas(), None)
        .save_to_file(&file)
        .unwrap();

    let document = AnnotationDocument::load_from_file(&file).unwrap();
    let mut canvas =
        Canvas::with_metrics(&Config::default(), Box::new(FixedAdvanceMetrics::new(16.0)));
    canvas.load_image(RgbaImage::new(120, 120), document.shapes, document.calibration);

    assert_eq!(canvas.shapes().len(), 5);
    assert_eq!(canvas.format_length(200.0), "30.0 mm");
}

#[test]
fn test_shapes_are_tagged_by_kind() {
    let document = AnnotationDocument::from_canvas(&annotated_canvas(), None);
    let json = serde_json::to_value(&document).unwrap();
    let kinds: Vec<&str> = json["shapes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["kind"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, ["rectangle", "circle", "freehand", "text", "measurement"]);
    assert_eq!(json["shapes"][0]["color"], "#ff0000");
}

#[test]
fn test_degenerate_calibration_is_dropped_on_load() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("broken.json");
    let json = r#"{
        "version": "1.0",
        "metadata": {
            "created": "2024-05-01T10:00:00Z",
            "modified": "2024-05-01T10:00:00Z"
        },
        "calibration": { "pixel_length": 0.0, "real_length": 15.0, "unit": "mm" }
    }"#;
    std::fs::write(&file, json).unwrap();

    let document = AnnotationDocument::load_from_file(&file).unwrap();
    assert!(document.calibration.is_none());
    assert!(document.shapes.is_empty());
    assert!(document.metadata.image_id.is_none());
}

#[test]
fn test_missing_and_malformed_files_fail() {
    let dir = TempDir::new().unwrap();
    assert!(AnnotationDocument::load_from_file(dir.path().join("absent.json")).is_err());

    let file = dir.path().join("garbage.json");
    std::fs::write(&file, "{ not json").unwrap();
    let err = AnnotationDocument::load_from_file(&file).unwrap_err();
    assert!(err.to_string().contains("Failed to parse"));
}
