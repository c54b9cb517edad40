use proptest::prelude::*;
use radiokit_services::{AnnotationKind, AnnotationRecord, DetectionResponse};
use radiokit_viewer::{AnnotationShape, Color, FixedAdvanceMetrics, Point};

fn kind() -> impl Strategy<Value = AnnotationKind> {
    prop_oneof![
        Just(AnnotationKind::Rectangle),
        Just(AnnotationKind::Circle),
        Just(AnnotationKind::Freehand),
        Just(AnnotationKind::Text),
        Just(AnnotationKind::Measurement),
        Just(AnnotationKind::Detection),
    ]
}

fn coordinate() -> impl Strategy<Value = f64> {
    prop_oneof![
        8 => -1.0e4..1.0e4f64,
        1 => Just(f64::NAN),
        1 => Just(f64::INFINITY),
    ]
}

fn record() -> impl Strategy<Value = AnnotationRecord> {
    (
        kind(),
        prop::collection::vec((coordinate(), coordinate()), 0..5),
        prop_oneof![Just(0.0), Just(-1.0), Just(f64::NAN), 0.1..5.0f64],
        prop::option::of("[ a-z]{0,6}"),
        prop::option::of("[a-z]{1,6}"),
    )
        .prop_map(|(kind, points, size, text, label)| AnnotationRecord {
            id: None,
            kind,
            points: points.into_iter().map(|(x, y)| Point::new(x, y)).collect(),
            color: Color::default(),
            size,
            measurement: None,
            text,
            label,
        })
}

proptest! {
    #[test]
    fn prop_stored_records_map_to_finite_shapes_or_errors(record in record()) {
        if let Ok(shape) = record.to_shape() {
            let bounds = shape.bounds(&FixedAdvanceMetrics::new(16.0));
            prop_assert!(bounds.min_x.is_finite() && bounds.max_y.is_finite());
            let stored = AnnotationRecord::from_shape(&shape);
            prop_assert!(stored.points.iter().all(|p| p.is_finite()));
        }
    }
}

#[test]
fn test_detection_response_wire_format() {
    let response: DetectionResponse = serde_json::from_str(
        r#"{"detections":[{"box":[10,20,50,80],"label":"fracture","score":0.9}]}"#,
    )
    .unwrap();
    let detection = &response.detections[0];
    assert_eq!(detection.bounds, [10.0, 20.0, 50.0, 80.0]);
    assert_eq!(detection.caption(), "fracture 90%");
}

#[test]
fn test_empty_detection_response() {
    let response: DetectionResponse = serde_json::from_str("{}").unwrap();
    assert!(response.detections.is_empty());
}

#[test]
fn test_annotation_record_wire_format() {
    let record: AnnotationRecord = serde_json::from_str(
        r##"{"id":"a1","type":"CIRCLE","points":[{"x":10,"y":10},{"x":13,"y":14}],"color":"#ff0000"}"##,
    )
    .unwrap();
    assert_eq!(record.kind, AnnotationKind::Circle);
    match record.to_shape().unwrap() {
        radiokit_viewer::Shape::Circle(circle) => assert_eq!(circle.radius, 5.0),
        other => panic!("expected circle, got {:?}", other),
    }
}
