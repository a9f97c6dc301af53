use ndarray::Array3;

use super::*;
use crate::label::LabelSchema;

fn item(anomalous: bool) -> DatasetItem {
    let schema = LabelSchema::anomaly();
    let label = if anomalous {
        schema.anomalous_label().unwrap().clone()
    } else {
        schema.normal_label().unwrap().clone()
    };
    DatasetItem::new(Array3::zeros((4, 6, 3))).with_label(label)
}

#[test]
fn test_anomalous_subset_keeps_only_anomalous() {
    let dataset = Dataset::new(
        vec![item(false), item(true), item(false), item(true)],
        DatasetPurpose::Validation,
    );
    let subset = dataset.anomalous_subset();
    assert_eq!(subset.len(), 2);
    assert!(subset.iter().all(DatasetItem::is_anomalous));
    assert_eq!(subset.purpose, DatasetPurpose::Validation);
}

#[test]
fn test_anomalous_subset_of_normal_only_is_empty() {
    let dataset: Dataset = vec![item(false), item(false)].into_iter().collect();
    assert!(dataset.anomalous_subset().is_empty());
}

#[test]
fn test_unlabeled_item_is_not_anomalous() {
    let item = DatasetItem::new(Array3::zeros((2, 2, 3)));
    assert!(!item.is_anomalous());
    assert_eq!(item.size(), (2, 2));
}

#[test]
fn test_with_empty_predictions_strips_labels() {
    let dataset: Dataset = vec![item(true)].into_iter().collect();
    let empty = dataset.with_empty_predictions();
    assert_eq!(empty.len(), 1);
    assert!(empty.items[0].labels.is_empty());
    assert_eq!(empty.items[0].image, dataset.items[0].image);
}

#[test]
fn test_rectangle_contains_and_bbox() {
    let shape = Shape::Rectangle {
        x1: 0.2,
        y1: 0.2,
        x2: 0.6,
        y2: 0.8,
    };
    assert!(shape.contains(0.4, 0.5));
    assert!(!shape.contains(0.7, 0.5));
    assert_eq!(shape.bounding_box(), (0.2, 0.2, 0.6, 0.8));
    assert!(!shape.is_full_box());
    assert!(Shape::full_box().is_full_box());
}

#[test]
fn test_polygon_contains() {
    let triangle = Shape::Polygon {
        points: vec![
            Point { x: 0.0, y: 0.0 },
            Point { x: 1.0, y: 0.0 },
            Point { x: 0.0, y: 1.0 },
        ],
    };
    assert!(triangle.contains(0.2, 0.2));
    assert!(!triangle.contains(0.8, 0.8));
    assert_eq!(triangle.bounding_box(), (0.0, 0.0, 1.0, 1.0));
}

#[test]
fn test_shape_serde_tagged() {
    let json = serde_json::to_value(Shape::full_box()).unwrap();
    assert_eq!(json["type"], "rectangle");
}
