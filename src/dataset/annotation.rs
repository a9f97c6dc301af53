//! Shapes, scored labels and annotations.

use serde::{Deserialize, Serialize};

use crate::label::Label;

/// A label with a confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredLabel {
    pub label: Label,
    pub probability: f64,
}

impl ScoredLabel {
    pub fn new(label: Label, probability: f64) -> Self {
        Self { label, probability }
    }
}

/// Point in normalized image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Annotation geometry in normalized `[0, 1]` image coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    Rectangle { x1: f64, y1: f64, x2: f64, y2: f64 },
    Polygon { points: Vec<Point> },
}

impl Shape {
    /// The whole image.
    pub fn full_box() -> Self {
        Shape::Rectangle {
            x1: 0.0,
            y1: 0.0,
            x2: 1.0,
            y2: 1.0,
        }
    }

    /// Bounding box as `(x1, y1, x2, y2)`.
    pub fn bounding_box(&self) -> (f64, f64, f64, f64) {
        match self {
            Shape::Rectangle { x1, y1, x2, y2 } => (*x1, *y1, *x2, *y2),
            Shape::Polygon { points } => points.iter().fold(
                (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
                |(x1, y1, x2, y2), p| (x1.min(p.x), y1.min(p.y), x2.max(p.x), y2.max(p.y)),
            ),
        }
    }

    pub fn is_full_box(&self) -> bool {
        matches!(self, Shape::Rectangle { x1, y1, x2, y2 } if *x1 <= 0.0 && *y1 <= 0.0 && *x2 >= 1.0 && *y2 >= 1.0)
    }

    /// Whether the normalized point lies inside the shape.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        match self {
            Shape::Rectangle { x1, y1, x2, y2 } => x >= *x1 && x <= *x2 && y >= *y1 && y <= *y2,
            Shape::Polygon { points } => {
                // even-odd rule
                let mut inside = false;
                let n = points.len();
                let mut j = n.wrapping_sub(1);
                for i in 0..n {
                    let (pi, pj) = (points[i], points[j]);
                    if (pi.y > y) != (pj.y > y)
                        && x < (pj.x - pi.x) * (y - pi.y) / (pj.y - pi.y) + pi.x
                    {
                        inside = !inside;
                    }
                    j = i;
                }
                inside
            }
        }
    }
}

/// A shape with its labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub shape: Shape,
    pub labels: Vec<ScoredLabel>,
}

impl Annotation {
    pub fn new(shape: Shape, labels: Vec<ScoredLabel>) -> Self {
        Self { shape, labels }
    }

    pub fn is_anomalous(&self) -> bool {
        self.labels.iter().any(|l| l.label.is_anomalous)
    }
}
