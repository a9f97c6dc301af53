//! Score normalization and annotation extraction.

use std::collections::BTreeMap;

use image::Luma;
use imageproc::contours::{find_contours, BorderType};
use imageproc::region_labelling::{connected_components, Connectivity};
use ndarray::Array2;

use super::params::ModelParameters;
use super::preprocess::{gray_from_array, resize_map, resize_nearest};
use super::runtime::RawPrediction;
use crate::dataset::{Annotation, Point, ScoredLabel, Shape};
use crate::label::Label;

/// Map a raw score onto `[0, 1]` with the threshold landing on 0.5.
pub fn normalize(value: f32, threshold: f64, normalization_scale: f64) -> f32 {
    ((f64::from(value) - threshold) / normalization_scale + 0.5).clamp(0.0, 1.0) as f32
}

/// Post-processed prediction for one image.
#[derive(Debug, Clone, PartialEq)]
pub struct AnomalyResult {
    /// Normalized heat map scaled to `0..=255`, at image resolution.
    pub anomaly_map: Array2<u8>,
    pub pred_label: String,
    /// Binary mask (`0`/`1`) of pixels above the pixel threshold.
    pub pred_mask: Array2<u8>,
    /// Normalized image score in `[0, 1]`.
    pub pred_score: f32,
}

impl AnomalyResult {
    /// Heat map in `[0, 1]`.
    pub fn heat(&self) -> Array2<f32> {
        self.anomaly_map.mapv(|v| f32::from(v) / 255.0)
    }
}

pub(crate) fn postprocess(
    raw: RawPrediction,
    params: &ModelParameters,
    image_size: (usize, usize),
) -> AnomalyResult {
    let RawPrediction {
        anomaly_map,
        pred_score,
    } = raw;
    let score = pred_score
        .unwrap_or_else(|| anomaly_map.iter().copied().fold(f32::NEG_INFINITY, f32::max));

    let pred_label = if f64::from(score) > params.image_threshold {
        params.anomalous_label()
    } else {
        params.normal_label()
    };

    let pixel_threshold = params.pixel_threshold;
    let mask = anomaly_map.mapv(|v| u8::from(f64::from(v) >= pixel_threshold));
    let normalized = anomaly_map.mapv(|v| normalize(v, pixel_threshold, params.normalization_scale));

    let (height, width) = image_size;
    let resized = resize_map(&normalized, height, width);

    AnomalyResult {
        anomaly_map: resized.mapv(|v| (v * 255.0).round().clamp(0.0, 255.0) as u8),
        pred_label: pred_label.to_string(),
        pred_mask: resize_nearest(&mask, height, width),
        pred_score: normalize(score, params.image_threshold, params.normalization_scale),
    }
}

/// A connected region of the mask.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    /// `(y, x)` pixels in raster order.
    pub pixels: Vec<(usize, usize)>,
    /// Inclusive pixel bounds `(x_min, y_min, x_max, y_max)`.
    pub bounds: (usize, usize, usize, usize),
    /// Outer border as `(x, y)` pixels in tracing order, starting at the
    /// top-left-most pixel. Thin branches are walked out and back.
    pub contour: Vec<(usize, usize)>,
}

fn pixel_bounds(pixels: &[(usize, usize)]) -> Option<(usize, usize, usize, usize)> {
    let (&(y0, x0), rest) = pixels.split_first()?;
    Some(rest.iter().fold((x0, y0, x0, y0), |(x_min, y_min, x_max, y_max), &(y, x)| {
        (x_min.min(x), y_min.min(y), x_max.max(x), y_max.max(y))
    }))
}

/// 8-connected regions of non-zero mask pixels, in raster order of their
/// first pixel.
///
/// Each region comes from one outer border; holes belong to the region
/// that encloses them.
pub fn mask_regions(mask: &Array2<u8>) -> Vec<Region> {
    let bitmap = gray_from_array(&mask.mapv(|v| if v == 0 { 0 } else { 255 }));
    let labels = connected_components(&bitmap, Connectivity::Eight, Luma([0u8]));

    let mut members: BTreeMap<u32, Vec<(usize, usize)>> = BTreeMap::new();
    for (x, y, label) in labels.enumerate_pixels() {
        if label[0] != 0 {
            members.entry(label[0]).or_default().push((y as usize, x as usize));
        }
    }

    find_contours::<u32>(&bitmap)
        .into_iter()
        .filter(|contour| matches!(contour.border_type, BorderType::Outer))
        .filter_map(|contour| {
            let first = contour.points.first()?;
            let pixels = members.remove(&labels.get_pixel(first.x, first.y)[0])?;
            let bounds = pixel_bounds(&pixels)?;
            let contour = contour
                .points
                .iter()
                .map(|p| (p.x as usize, p.y as usize))
                .collect();
            Some(Region {
                pixels,
                bounds,
                contour,
            })
        })
        .collect()
}

fn normalized_box(bounds: (usize, usize, usize, usize), (h, w): (usize, usize)) -> (f64, f64, f64, f64) {
    let (x_min, y_min, x_max, y_max) = bounds;
    (
        x_min as f64 / w as f64,
        y_min as f64 / h as f64,
        (x_max + 1) as f64 / w as f64,
        (y_max + 1) as f64 / h as f64,
    )
}

/// One rectangle per connected mask region, scored by the region's peak heat.
pub fn detection_annotations(mask: &Array2<u8>, heat: &Array2<f32>, label: &Label) -> Vec<Annotation> {
    let size = mask.dim();
    mask_regions(mask)
        .into_iter()
        .map(|region| {
            let score = region
                .pixels
                .iter()
                .map(|&p| heat[p])
                .fold(0.0f32, f32::max);
            let (x1, y1, x2, y2) = normalized_box(region.bounds, size);
            Annotation::new(
                Shape::Rectangle { x1, y1, x2, y2 },
                vec![ScoredLabel::new(label.clone(), f64::from(score))],
            )
        })
        .collect()
}

/// One polygon per connected mask region, scored by the region's mean heat.
pub fn segmentation_annotations(mask: &Array2<u8>, heat: &Array2<f32>, label: &Label) -> Vec<Annotation> {
    let (h, w) = mask.dim();
    mask_regions(mask)
        .into_iter()
        .map(|region| {
            let total: f32 = region.pixels.iter().map(|&p| heat[p]).sum();
            let score = total / region.pixels.len() as f32;

            let points = if region.contour.len() >= 3 {
                region
                    .contour
                    .into_iter()
                    .map(|(x, y)| Point {
                        x: x as f64 / w as f64,
                        y: y as f64 / h as f64,
                    })
                    .collect()
            } else {
                let (x1, y1, x2, y2) = normalized_box(region.bounds, (h, w));
                vec![
                    Point { x: x1, y: y1 },
                    Point { x: x2, y: y1 },
                    Point { x: x2, y: y2 },
                    Point { x: x1, y: y2 },
                ]
            };
            Annotation::new(
                Shape::Polygon { points },
                vec![ScoredLabel::new(label.clone(), f64::from(score))],
            )
        })
        .collect()
}
