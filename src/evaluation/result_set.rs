//! Result sets and task-specific performance.

use serde::Serialize;

use super::metrics::{dice, iou, rasterize, BinaryCounts, IOU_THRESHOLD};
use crate::dataset::{Annotation, Dataset, DatasetItem, Shape};
use crate::{Error, Result};

/// A named score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreMetric {
    pub name: String,
    pub value: f64,
}

impl ScoreMetric {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Headline score plus supporting metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Performance {
    pub score: ScoreMetric,
    pub dashboard_metrics: Vec<ScoreMetric>,
}

/// Ground truth and predictions for the same images, item by item.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    pub ground_truth: Dataset,
    pub prediction: Dataset,
    pub performance: Option<Performance>,
}

impl ResultSet {
    pub fn new(ground_truth: Dataset, prediction: Dataset) -> Self {
        Self {
            ground_truth,
            prediction,
            performance: None,
        }
    }

    fn pairs(&self) -> Result<impl Iterator<Item = (&DatasetItem, &DatasetItem)> + '_> {
        if self.ground_truth.len() != self.prediction.len() {
            return Err(Error::Shape {
                message: format!(
                    "result set has {} ground-truth items but {} predictions",
                    self.ground_truth.len(),
                    self.prediction.len()
                ),
            });
        }
        Ok(self.ground_truth.iter().zip(self.prediction.iter()))
    }
}

fn image_counts(result_set: &ResultSet) -> Result<BinaryCounts> {
    let mut counts = BinaryCounts::default();
    for (truth, predicted) in result_set.pairs()? {
        counts.record(truth.is_anomalous(), predicted.is_anomalous());
    }
    Ok(counts)
}

/// Anomalous local shapes; full-image boxes are image-level labels.
fn local_shapes(item: &DatasetItem) -> impl Iterator<Item = &Annotation> + '_ {
    item.annotations
        .iter()
        .filter(|a| a.is_anomalous() && !a.shape.is_full_box())
}

fn annotation_score(annotation: &Annotation) -> f64 {
    annotation
        .labels
        .iter()
        .map(|l| l.probability)
        .fold(0.0, f64::max)
}

/// Greedy matching, most confident prediction first.
fn box_counts(truth: &DatasetItem, predicted: &DatasetItem) -> BinaryCounts {
    let truth_shapes: Vec<&Shape> = local_shapes(truth).map(|a| &a.shape).collect();
    let mut predictions: Vec<&Annotation> = local_shapes(predicted).collect();
    predictions.sort_by(|a, b| annotation_score(b).total_cmp(&annotation_score(a)));

    let mut matched = vec![false; truth_shapes.len()];
    let mut counts = BinaryCounts::default();
    for prediction in predictions {
        let best = truth_shapes
            .iter()
            .enumerate()
            .filter(|(i, _)| !matched[*i])
            .map(|(i, shape)| (i, iou(shape, &prediction.shape)))
            .filter(|(_, overlap)| *overlap >= IOU_THRESHOLD)
            .max_by(|a, b| a.1.total_cmp(&b.1));
        match best {
            Some((i, _)) => {
                matched[i] = true;
                counts.true_positives += 1;
            }
            None => counts.false_positives += 1,
        }
    }
    counts.false_negatives += matched.iter().filter(|m| !**m).count();
    counts
}

/// Image-level F-measure.
pub fn compute_f_measure(result_set: &ResultSet) -> Result<Performance> {
    let counts = image_counts(result_set)?;
    Ok(Performance {
        score: ScoreMetric::new("f-measure", counts.f_measure()),
        dashboard_metrics: vec![
            ScoreMetric::new("precision", counts.precision()),
            ScoreMetric::new("recall", counts.recall()),
        ],
    })
}

/// Box F-measure at [`IOU_THRESHOLD`], with the image-level F-measure on the side.
pub fn compute_anomaly_detection_scores(result_set: &ResultSet) -> Result<Performance> {
    let image = image_counts(result_set)?;
    let mut boxes = BinaryCounts::default();
    for (truth, predicted) in result_set.pairs()? {
        boxes.merge(box_counts(truth, predicted));
    }
    Ok(Performance {
        score: ScoreMetric::new("local f-measure", boxes.f_measure()),
        dashboard_metrics: vec![ScoreMetric::new("global f-measure", image.f_measure())],
    })
}

/// Mean pixel Dice over images where either side marks anything, with the
/// image-level F-measure on the side.
pub fn compute_anomaly_segmentation_scores(result_set: &ResultSet) -> Result<Performance> {
    let image = image_counts(result_set)?;
    let mut scores = Vec::new();
    for (truth, predicted) in result_set.pairs()? {
        let size = truth.size();
        let truth_mask = rasterize(local_shapes(truth).map(|a| &a.shape), size);
        let predicted_mask = rasterize(local_shapes(predicted).map(|a| &a.shape), size);
        scores.extend(dice(&truth_mask, &predicted_mask));
    }
    let mean_dice = if scores.is_empty() {
        1.0
    } else {
        scores.iter().sum::<f64>() / scores.len() as f64
    };
    Ok(Performance {
        score: ScoreMetric::new("dice average", mean_dice),
        dashboard_metrics: vec![ScoreMetric::new("global f-measure", image.f_measure())],
    })
}
