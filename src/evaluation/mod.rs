//! Evaluation of anomaly predictions
//!
//! Image-level scores come from the first label of each item. Detection
//! adds box matching at IoU 0.5, segmentation adds pixel Dice over the
//! rasterized anomalous shapes.

mod metrics;
mod result_set;


pub use metrics::{dice, iou, rasterize, BinaryCounts, IOU_THRESHOLD};
pub use result_set::{
    compute_anomaly_detection_scores, compute_anomaly_segmentation_scores, compute_f_measure,
    Performance, ResultSet, ScoreMetric,
};
