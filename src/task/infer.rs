//! Inference over datasets and evaluation of the results.

use tracing::info;

use super::openvino::OpenVinoTask;
use crate::config::{AnomalyTaskKind, TaskType};
use crate::dataset::{Dataset, ResultMedia, ScoredLabel};
use crate::evaluation::{
    compute_anomaly_detection_scores, compute_anomaly_segmentation_scores, compute_f_measure,
    ResultSet,
};
use crate::inference::{detection_annotations, segmentation_annotations};
use crate::progress::{percent_of, InferenceParameters};
use crate::{Error, Result};

fn anomaly_kind(task_type: TaskType) -> Result<AnomalyTaskKind> {
    task_type
        .anomaly_kind()
        .ok_or(Error::UnknownTaskType { task_type })
}

impl OpenVinoTask {
    /// Predict every item of `dataset`, attaching labels, annotations and
    /// an "Anomaly Map" media to each.
    pub fn infer(
        &mut self,
        mut dataset: Dataset,
        mut parameters: Option<&mut InferenceParameters>,
    ) -> Result<Dataset> {
        let span = self.span.clone();
        let _guard = span.enter();

        self.model("calculate labels")?;
        let kind = anomaly_kind(self.task_type())?;
        let model = self.inference_model.as_mut().ok_or(Error::NoModel {
            operation: "run inference",
        })?;
        info!(items = dataset.len(), "Start OpenVINO inference");

        let total = dataset.len();
        let anomaly_name = model.parameters().anomalous_label().to_string();
        for (index, item) in dataset.items.iter_mut().enumerate() {
            let result = model.predict(&item.image)?;
            let score = f64::from(result.pred_score);
            let probability = if result.pred_label == anomaly_name {
                score
            } else {
                1.0 - score
            };

            let label = match kind {
                AnomalyTaskKind::Classification => {
                    if score >= 0.5 {
                        &self.anomalous_label
                    } else {
                        &self.normal_label
                    }
                }
                AnomalyTaskKind::Detection | AnomalyTaskKind::Segmentation => {
                    let heat = result.heat();
                    let annotations = if kind == AnomalyTaskKind::Detection {
                        detection_annotations(&result.pred_mask, &heat, &self.anomalous_label)
                    } else {
                        segmentation_annotations(&result.pred_mask, &heat, &self.anomalous_label)
                    };
                    let label = if annotations.is_empty() {
                        &self.normal_label
                    } else {
                        &self.anomalous_label
                    };
                    item.append_annotations(annotations);
                    label
                }
            };

            item.append_labels([ScoredLabel::new(label.clone(), probability)]);
            item.append_metadata_item(ResultMedia {
                name: "Anomaly Map".to_string(),
                media_type: "anomaly_map".to_string(),
                label: label.clone(),
                numpy: result.anomaly_map,
            });
            if let Some(p) = parameters.as_deref_mut() {
                p.update_progress(percent_of(index + 1, total));
            }
        }
        info!("OpenVINO inference completed");
        Ok(dataset)
    }

    /// Score `result_set` with the metric of the task kind.
    pub fn evaluate(&self, result_set: &mut ResultSet) -> Result<()> {
        let _guard = self.span.enter();
        let performance = match anomaly_kind(self.task_type())? {
            AnomalyTaskKind::Classification => compute_f_measure(result_set)?,
            AnomalyTaskKind::Detection => compute_anomaly_detection_scores(result_set)?,
            AnomalyTaskKind::Segmentation => compute_anomaly_segmentation_scores(result_set)?,
        };
        info!(
            metric = %performance.score.name,
            value = performance.score.value,
            "Evaluation completed"
        );
        result_set.performance = Some(performance);
        Ok(())
    }
}
