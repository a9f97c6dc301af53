//! Metadata resolution across schema versions.

use super::record::AnomalyMetadata;
use super::schema::StoredMetadata;
use crate::config::{AnomalyHyperParameters, TaskType};
use crate::model::ModelArtifact;
use crate::transform::TransformPipeline;
use crate::{Error, Result};

/// Normalized metadata of `model`, whichever schema it is stored in.
///
/// Legacy models do not store their transform or task kind; both are
/// rebuilt from the hyperparameters and the template's task type.
pub fn resolve_metadata(
    model: Option<&ModelArtifact>,
    hyper_parameters: &AnomalyHyperParameters,
    task_type: TaskType,
) -> Result<AnomalyMetadata> {
    let model = model.ok_or(Error::NoModel {
        operation: "access metadata",
    })?;

    match StoredMetadata::probe(model)? {
        StoredMetadata::Current(blob) => Ok(blob.into_metadata(task_type.task_kind())),
        StoredMetadata::Legacy { blobs, .. } => {
            let (image_threshold, pixel_threshold, min, max) = blobs.scalars();
            let transform = TransformPipeline::from_settings(
                &hyper_parameters.dataset.transform,
                hyper_parameters.dataset.image_size,
            )?;
            Ok(AnomalyMetadata {
                transform: Some(transform),
                image_threshold,
                pixel_threshold,
                min,
                max,
                task: task_type.task_kind(),
                extra: Default::default(),
            })
        }
    }
}
