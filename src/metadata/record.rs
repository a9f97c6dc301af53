//! Normalized metadata record.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::config::AnomalyTaskKind;
use crate::transform::TransformPipeline;

/// Thresholds, normalization statistics and preprocessing of a model.
///
/// Numeric fields are always scalars, whichever schema they were read from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<TransformPipeline>,
    #[serde(deserialize_with = "scalar")]
    pub image_threshold: f32,
    #[serde(deserialize_with = "scalar")]
    pub pixel_threshold: f32,
    #[serde(deserialize_with = "scalar")]
    pub min: f32,
    #[serde(deserialize_with = "scalar")]
    pub max: f32,
    pub task: AnomalyTaskKind,
    /// Fields this crate does not interpret, kept for round-tripping.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl AnomalyMetadata {
    /// Spread of the raw anomaly scores seen during training.
    pub fn normalization_scale(&self) -> f64 {
        f64::from(self.max) - f64::from(self.min)
    }

    /// Encode as the current single-blob schema.
    pub fn to_bytes(&self) -> crate::Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// Current-schema blob as stored; `task` may be absent in older exports.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentMetadataBlob {
    #[serde(default)]
    pub transform: Option<TransformPipeline>,
    #[serde(deserialize_with = "scalar")]
    pub image_threshold: f32,
    #[serde(deserialize_with = "scalar")]
    pub pixel_threshold: f32,
    #[serde(deserialize_with = "scalar")]
    pub min: f32,
    #[serde(deserialize_with = "scalar")]
    pub max: f32,
    #[serde(default)]
    pub task: Option<AnomalyTaskKind>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl CurrentMetadataBlob {
    pub fn into_metadata(self, fallback_task: AnomalyTaskKind) -> AnomalyMetadata {
        AnomalyMetadata {
            transform: self.transform,
            image_threshold: self.image_threshold,
            pixel_threshold: self.pixel_threshold,
            min: self.min,
            max: self.max,
            task: self.task.unwrap_or(fallback_task),
            extra: self.extra,
        }
    }
}

/// Accept `0.5` as well as the single-element `[0.5]` written by array exports.
fn scalar<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f32, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ScalarOrList {
        Scalar(f64),
        List(Vec<f64>),
    }

    match ScalarOrList::deserialize(deserializer)? {
        ScalarOrList::Scalar(v) => Ok(v as f32),
        ScalarOrList::List(values) if values.len() == 1 => Ok(values[0] as f32),
        ScalarOrList::List(values) => Err(D::Error::custom(format!(
            "expected a scalar or a single-element list, got {} elements",
            values.len()
        ))),
    }
}
