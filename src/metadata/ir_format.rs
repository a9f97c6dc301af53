//! Metadata in the flattened `model_info` layout of the IR.

use serde_json::Value;
use tracing::warn;

use super::record::AnomalyMetadata;
use crate::ir::{ModelInfo, RtValue};
use crate::transform::TransformSpec;

/// Model type tag read by the inference runtime.
pub const MODEL_TYPE: &str = "AnomalyDetection";
/// Runtime-side label names, space-separated.
pub const MODELAPI_LABELS: &str = "Normal Anomaly";

fn json_to_rt(value: &Value) -> RtValue {
    match value {
        Value::String(s) => RtValue::Str(s.clone()),
        Value::Bool(b) => RtValue::Bool(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => RtValue::Int(i),
            None => RtValue::Float(n.as_f64().unwrap_or_default()),
        },
        Value::Array(items) => match items.iter().map(Value::as_f64).collect::<Option<Vec<_>>>() {
            Some(numbers) => RtValue::List(numbers),
            None => RtValue::Str(value.to_string()),
        },
        Value::Null | Value::Object(_) => RtValue::Str(value.to_string()),
    }
}

/// Flatten metadata into `model_info` entries.
///
/// Normalization becomes `mean_values`/`scale_values` in the 0-255 range,
/// resize becomes `orig_height`/`orig_width`, and `min`/`max` collapse into
/// `normalization_scale`. Other transforms are skipped with a warning.
pub fn metadata_in_ir_format(metadata: &AnomalyMetadata) -> ModelInfo {
    let mut info = ModelInfo::new();
    info.insert("image_threshold".into(), RtValue::from(metadata.image_threshold));
    info.insert("pixel_threshold".into(), RtValue::from(metadata.pixel_threshold));
    info.insert("task".into(), RtValue::from(metadata.task.as_str()));
    for (key, value) in &metadata.extra {
        info.insert(key.clone(), json_to_rt(value));
    }

    if let Some(transform) = &metadata.transform {
        for spec in &transform.transforms {
            match spec {
                TransformSpec::Normalize { mean, std, .. } => {
                    info.insert(
                        "mean_values".into(),
                        RtValue::List(mean.iter().map(|x| x * 255.0).collect()),
                    );
                    info.insert(
                        "scale_values".into(),
                        RtValue::List(std.iter().map(|x| x * 255.0).collect()),
                    );
                }
                TransformSpec::Resize { height, width } => {
                    info.insert("orig_height".into(), RtValue::Int(i64::from(*height)));
                    info.insert("orig_width".into(), RtValue::Int(i64::from(*width)));
                }
                other => warn!("Transform {} is not supported currently", other.class_name()),
            }
        }
    }

    info.insert(
        "normalization_scale".into(),
        RtValue::Float(metadata.normalization_scale()),
    );
    info.insert("reverse_input_channels".into(), RtValue::Bool(false));
    info.insert("model_type".into(), RtValue::from(MODEL_TYPE));
    info.insert("labels".into(), RtValue::from(MODELAPI_LABELS));
    info
}
