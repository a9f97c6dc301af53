//! Model parameters read from the graph's `model_info`.

use crate::config::AnomalyTaskKind;
use crate::ir::{IrGraph, ModelInfo};
use crate::metadata::MODEL_TYPE;
use crate::{Error, Result};

/// Everything the inference wrapper needs from `model_info`.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelParameters {
    pub image_threshold: f64,
    pub pixel_threshold: f64,
    pub normalization_scale: f64,
    pub task: AnomalyTaskKind,
    /// Runtime label names, normal first.
    pub labels: Vec<String>,
    pub mean_values: Vec<f64>,
    pub scale_values: Vec<f64>,
    pub reverse_input_channels: bool,
    /// Network input `(height, width)`.
    pub input_size: (usize, usize),
}

fn load_error(message: impl Into<String>) -> Error {
    Error::ModelLoad {
        message: message.into(),
    }
}

fn required_f64(info: &ModelInfo, key: &str) -> Result<f64> {
    info.get(key)
        .and_then(|v| v.as_f64())
        .ok_or_else(|| load_error(format!("model_info has no numeric '{key}'")))
}

impl ModelParameters {
    /// Read parameters from a graph, failing with [`Error::ModelLoad`] when
    /// the graph does not describe an anomaly model.
    pub fn from_graph(graph: &IrGraph) -> Result<Self> {
        let info = graph
            .model_info()
            .ok_or_else(|| load_error("graph has no rt_info/model_info section"))?;

        match info.get("model_type").and_then(|v| v.as_str()) {
            Some(MODEL_TYPE) => {}
            Some(other) => return Err(load_error(format!("unexpected model_type '{other}'"))),
            None => return Err(load_error("model_info has no model_type")),
        }

        let task = info
            .get("task")
            .and_then(|v| v.as_str())
            .ok_or_else(|| load_error("model_info has no task"))?
            .parse::<AnomalyTaskKind>()
            .map_err(load_error)?;

        let labels = info
            .get("labels")
            .and_then(|v| v.as_str())
            .map_or_else(
                || vec!["Normal".to_string(), "Anomaly".to_string()],
                |s| s.split_whitespace().map(str::to_string).collect(),
            );
        if labels.len() != 2 {
            return Err(load_error(format!("expected two labels, got {labels:?}")));
        }

        let input_size = match graph.input_shape().as_deref() {
            Some([_, _, h, w]) => (*h, *w),
            _ => {
                let dim = |key: &str| {
                    required_f64(&info, key).map(|v| v as usize).map_err(|_| {
                        load_error(format!("cannot infer input size: no NCHW input and no '{key}'"))
                    })
                };
                (dim("orig_height")?, dim("orig_width")?)
            }
        };
        if input_size.0 == 0 || input_size.1 == 0 {
            return Err(load_error("input size must be positive"));
        }

        let normalization_scale = required_f64(&info, "normalization_scale")?;
        if normalization_scale <= 0.0 {
            return Err(load_error(format!(
                "normalization_scale must be positive, got {normalization_scale}"
            )));
        }

        Ok(Self {
            image_threshold: required_f64(&info, "image_threshold")?,
            pixel_threshold: required_f64(&info, "pixel_threshold")?,
            normalization_scale,
            task,
            labels,
            mean_values: info
                .get("mean_values")
                .and_then(|v| v.as_f64_list())
                .unwrap_or_else(|| vec![0.0]),
            scale_values: info
                .get("scale_values")
                .and_then(|v| v.as_f64_list())
                .unwrap_or_else(|| vec![1.0]),
            reverse_input_channels: info
                .get("reverse_input_channels")
                .and_then(|v| v.as_bool())
                .unwrap_or(false),
            input_size,
        })
    }

    pub fn normal_label(&self) -> &str {
        &self.labels[0]
    }

    pub fn anomalous_label(&self) -> &str {
        &self.labels[1]
    }
}
