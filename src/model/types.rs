//! Descriptive model attributes.

use serde::{Deserialize, Serialize};

/// Serialization format of the stored model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModelFormat {
    #[default]
    #[serde(rename = "OPENVINO")]
    OpenVino,
    Onnx,
    BaseFramework,
}

/// How the stored model was produced from the trained one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModelOptimizationType {
    #[default]
    None,
    /// Converted with the model optimizer, no compression.
    Mo,
    /// Post-training quantization.
    Pot,
    Nncf,
}

/// Compression methods applied to a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OptimizationMethod {
    Quantization,
    FilterPruning,
}

/// Numeric precision of the weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModelPrecision {
    Fp32,
    Fp16,
    Int8,
}

impl std::fmt::Display for ModelPrecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelPrecision::Fp32 => write!(f, "FP32"),
            ModelPrecision::Fp16 => write!(f, "FP16"),
            ModelPrecision::Int8 => write!(f, "INT8"),
        }
    }
}
