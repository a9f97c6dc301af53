//! Error types with actionable diagnostics.
//!
//! Every variant names what went wrong and, where there is one, what the
//! operator should do about it. Nothing in this crate retries on its own.

use std::path::PathBuf;
use thiserror::Error;

use crate::config::TaskType;
use crate::ptq::OptimizationType;

/// Result type alias for deployment operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the deployment and optimization pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// The task environment has no trained model attached.
    #[error("No model attached to the task environment, cannot {operation}\n  → Attach a trained model artifact before calling this operation")]
    NoModel { operation: &'static str },

    /// Only post-training quantization is supported.
    #[error("Unsupported optimization type: {requested}\n  → PTQ (POT) is the only supported optimization type for OpenVINO models")]
    UnsupportedOptimization { requested: OptimizationType },

    /// The graph already carries quantization nodes.
    #[error("Model is already optimized by PTQ\n  → Quantize the original full-precision model instead")]
    AlreadyQuantized,

    /// The task type is not one of the anomaly task kinds.
    #[error("Unknown task type: {task_type}")]
    UnknownTaskType { task_type: TaskType },

    /// A required blob is absent from the model artifact.
    #[error("Model artifact has no data under key '{key}'")]
    MissingData { key: String },

    /// A blob exists but cannot be decoded.
    #[error("Invalid data under key '{key}': {message}")]
    InvalidBlob { key: String, message: String },

    /// The inference model could not be constructed from the IR pair.
    #[error("Failed to load inference model: {message}")]
    ModelLoad { message: String },

    /// The label schema lacks a normal or an anomalous label.
    #[error("Label schema has no {kind} label\n  → Anomaly tasks need exactly one normal and one anomalous label")]
    MissingLabel { kind: &'static str },

    /// The IR graph definition is malformed.
    #[error("Invalid IR graph: {message}")]
    InvalidIr { message: String },

    /// The quantizer reported a failure.
    #[error("Quantization failed: {message}")]
    Quantization { message: String },

    /// A configuration value is invalid.
    #[error("Invalid configuration value for '{field}': {message}")]
    Config { field: String, message: String },

    /// A configuration file could not be parsed.
    #[error("Invalid configuration syntax in {path}:\n  {message}\n  → Check YAML/JSON syntax at the indicated line")]
    ConfigParsing { path: PathBuf, message: String },

    /// Array shape mismatch.
    #[error("Shape error: {message}")]
    Shape { message: String },

    /// IO error with context.
    #[error("IO error: {context}\n  Cause: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Archive error.
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

impl Error {
    /// Create an IO error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a configuration error for a field.
    pub fn config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Failed preconditions abort an operation before any state is written.
    #[must_use]
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::NoModel { .. } | Self::UnsupportedOptimization { .. } | Self::AlreadyQuantized
        )
    }

    /// Whether this is an inference-model construction failure.
    #[must_use]
    pub fn is_model_load(&self) -> bool {
        matches!(self, Self::ModelLoad { .. })
    }
}

impl From<ndarray::ShapeError> for Error {
    fn from(err: ndarray::ShapeError) -> Self {
        Self::Shape {
            message: err.to_string(),
        }
    }
}
