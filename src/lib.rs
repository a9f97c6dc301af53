//! Deployment and optimization pipeline for OpenVINO anomaly models.
//!
//! This crate provides:
//! - Metadata resolution across the legacy (per-field blobs) and current
//!   (single JSON blob) storage schemas
//! - One-time migration of legacy models, embedding metadata into the IR's
//!   `rt_info/model_info` section
//! - Post-training quantization orchestration around a pluggable quantizer
//! - Packaging of a self-contained deployment zip
//! - Inference and evaluation for anomaly classification, detection and
//!   segmentation
//!
//! The inference engine and the quantization algorithm stay external, behind
//! [`inference::InferenceRuntime`] and [`ptq::Quantizer`].

pub mod calibration;
pub mod config;
pub mod dataset;
pub mod deploy;
pub mod error;
pub mod evaluation;
pub mod inference;
pub mod ir;
pub mod label;
pub mod metadata;
pub mod model;
pub mod progress;
pub mod ptq;
pub mod task;
pub mod transform;

#[cfg(test)]
mod test_support;

pub use config::{AnomalyHyperParameters, ModelTemplate, TaskEnvironment, TaskType};
pub use error::{Error, Result};
pub use model::ModelArtifact;
pub use ptq::OptimizationType;
pub use task::OpenVinoTask;
