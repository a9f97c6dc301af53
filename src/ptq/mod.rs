//! PTQ (Post-Training Quantization) orchestration seam
//!
//! The quantization algorithm itself lives behind [`Quantizer`]. This module
//! owns what surrounds it:
//! - Optimization type and preset enums
//! - The typed quantization config, merged from an optional template file
//! - The dataset adapter feeding calibration inputs to the quantizer

mod config;
mod dataset;
mod types;


pub use config::{IgnoredScope, QuantizationConfig, PTQ_CONFIG_FILE};
pub use dataset::QuantizationDataset;
pub use types::{OptimizationType, QuantizationPreset, Quantizer};
