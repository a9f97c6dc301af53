//! Seam to the inference engine.

use ndarray::{Array2, Array3};

use crate::ir::IrGraph;
use crate::Result;

/// Raw network output for one image.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPrediction {
    /// Per-pixel anomaly scores at network output resolution.
    pub anomaly_map: Array2<f32>,
    /// Image score, when the network has a dedicated output for it.
    /// Defaults to the maximum of the map.
    pub pred_score: Option<f32>,
}

/// A compiled model ready to run.
pub trait InferenceBackend: Send {
    /// Run the network on one preprocessed CHW input.
    fn forward(&mut self, input: &Array3<f32>) -> Result<RawPrediction>;
}

/// Loads IR pairs into runnable backends.
pub trait InferenceRuntime: Send + Sync {
    fn load(&self, graph: &IrGraph, weights: &[u8]) -> Result<Box<dyn InferenceBackend>>;
}
