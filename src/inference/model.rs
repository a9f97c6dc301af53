//! Anomaly model wrapper around a runtime backend.

use std::fmt;

use ndarray::Array3;
use tracing::debug;

use super::params::ModelParameters;
use super::postprocess::{postprocess, AnomalyResult};
use super::preprocess::Preprocessor;
use super::runtime::{InferenceBackend, InferenceRuntime};
use crate::ir::IrGraph;
use crate::Result;

/// A loaded anomaly model: parameters from `model_info` plus a backend.
pub struct AnomalyDetectionModel {
    params: ModelParameters,
    preprocessor: Preprocessor,
    backend: Box<dyn InferenceBackend>,
}

impl fmt::Debug for AnomalyDetectionModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnomalyDetectionModel")
            .field("params", &self.params)
            .field("preprocessor", &self.preprocessor)
            .finish_non_exhaustive()
    }
}

impl AnomalyDetectionModel {
    /// Load an IR pair.
    ///
    /// # Errors
    ///
    /// [`crate::Error::InvalidIr`] if the xml is not a graph at all,
    /// [`crate::Error::ModelLoad`] if it lacks anomaly `model_info`, and
    /// whatever the runtime reports when compiling.
    pub fn create(xml: &[u8], bin: &[u8], runtime: &dyn InferenceRuntime) -> Result<Self> {
        let graph = IrGraph::parse(xml)?;
        let params = ModelParameters::from_graph(&graph)?;
        let backend = runtime.load(&graph, bin)?;
        debug!(
            task = %params.task,
            input_height = params.input_size.0,
            input_width = params.input_size.1,
            "Loaded anomaly model"
        );
        Ok(Self {
            preprocessor: Preprocessor::from_parameters(&params),
            params,
            backend,
        })
    }

    pub fn parameters(&self) -> &ModelParameters {
        &self.params
    }

    pub fn preprocessor(&self) -> &Preprocessor {
        &self.preprocessor
    }

    /// Run one HWC `u8` image end to end.
    pub fn predict(&mut self, image: &Array3<u8>) -> Result<AnomalyResult> {
        let (height, width, _) = image.dim();
        let input = self.preprocessor.preprocess(image);
        let raw = self.backend.forward(&input)?;
        Ok(postprocess(raw, &self.params, (height, width)))
    }
}
