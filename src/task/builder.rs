//! Builder for [`OpenVinoTask`].

use std::sync::Arc;
use tracing::{info, info_span, Span};

use super::openvino::OpenVinoTask;
use crate::calibration::DEFAULT_SEED;
use crate::config::TaskEnvironment;
use crate::deploy::ExportableCodeTemplate;
use crate::inference::InferenceRuntime;
use crate::ptq::Quantizer;
use crate::{Error, Result};

/// Collects the collaborators of an [`OpenVinoTask`].
pub struct OpenVinoTaskBuilder {
    environment: TaskEnvironment,
    runtime: Option<Arc<dyn InferenceRuntime>>,
    quantizer: Option<Arc<dyn Quantizer>>,
    exportable_code: Option<ExportableCodeTemplate>,
    span: Option<Span>,
    calibration_seed: u64,
}

impl OpenVinoTaskBuilder {
    pub(crate) fn new(environment: TaskEnvironment) -> Self {
        Self {
            environment,
            runtime: None,
            quantizer: None,
            exportable_code: None,
            span: None,
            calibration_seed: DEFAULT_SEED,
        }
    }

    /// Runtime that compiles IR pairs. Required.
    pub fn runtime(mut self, runtime: Arc<dyn InferenceRuntime>) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Quantizer used by `optimize`.
    pub fn quantizer(mut self, quantizer: Arc<dyn Quantizer>) -> Self {
        self.quantizer = Some(quantizer);
        self
    }

    /// Files shipped with deployments; defaults to the bundled set.
    pub fn exportable_code(mut self, template: ExportableCodeTemplate) -> Self {
        self.exportable_code = Some(template);
        self
    }

    /// Span every operation of the task runs in.
    pub fn span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Seed of the calibration shuffle.
    pub fn calibration_seed(mut self, seed: u64) -> Self {
        self.calibration_seed = seed;
        self
    }

    /// Build the task, loading the inference model if a model is attached.
    pub fn build(self) -> Result<OpenVinoTask> {
        let runtime = self.runtime.ok_or_else(|| {
            Error::config("runtime", "an inference runtime is required to build the task")
        })?;
        let span = self.span.unwrap_or_else(|| {
            info_span!("openvino_task", task = %self.environment.model_template.name)
        });
        let normal_label = self.environment.label_schema.normal_label()?.clone();
        let anomalous_label = self.environment.label_schema.anomalous_label()?.clone();

        let mut task = OpenVinoTask {
            environment: self.environment,
            runtime,
            quantizer: self.quantizer,
            exportable_code: self.exportable_code.unwrap_or_default(),
            span,
            calibration_seed: self.calibration_seed,
            inference_model: None,
            normal_label,
            anomalous_label,
        };

        {
            let _guard = task.span.enter();
            info!("Initializing the OpenVINO task");
        }
        if task.environment.model.is_some() {
            task.inference_model = Some(task.get_openvino_model()?);
        }
        Ok(task)
    }
}
