//! Task state, metadata access and legacy migration.

use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn, Span};

use super::builder::OpenVinoTaskBuilder;
use crate::config::{TaskEnvironment, TaskType};
use crate::deploy::ExportableCodeTemplate;
use crate::inference::{AnomalyDetectionModel, InferenceRuntime};
use crate::ir::{IrModel, ModelInfo, RtValue, ScopedIrDir};
use crate::label::{Label, LabelSchemaMapper};
use crate::metadata::{metadata_in_ir_format, resolve_metadata, AnomalyMetadata};
use crate::model::{ModelArtifact, KEY_IR_BIN, KEY_IR_XML};
use crate::ptq::Quantizer;
use crate::{Error, Result};

/// Deployment-side anomaly task backed by an OpenVINO-style runtime.
pub struct OpenVinoTask {
    pub(super) environment: TaskEnvironment,
    pub(super) runtime: Arc<dyn InferenceRuntime>,
    pub(super) quantizer: Option<Arc<dyn Quantizer>>,
    pub(super) exportable_code: ExportableCodeTemplate,
    pub(super) span: Span,
    pub(super) calibration_seed: u64,
    pub(super) inference_model: Option<AnomalyDetectionModel>,
    pub(super) normal_label: Label,
    pub(super) anomalous_label: Label,
}

impl fmt::Debug for OpenVinoTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenVinoTask")
            .field("task_type", &self.task_type())
            .field("template", &self.environment.model_template.name)
            .field("has_model", &self.environment.model.is_some())
            .field("has_quantizer", &self.quantizer.is_some())
            .finish_non_exhaustive()
    }
}

impl OpenVinoTask {
    pub fn builder(environment: TaskEnvironment) -> OpenVinoTaskBuilder {
        OpenVinoTaskBuilder::new(environment)
    }

    pub fn environment(&self) -> &TaskEnvironment {
        &self.environment
    }

    pub fn task_type(&self) -> TaskType {
        self.environment.task_type()
    }

    pub fn inference_model(&self) -> Option<&AnomalyDetectionModel> {
        self.inference_model.as_ref()
    }

    pub fn normal_label(&self) -> &Label {
        &self.normal_label
    }

    pub fn anomalous_label(&self) -> &Label {
        &self.anomalous_label
    }

    pub(super) fn model(&self, operation: &'static str) -> Result<&ModelArtifact> {
        self.environment
            .model
            .as_ref()
            .ok_or(Error::NoModel { operation })
    }

    /// Metadata of the attached model, whichever schema it is stored in.
    pub fn get_metadata(&self) -> Result<AnomalyMetadata> {
        let _guard = self.span.enter();
        resolve_metadata(
            self.environment.model.as_ref(),
            &self.environment.hyper_parameters,
            self.task_type(),
        )
    }

    /// Rewrite the attached model's graph so it carries its metadata in
    /// `rt_info/model_info`.
    pub fn create_from_legacy(&mut self) -> Result<()> {
        let span = self.span.clone();
        let _guard = span.enter();

        let info = metadata_in_ir_format(&self.get_metadata()?);
        let model = self
            .environment
            .model
            .as_mut()
            .ok_or(Error::NoModel {
                operation: "migrate a legacy model",
            })?;

        let (xml, bin) = {
            let dir = ScopedIrDir::with_blobs(model.get_data(KEY_IR_XML)?, model.get_data(KEY_IR_BIN)?)?;
            let mut ir = IrModel::read(dir.xml_path())?;
            ir.graph.embed_model_info(&info)?;
            ir.save(dir.xml_path())?;
            dir.read_blobs()?
        };
        model.set_data(KEY_IR_XML, xml);
        model.set_data(KEY_IR_BIN, bin);
        info!(entries = info.len(), "Embedded model_info into legacy model");
        Ok(())
    }

    /// Load the attached model into the runtime.
    ///
    /// A graph without anomaly `model_info` is taken for a legacy export:
    /// it is migrated once with [`Self::create_from_legacy`] and loaded again.
    pub fn get_openvino_model(&mut self) -> Result<AnomalyDetectionModel> {
        let span = self.span.clone();
        let _guard = span.enter();

        let model = self.model("load weights")?;
        let first = AnomalyDetectionModel::create(
            model.get_data(KEY_IR_XML)?,
            model.get_data(KEY_IR_BIN)?,
            self.runtime.as_ref(),
        );
        match first {
            Ok(loaded) => Ok(loaded),
            Err(err) if err.is_model_load() => {
                warn!(error = %err, "Possibly a legacy model is being loaded");
                self.create_from_legacy()?;
                let model = self.model("load weights")?;
                AnomalyDetectionModel::create(
                    model.get_data(KEY_IR_XML)?,
                    model.get_data(KEY_IR_BIN)?,
                    self.runtime.as_ref(),
                )
            }
            Err(err) => Err(err),
        }
    }

    /// Runtime parameters written into deployment configs.
    pub fn openvino_configuration(&self) -> Result<Map<String, Value>> {
        self.model("get configuration")?;
        let mut configuration = Map::new();
        configuration.insert(
            "labels".into(),
            LabelSchemaMapper::forward(&self.environment.label_schema),
        );
        let info: ModelInfo = metadata_in_ir_format(&self.get_metadata()?);
        for (key, value) in info {
            match (key.as_str(), &value) {
                ("labels", RtValue::Str(names)) => {
                    let names: Vec<Value> = names.split(' ').map(Value::from).collect();
                    configuration.insert("modelapi_labels".into(), Value::Array(names));
                }
                _ => {
                    configuration.insert(key, serde_json::to_value(&value)?);
                }
            }
        }
        Ok(configuration)
    }
}
