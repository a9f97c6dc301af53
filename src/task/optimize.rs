//! Post-training quantization of the attached model.

use tracing::info;

use super::openvino::OpenVinoTask;
use crate::calibration::CalibrationDataLoader;
use crate::dataset::Dataset;
use crate::ir::{IrModel, ScopedIrDir};
use crate::label::label_schema_to_bytes;
use crate::model::{
    ModelArtifact, ModelFormat, ModelOptimizationType, ModelPrecision, OptimizationMethod,
    KEY_IR_BIN, KEY_IR_XML, KEY_LABEL_SCHEMA, KEY_METADATA,
};
use crate::progress::OptimizationParameters;
use crate::ptq::{OptimizationType, QuantizationConfig, QuantizationDataset};
use crate::{Error, Result};

impl OpenVinoTask {
    /// Quantize the attached model into `output_model`.
    ///
    /// Calibration uses only the anomalous items of `dataset`. On success
    /// the output becomes the task's model and is reloaded for inference.
    /// Every precondition is checked before `output_model` is written.
    pub fn optimize(
        &mut self,
        optimization_type: OptimizationType,
        dataset: &Dataset,
        output_model: &mut ModelArtifact,
        mut parameters: Option<&mut OptimizationParameters>,
    ) -> Result<()> {
        let span = self.span.clone();
        let _guard = span.enter();

        if optimization_type != OptimizationType::Pot {
            return Err(Error::UnsupportedOptimization {
                requested: optimization_type,
            });
        }
        let model = self.model("save the weights")?;
        let quantizer = self.quantizer.clone().ok_or_else(|| {
            Error::config("quantizer", "no quantizer configured for PTQ optimization")
        })?;

        // Training subsets hold normal images only; statistics come from anomalous ones.
        let calibration_set = dataset.anomalous_subset();
        info!(samples = calibration_set.len(), "Starting PTQ optimization");

        let preprocessor = self
            .inference_model
            .as_ref()
            .ok_or(Error::NoModel {
                operation: "build the calibration loader",
            })?
            .preprocessor();
        let loader =
            CalibrationDataLoader::new(&calibration_set, preprocessor, true, self.calibration_seed);

        let ir = {
            let dir = ScopedIrDir::with_blobs(model.get_data(KEY_IR_XML)?, model.get_data(KEY_IR_BIN)?)?;
            IrModel::read(dir.xml_path())?
        };
        if ir.graph.is_quantized() {
            return Err(Error::AlreadyQuantized);
        }
        if let Some(p) = parameters.as_deref_mut() {
            p.update_progress(10);
        }

        let hyper_parameters = &self.environment.hyper_parameters;
        let mut config = QuantizationConfig::for_template(
            self.environment.model_template.base_dir(),
            &hyper_parameters.pot_parameters,
        )?;
        config.clamp_subset_size(loader.len());

        let compressed = {
            let mut quantization_dataset = QuantizationDataset::new(&loader);
            quantizer.quantize(&ir, &mut quantization_dataset, &config)?
        };
        if let Some(p) = parameters.as_deref_mut() {
            p.update_progress(90);
        }

        let (xml, bin) = {
            let dir = ScopedIrDir::new()?;
            compressed.save(dir.xml_path())?;
            dir.read_blobs()?
        };
        let metadata = self.get_metadata()?.to_bytes()?;
        let label_schema = label_schema_to_bytes(&self.environment.label_schema)?;

        output_model.set_data(KEY_IR_XML, xml);
        output_model.set_data(KEY_IR_BIN, bin);
        output_model.set_data(KEY_LABEL_SCHEMA, label_schema);
        output_model.model_format = ModelFormat::OpenVino;
        output_model.optimization_type = ModelOptimizationType::Pot;
        output_model.optimization_methods = vec![OptimizationMethod::Quantization];
        output_model.precision = vec![ModelPrecision::Int8];
        output_model.set_data(KEY_METADATA, metadata);

        self.environment.model = Some(output_model.clone());
        self.inference_model = Some(self.get_openvino_model()?);

        if let Some(p) = parameters.as_deref_mut() {
            p.update_progress(100);
        }
        info!("PTQ optimization completed");
        Ok(())
    }
}
