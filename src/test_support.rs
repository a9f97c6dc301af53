//! Fixtures shared by unit tests.

use ndarray::{Array2, Array3};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::config::{AnomalyHyperParameters, ModelTemplate, TaskEnvironment, TaskType};
use crate::dataset::{Dataset, DatasetItem, DatasetPurpose};
use crate::inference::{InferenceBackend, InferenceRuntime, RawPrediction};
use crate::ir::{IrGraph, IrModel};
use crate::label::LabelSchema;
use crate::model::{ModelArtifact, KEY_METADATA};
use crate::ptq::{QuantizationConfig, QuantizationDataset, Quantizer};
use crate::Result;

/// Minimal IR graph with one 1x3xHxW input.
pub fn graph_xml(height: usize, width: usize, quantized: bool) -> String {
    let middle = if quantized {
        r#"		<layer id="1" name="fq" type="FakeQuantize" version="opset1">
			<data levels="256" auto_broadcast="numpy" />
		</layer>
"#
    } else {
        r#"		<layer id="1" name="conv" type="Convolution" version="opset1">
			<data strides="1,1" />
			<rt_info>
				<attribute name="fused_names" version="0" value="conv" />
			</rt_info>
		</layer>
"#
    };
    format!(
        r#"<?xml version="1.0"?>
<net name="padim" version="11">
	<layers>
		<layer id="0" name="input" type="Parameter" version="opset1">
			<data shape="1,3,{height},{width}" element_type="f32" />
		</layer>
{middle}		<layer id="2" name="output" type="Result" version="opset1" />
	</layers>
	<edges>
		<edge from-layer="0" from-port="0" to-layer="1" to-port="0" />
		<edge from-layer="1" from-port="1" to-layer="2" to-port="0" />
	</edges>
</net>
"#
    )
}

pub fn legacy_blobs(artifact: &mut ModelArtifact, image: f32, pixel: f32, min: f32, max: f32) {
    artifact.set_data("image_threshold", image.to_le_bytes().to_vec());
    artifact.set_data("pixel_threshold", pixel.to_le_bytes().to_vec());
    artifact.set_data("min", min.to_le_bytes().to_vec());
    artifact.set_data("max", max.to_le_bytes().to_vec());
}

/// Legacy-format artifact: raw threshold blobs, no `model_info` in the graph.
pub fn legacy_artifact() -> ModelArtifact {
    let mut artifact = ModelArtifact::from_ir(graph_xml(8, 8, false), vec![1u8, 2, 3, 4]);
    legacy_blobs(&mut artifact, 0.5, 0.4, 0.0, 2.0);
    artifact
}

/// Current-format artifact with a JSON metadata blob.
pub fn current_artifact(task: &str) -> ModelArtifact {
    let mut artifact = legacy_artifact();
    for key in ["image_threshold", "pixel_threshold", "min", "max"] {
        artifact.remove_data(key);
    }
    let metadata = serde_json::json!({
        "image_threshold": [0.5],
        "pixel_threshold": 0.4,
        "min": [0.0],
        "max": 2.0,
        "task": task,
        "transform": {"transform": {"__class_fullname__": "Compose", "transforms": [
            {"__class_fullname__": "Resize", "height": 8, "width": 8},
            {"__class_fullname__": "Normalize", "mean": [0.485, 0.456, 0.406], "std": [0.229, 0.224, 0.225]},
            {"__class_fullname__": "ToTensorV2"}
        ]}},
    });
    artifact.set_data(KEY_METADATA, serde_json::to_vec(&metadata).unwrap_or_default());
    artifact
}

pub fn environment(task_type: TaskType, model: Option<ModelArtifact>) -> TaskEnvironment {
    let mut hparams = AnomalyHyperParameters::default();
    hparams.dataset.image_size = [8, 8];
    hparams.pot_parameters.stat_subset_size = 10;
    let env = TaskEnvironment::new(
        ModelTemplate::new("padim", task_type, "/nonexistent/padim/template.yaml"),
        hparams,
        LabelSchema::anomaly(),
    );
    match model {
        Some(model) => env.with_model(model),
        None => env,
    }
}

/// Dataset of 8x8 images; anomalous images carry a bright 2x2 patch.
pub fn dataset(pattern: &[bool]) -> Dataset {
    let schema = LabelSchema::anomaly();
    let items = pattern
        .iter()
        .map(|&anomalous| {
            let mut image = Array3::<u8>::from_elem((8, 8, 3), 10);
            let label = if anomalous {
                for y in 2..4 {
                    for x in 2..4 {
                        for c in 0..3 {
                            image[[y, x, c]] = 250;
                        }
                    }
                }
                schema.anomalous_label().cloned()
            } else {
                schema.normal_label().cloned()
            };
            let item = DatasetItem::new(image);
            match label {
                Ok(label) => item.with_label(label),
                Err(_) => item,
            }
        })
        .collect();
    Dataset::new(items, DatasetPurpose::Evaluation)
}

/// Backend whose anomaly map is the channel mean of the input, offset so
/// the 10-valued background lands below and 250-valued patches above the
/// thresholds of [`legacy_artifact`].
pub struct MeanBackend;

impl InferenceBackend for MeanBackend {
    fn forward(&mut self, input: &Array3<f32>) -> Result<RawPrediction> {
        let (_, h, w) = input.dim();
        let mut map = Array2::<f32>::zeros((h, w));
        for y in 0..h {
            for x in 0..w {
                let mean = (0..3).map(|c| input[[c, y, x]]).sum::<f32>() / 3.0;
                map[[y, x]] = if mean > 0.0 { 1.5 } else { 0.1 };
            }
        }
        Ok(RawPrediction {
            anomaly_map: map,
            pred_score: None,
        })
    }
}

/// Runtime that counts how many backends it created.
#[derive(Default)]
pub struct CountingRuntime {
    pub loads: AtomicUsize,
}

impl InferenceRuntime for CountingRuntime {
    fn load(&self, _graph: &IrGraph, _weights: &[u8]) -> Result<Box<dyn InferenceBackend>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MeanBackend))
    }
}

pub fn runtime() -> Arc<CountingRuntime> {
    Arc::new(CountingRuntime::default())
}

/// Quantizer that inserts a FakeQuantize layer and halves the weights.
#[derive(Default)]
pub struct FakeQuantizer {
    pub seen_samples: AtomicUsize,
    pub seen_subset_size: AtomicUsize,
}

impl Quantizer for FakeQuantizer {
    fn quantize(
        &self,
        model: &IrModel,
        dataset: &mut QuantizationDataset<'_>,
        config: &QuantizationConfig,
    ) -> Result<IrModel> {
        let seen = dataset.by_ref().take(config.subset_size).count();
        self.seen_samples.store(seen, Ordering::SeqCst);
        self.seen_subset_size.store(config.subset_size, Ordering::SeqCst);
        let xml = model.graph.as_str().replacen(
            "type=\"Result\"",
            "type=\"Result\" /><layer id=\"9\" name=\"fq\" type=\"FakeQuantize\"",
            1,
        );
        Ok(IrModel::new(
            IrGraph::parse(xml.as_bytes())?,
            model.weights.iter().map(|b| b / 2).collect(),
        ))
    }
}
