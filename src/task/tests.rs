//! Tests for the OpenVINO task orchestration.

use approx::assert_relative_eq;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};

use super::*;
use crate::config::TaskType;
use crate::dataset::Shape;
use crate::deploy::{DeploymentArchive, ENTRY_MODEL_BIN, ENTRY_MODEL_XML};
use crate::evaluation::ResultSet;
use crate::ir::IrGraph;
use crate::metadata::StoredMetadata;
use crate::model::{
    ModelArtifact, ModelFormat, ModelOptimizationType, ModelPrecision, OptimizationMethod,
    KEY_IR_BIN, KEY_IR_XML, KEY_LABEL_SCHEMA,
};
use crate::progress::{InferenceParameters, OptimizationParameters};
use crate::ptq::OptimizationType;
use crate::test_support::{
    dataset, environment, graph_xml, legacy_artifact, runtime, CountingRuntime, FakeQuantizer,
};
use crate::Error;

fn task_with(
    task_type: TaskType,
    model: Option<ModelArtifact>,
) -> (OpenVinoTask, Arc<CountingRuntime>, Arc<FakeQuantizer>) {
    let runtime = runtime();
    let quantizer = Arc::new(FakeQuantizer::default());
    let task = OpenVinoTask::builder(environment(task_type, model))
        .runtime(runtime.clone())
        .quantizer(quantizer.clone())
        .build()
        .unwrap();
    (task, runtime, quantizer)
}

fn legacy_task(task_type: TaskType) -> OpenVinoTask {
    task_with(task_type, Some(legacy_artifact())).0
}

fn recorder() -> (Arc<Mutex<Vec<u32>>>, impl FnMut(u32) + Send + 'static) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    (seen, move |p| sink.lock().unwrap().push(p))
}

// =========================================================================
// Construction and migration
// =========================================================================

#[test]
fn test_build_requires_runtime() {
    let err = OpenVinoTask::builder(environment(TaskType::AnomalyDetection, None))
        .build()
        .unwrap_err();
    assert!(matches!(err, Error::Config { ref field, .. } if field == "runtime"));
}

#[test]
fn test_build_without_model_defers_loading() {
    let (task, runtime, _) = task_with(TaskType::AnomalyDetection, None);
    assert!(task.inference_model().is_none());
    assert_eq!(runtime.loads.load(Ordering::SeqCst), 0);
    assert_eq!(task.normal_label().name, "Normal");
    assert!(task.anomalous_label().is_anomalous);
}

#[test]
fn test_build_migrates_legacy_model_once() {
    let (task, runtime, _) = task_with(TaskType::AnomalyDetection, Some(legacy_artifact()));
    assert!(task.inference_model().is_some());
    assert_eq!(runtime.loads.load(Ordering::SeqCst), 1);

    let model = task.environment().model.as_ref().unwrap();
    let graph = IrGraph::parse(model.get_data(KEY_IR_XML).unwrap()).unwrap();
    let info = graph.model_info().unwrap();
    assert_eq!(info["model_type"].as_str(), Some("AnomalyDetection"));
    assert_relative_eq!(info["normalization_scale"].as_f64().unwrap(), 2.0);
    // weights are untouched by migration
    assert_eq!(model.get_data(KEY_IR_BIN).unwrap(), &[1, 2, 3, 4]);
    // thresholds stay in the legacy blobs
    assert!(StoredMetadata::probe(model).unwrap().is_legacy());
}

#[test]
fn test_create_from_legacy_without_model() {
    let (mut task, _, _) = task_with(TaskType::AnomalyDetection, None);
    assert!(matches!(task.create_from_legacy(), Err(Error::NoModel { .. })));
}

#[test]
fn test_get_metadata_scalars_from_legacy() {
    let task = legacy_task(TaskType::AnomalySegmentation);
    let metadata = task.get_metadata().unwrap();
    assert_eq!(metadata.image_threshold, 0.5);
    assert_eq!(metadata.pixel_threshold, 0.4);
    assert_eq!(metadata.min, 0.0);
    assert_eq!(metadata.max, 2.0);
}

#[test]
fn test_get_metadata_without_model() {
    let (task, _, _) = task_with(TaskType::AnomalyDetection, None);
    assert!(matches!(task.get_metadata(), Err(Error::NoModel { .. })));
}

// =========================================================================
// Optimization
// =========================================================================

#[test]
fn test_optimize_rejects_nncf_without_touching_output() {
    let mut task = legacy_task(TaskType::AnomalyDetection);
    let mut output = ModelArtifact::new();
    let err = task
        .optimize(OptimizationType::Nncf, &dataset(&[true]), &mut output, None)
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedOptimization { .. }));
    assert_eq!(output, ModelArtifact::new());
}

#[test]
fn test_optimize_rejects_quantized_graph() {
    let artifact = {
        let mut artifact = legacy_artifact();
        artifact.set_data(KEY_IR_XML, graph_xml(8, 8, true));
        artifact
    };
    let (mut task, _, quantizer) = task_with(TaskType::AnomalyDetection, Some(artifact));
    let mut output = ModelArtifact::new();
    let err = task
        .optimize(OptimizationType::Pot, &dataset(&[true]), &mut output, None)
        .unwrap_err();
    assert!(matches!(err, Error::AlreadyQuantized));
    assert!(err.is_precondition());
    assert_eq!(output, ModelArtifact::new());
    assert_eq!(quantizer.seen_subset_size.load(Ordering::SeqCst), 0);
}

#[test]
fn test_optimize_without_model() {
    let (mut task, _, _) = task_with(TaskType::AnomalyDetection, None);
    let mut output = ModelArtifact::new();
    let err = task
        .optimize(OptimizationType::Pot, &dataset(&[true]), &mut output, None)
        .unwrap_err();
    assert!(matches!(err, Error::NoModel { .. }));
    assert_eq!(output, ModelArtifact::new());
}

#[test]
fn test_optimize_without_quantizer() {
    let mut task = OpenVinoTask::builder(environment(TaskType::AnomalyDetection, Some(legacy_artifact())))
        .runtime(runtime())
        .build()
        .unwrap();
    let mut output = ModelArtifact::new();
    let err = task
        .optimize(OptimizationType::Pot, &dataset(&[true]), &mut output, None)
        .unwrap_err();
    assert!(matches!(err, Error::Config { ref field, .. } if field == "quantizer"));
}

#[test]
fn test_optimize_without_model_or_quantizer_reports_missing_model() {
    let mut task = OpenVinoTask::builder(environment(TaskType::AnomalyDetection, None))
        .runtime(runtime())
        .build()
        .unwrap();
    let mut output = ModelArtifact::new();
    let err = task
        .optimize(OptimizationType::Pot, &dataset(&[true]), &mut output, None)
        .unwrap_err();
    assert!(err.is_precondition());
    assert!(matches!(err, Error::NoModel { .. }));
}

#[test]
fn test_optimize_quantizes_anomalous_subset() {
    let (mut task, runtime, quantizer) =
        task_with(TaskType::AnomalyDetection, Some(legacy_artifact()));
    let (progress, callback) = recorder();
    let mut params = OptimizationParameters::with_progress(callback);
    let mut output = ModelArtifact::new();

    task.optimize(
        OptimizationType::Pot,
        &dataset(&[true, false, true, true, false]),
        &mut output,
        Some(&mut params),
    )
    .unwrap();

    assert_eq!(*progress.lock().unwrap(), vec![10, 90, 100]);
    // subset size 10 clamped to the three anomalous items
    assert_eq!(quantizer.seen_subset_size.load(Ordering::SeqCst), 3);
    assert_eq!(quantizer.seen_samples.load(Ordering::SeqCst), 3);

    assert_eq!(output.model_format, ModelFormat::OpenVino);
    assert_eq!(output.optimization_type, ModelOptimizationType::Pot);
    assert_eq!(output.optimization_methods, vec![OptimizationMethod::Quantization]);
    assert_eq!(output.precision, vec![ModelPrecision::Int8]);
    assert!(output.has_data(KEY_LABEL_SCHEMA));
    assert_eq!(output.get_data(KEY_IR_BIN).unwrap(), &[0, 1, 1, 2]);
    assert!(IrGraph::parse(output.get_data(KEY_IR_XML).unwrap())
        .unwrap()
        .is_quantized());
    assert!(!StoredMetadata::probe(&output).unwrap().is_legacy());

    // the optimized model is now the task's model and is loaded
    assert_eq!(task.environment().model.as_ref(), Some(&output));
    assert_eq!(runtime.loads.load(Ordering::SeqCst), 2);
    assert_relative_eq!(task.get_metadata().unwrap().image_threshold, 0.5);
}

#[test]
fn test_optimize_with_no_anomalous_items_clamps_to_zero() {
    let (mut task, _, quantizer) = task_with(TaskType::AnomalyDetection, Some(legacy_artifact()));
    let mut output = ModelArtifact::new();
    task.optimize(OptimizationType::Pot, &dataset(&[false, false]), &mut output, None)
        .unwrap();
    assert_eq!(quantizer.seen_subset_size.load(Ordering::SeqCst), 0);
    assert_eq!(quantizer.seen_samples.load(Ordering::SeqCst), 0);
}

#[test]
fn test_optimize_twice_fails_on_quantized_graph() {
    let mut task = legacy_task(TaskType::AnomalyDetection);
    let mut first = ModelArtifact::new();
    task.optimize(OptimizationType::Pot, &dataset(&[true]), &mut first, None)
        .unwrap();
    let mut second = ModelArtifact::new();
    let err = task
        .optimize(OptimizationType::Pot, &dataset(&[true]), &mut second, None)
        .unwrap_err();
    assert!(matches!(err, Error::AlreadyQuantized));
}

// =========================================================================
// Deployment
// =========================================================================

#[test]
fn test_deploy_without_model() {
    let (task, _, _) = task_with(TaskType::AnomalyDetection, None);
    let mut output = ModelArtifact::new();
    let err = task.deploy(&mut output).unwrap_err();
    assert!(matches!(err, Error::NoModel { .. }));
    assert!(output.exportable_code.is_none());
}

#[test]
fn test_deploy_packages_model_and_config() {
    let task = legacy_task(TaskType::AnomalyDetection);
    let mut output = ModelArtifact::new();
    task.deploy(&mut output).unwrap();

    let archive = DeploymentArchive::open(output.exportable_code.as_ref().unwrap()).unwrap();
    let model = task.environment().model.as_ref().unwrap();
    assert_eq!(archive.get(ENTRY_MODEL_XML).unwrap(), model.get_data(KEY_IR_XML).unwrap());
    assert_eq!(archive.get(ENTRY_MODEL_BIN).unwrap(), &[1, 2, 3, 4]);
    assert!(archive.get("python/demo.py").is_some());

    let config = archive.config().unwrap();
    assert_eq!(config.type_of_model, "AnomalyDetection");
    assert_eq!(config.converter_type, "ANOMALY_DETECTION");
    let params = &config.model_parameters;
    assert_eq!(params["modelapi_labels"], serde_json::json!(["Normal", "Anomaly"]));
    assert_eq!(params["labels"]["all_labels"]["1"]["name"], "Anomalous");
    assert_eq!(params["mean_values"].as_array().unwrap().len(), 3);
    assert_eq!(params["task"], "detection");
    assert_eq!(params["reverse_input_channels"], false);
    assert_relative_eq!(params["normalization_scale"].as_f64().unwrap(), 2.0);
    assert!(!params.contains_key("min"));
}

// =========================================================================
// Inference and evaluation
// =========================================================================

#[test]
fn test_infer_detection() {
    let mut task = legacy_task(TaskType::AnomalyDetection);
    let (progress, callback) = recorder();
    let mut params = InferenceParameters::with_progress(callback);
    let ground_truth = dataset(&[true, false]);

    let predicted = task
        .infer(ground_truth.with_empty_predictions(), Some(&mut params))
        .unwrap();

    assert_eq!(*progress.lock().unwrap(), vec![50, 100]);

    let anomalous = &predicted.items[0];
    assert_eq!(anomalous.labels[0].label.name, "Anomalous");
    assert_relative_eq!(anomalous.labels[0].probability, 1.0);
    assert_eq!(anomalous.annotations.len(), 1);
    assert_eq!(
        anomalous.annotations[0].shape,
        Shape::Rectangle { x1: 0.25, y1: 0.25, x2: 0.5, y2: 0.5 }
    );
    assert_eq!(anomalous.metadata[0].name, "Anomaly Map");
    assert_eq!(anomalous.metadata[0].numpy.dim(), (8, 8));

    let normal = &predicted.items[1];
    assert_eq!(normal.labels[0].label.name, "Normal");
    assert_relative_eq!(normal.labels[0].probability, 0.7, epsilon = 1e-5);
    assert!(normal.annotations.is_empty());
}

#[test]
fn test_infer_classification_thresholds_score() {
    let mut task = legacy_task(TaskType::AnomalyClassification);
    let predicted = task.infer(dataset(&[true, false]).with_empty_predictions(), None).unwrap();
    assert!(predicted.items[0].is_anomalous());
    assert!(!predicted.items[1].is_anomalous());
    assert!(predicted.items.iter().all(|item| item.annotations.is_empty()));
}

#[test]
fn test_infer_segmentation_produces_polygons() {
    let mut task = legacy_task(TaskType::AnomalySegmentation);
    let predicted = task.infer(dataset(&[true]).with_empty_predictions(), None).unwrap();
    let item = &predicted.items[0];
    assert!(item.is_anomalous());
    assert!(matches!(item.annotations[0].shape, Shape::Polygon { .. }));
}

#[test]
fn test_infer_and_evaluate_reject_non_anomaly_task() {
    let mut task = legacy_task(TaskType::Detection);
    let err = task.infer(dataset(&[true]), None).unwrap_err();
    assert!(matches!(err, Error::UnknownTaskType { task_type: TaskType::Detection }));

    let mut result_set = ResultSet::new(dataset(&[true]), dataset(&[true]));
    let err = task.evaluate(&mut result_set).unwrap_err();
    assert!(matches!(err, Error::UnknownTaskType { .. }));
    assert!(result_set.performance.is_none());
}

#[test]
fn test_infer_without_model() {
    let (mut task, _, _) = task_with(TaskType::AnomalyDetection, None);
    assert!(matches!(task.infer(dataset(&[true]), None), Err(Error::NoModel { .. })));
}

#[test]
fn test_evaluate_after_infer() {
    let mut task = legacy_task(TaskType::AnomalyClassification);
    let ground_truth = dataset(&[true, false, true]);
    let predicted = task.infer(ground_truth.with_empty_predictions(), None).unwrap();

    let mut result_set = ResultSet::new(ground_truth, predicted);
    task.evaluate(&mut result_set).unwrap();
    let performance = result_set.performance.unwrap();
    assert_eq!(performance.score.name, "f-measure");
    assert_relative_eq!(performance.score.value, 1.0);
}

#[test]
fn test_custom_span_is_accepted() {
    let task = OpenVinoTask::builder(environment(TaskType::AnomalyDetection, Some(legacy_artifact())))
        .runtime(runtime())
        .span(tracing::info_span!("deployment", job = 7))
        .build()
        .unwrap();
    assert!(task.get_metadata().is_ok());
}
