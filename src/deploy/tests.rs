//! Tests for deployment packaging.

use serde_json::{json, Map};
use std::fs;

use super::*;
use crate::config::TaskType;
use crate::Error;

fn config() -> DeploymentConfig {
    let mut params = Map::new();
    params.insert("image_threshold".into(), json!(0.5));
    params.insert("modelapi_labels".into(), json!(["Normal", "Anomaly"]));
    params.insert("note".into(), json!("défaut"));
    DeploymentConfig::new(TaskType::AnomalySegmentation, params)
}

#[test]
fn test_config_header_fields() {
    let config = config();
    assert_eq!(config.type_of_model, "AnomalyDetection");
    assert_eq!(config.converter_type, "ANOMALY_SEGMENTATION");
}

#[test]
fn test_config_json_uses_four_space_indent_and_raw_unicode() {
    let text = String::from_utf8(config().to_json_bytes().unwrap()).unwrap();
    assert!(text.contains("\n    \"type_of_model\": \"AnomalyDetection\""));
    assert!(text.contains("\n        \"image_threshold\": 0.5"));
    assert!(text.contains("défaut"));
}

#[test]
fn test_archive_layout_and_round_trip() {
    let xml = b"<net name=\"m\"></net>".to_vec();
    let bin: Vec<u8> = (0..=255).collect();
    let template = ExportableCodeTemplate::default();

    let bytes = DeploymentArchive::build(&xml, &bin, &config(), &template).unwrap();
    let archive = DeploymentArchive::open(&bytes).unwrap();

    let mut paths: Vec<&str> = archive.paths().collect();
    paths.sort_unstable();
    assert_eq!(
        paths,
        vec![
            "README.md",
            "model/config.json",
            "model/model.bin",
            "model/model.xml",
            "python/LICENSE",
            "python/demo.py",
            "python/requirements.txt",
        ]
    );
    assert_eq!(archive.get(ENTRY_MODEL_XML).unwrap(), xml.as_slice());
    assert_eq!(archive.get(ENTRY_MODEL_BIN).unwrap(), bin.as_slice());
    assert_eq!(archive.get("python/demo.py").unwrap(), template.demo.as_slice());
    assert_eq!(archive.config().unwrap(), config());
}

#[test]
fn test_default_template_is_not_empty() {
    let template = ExportableCodeTemplate::default();
    assert!(template.entries().iter().all(|(_, content)| !content.is_empty()));
    assert!(String::from_utf8_lossy(&template.requirements).contains("openvino"));
}

#[test]
fn test_template_from_dir() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["requirements.txt", "LICENSE", "demo.py", "README.md"] {
        fs::write(dir.path().join(name), format!("custom {name}")).unwrap();
    }
    let template = ExportableCodeTemplate::from_dir(dir.path()).unwrap();
    assert_eq!(template.demo, b"custom demo.py");
}

#[test]
fn test_template_from_dir_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = ExportableCodeTemplate::from_dir(dir.path()).unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
}

#[test]
fn test_open_rejects_garbage() {
    assert!(matches!(DeploymentArchive::open(b"not a zip"), Err(Error::Zip(_))));
}
