//! Key-value model artifact.

use std::collections::BTreeMap;

use super::types::{ModelFormat, ModelOptimizationType, ModelPrecision, OptimizationMethod};
use crate::{Error, Result};

/// Graph definition of the IR pair.
pub const KEY_IR_XML: &str = "openvino.xml";
/// Binary weights of the IR pair.
pub const KEY_IR_BIN: &str = "openvino.bin";
/// Current-schema metadata blob.
pub const KEY_METADATA: &str = "metadata";
/// Serialized label schema.
pub const KEY_LABEL_SCHEMA: &str = "label_schema.json";

/// A trained model: named binary blobs plus descriptive attributes.
///
/// Blobs are addressed by arbitrary string keys. The IR pair lives under
/// [`KEY_IR_XML`] and [`KEY_IR_BIN`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModelArtifact {
    data: BTreeMap<String, Vec<u8>>,
    pub model_format: ModelFormat,
    pub optimization_type: ModelOptimizationType,
    pub optimization_methods: Vec<OptimizationMethod>,
    pub precision: Vec<ModelPrecision>,
    /// Deployment archive produced by `deploy`.
    pub exportable_code: Option<Vec<u8>>,
}

impl ModelArtifact {
    /// Create an empty FP32 OpenVINO artifact.
    pub fn new() -> Self {
        Self {
            precision: vec![ModelPrecision::Fp32],
            ..Self::default()
        }
    }

    /// Create an artifact holding an IR pair.
    pub fn from_ir(xml: impl Into<Vec<u8>>, bin: impl Into<Vec<u8>>) -> Self {
        let mut artifact = Self::new();
        artifact.set_data(KEY_IR_XML, xml);
        artifact.set_data(KEY_IR_BIN, bin);
        artifact
    }

    /// Get the blob stored under `key`.
    pub fn get_data(&self, key: &str) -> Result<&[u8]> {
        self.data
            .get(key)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::MissingData {
                key: key.to_string(),
            })
    }

    /// Store a blob, replacing any previous value.
    pub fn set_data(&mut self, key: impl Into<String>, value: impl Into<Vec<u8>>) {
        self.data.insert(key.into(), value.into());
    }

    pub fn has_data(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn remove_data(&mut self, key: &str) -> Option<Vec<u8>> {
        self.data.remove(key)
    }

    /// Stored keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    pub(crate) fn entries(&self) -> impl Iterator<Item = (&String, &Vec<u8>)> {
        self.data.iter()
    }

    pub fn is_quantized_int8(&self) -> bool {
        self.precision.contains(&ModelPrecision::Int8)
    }
}
