//! Runtime configuration written as `model/config.json`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::TaskType;
use crate::metadata::MODEL_TYPE;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentConfig {
    pub type_of_model: String,
    pub converter_type: String,
    pub model_parameters: Map<String, Value>,
}

impl DeploymentConfig {
    pub fn new(task_type: TaskType, model_parameters: Map<String, Value>) -> Self {
        Self {
            type_of_model: MODEL_TYPE.to_string(),
            converter_type: task_type.as_str().to_string(),
            model_parameters,
        }
    }

    /// Pretty JSON with 4-space indentation; non-ASCII stays unescaped.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.serialize(&mut serializer)?;
        Ok(out)
    }

    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
