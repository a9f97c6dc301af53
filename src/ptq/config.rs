//! Quantization config assembly.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

use super::types::QuantizationPreset;
use crate::config::PotParameters;
use crate::{Error, Result};

/// Optional per-template override file, next to the template.
pub const PTQ_CONFIG_FILE: &str = "ptq_optimization_config.yaml";

/// Graph nodes excluded from quantization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct IgnoredScope {
    #[serde(default)]
    pub names: Vec<String>,
    #[serde(default)]
    pub patterns: Vec<String>,
    #[serde(default)]
    pub types: Vec<String>,
}

/// Parameters passed to the [`super::Quantizer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantizationConfig {
    #[serde(default = "default_subset_size")]
    pub subset_size: usize,
    #[serde(default)]
    pub preset: QuantizationPreset,
    #[serde(default = "default_true")]
    pub fast_bias_correction: bool,
    #[serde(default)]
    pub model_type: Option<String>,
    #[serde(default)]
    pub ignored_scope: Option<IgnoredScope>,
    /// Engine-specific options passed through untouched.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

fn default_subset_size() -> usize {
    300
}

fn default_true() -> bool {
    true
}

impl Default for QuantizationConfig {
    fn default() -> Self {
        Self {
            subset_size: default_subset_size(),
            preset: QuantizationPreset::default(),
            fast_bias_correction: true,
            model_type: None,
            ignored_scope: None,
            extra: BTreeMap::new(),
        }
    }
}

impl QuantizationConfig {
    /// Read a config file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::io(format!("reading {}", path.display()), e))?;
        serde_yaml::from_str(&content).map_err(|e| Error::ConfigParsing {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Build the config for a template directory: the optional
    /// [`PTQ_CONFIG_FILE`] first, then `subset_size` and `preset` from the
    /// hyperparameters.
    pub fn for_template(base_dir: &Path, pot: &PotParameters) -> Result<Self> {
        let path = base_dir.join(PTQ_CONFIG_FILE);
        let mut config = if path.is_file() {
            info!(path = %path.display(), "Loading PTQ config overrides");
            Self::from_yaml_file(&path)?
        } else {
            Self::default()
        };
        config.subset_size = pot.stat_subset_size;
        config.preset = pot.preset;
        Ok(config)
    }

    /// Never ask for more samples than the calibration set holds.
    pub fn clamp_subset_size(&mut self, available: usize) {
        if self.subset_size > available {
            debug!(
                requested = self.subset_size,
                available, "Clamping PTQ subset size"
            );
            self.subset_size = available;
        }
    }

    pub fn with_subset_size(mut self, subset_size: usize) -> Self {
        self.subset_size = subset_size;
        self
    }
}
