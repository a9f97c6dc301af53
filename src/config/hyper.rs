//! Typed hyperparameters of an anomaly task.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::ptq::QuantizationPreset;
use crate::{Error, Result};

/// Hyperparameters consumed by the deployment pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AnomalyHyperParameters {
    /// Dataset and preprocessing parameters.
    #[serde(default)]
    pub dataset: DatasetParameters,
    /// Post-training quantization parameters.
    #[serde(default)]
    pub pot_parameters: PotParameters,
}

/// Dataset parameters used to rebuild the preprocessing transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetParameters {
    /// Model input size as `[height, width]`.
    #[serde(default = "default_image_size")]
    pub image_size: [u32; 2],
    /// Training transform settings.
    #[serde(default)]
    pub transform: TransformSettings,
}

fn default_image_size() -> [u32; 2] {
    [256, 256]
}

impl Default for DatasetParameters {
    fn default() -> Self {
        Self {
            image_size: default_image_size(),
            transform: TransformSettings::default(),
        }
    }
}

/// Input normalization applied by the default transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InputNormalization {
    #[default]
    Imagenet,
    None,
}

/// How the training transform is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TransformSettings {
    /// Serialized transform file; takes precedence over the fields below.
    #[serde(default)]
    pub config_path: Option<PathBuf>,
    /// Optional center crop as `[height, width]`.
    #[serde(default)]
    pub center_crop: Option<[u32; 2]>,
    #[serde(default)]
    pub normalization: InputNormalization,
}

/// Parameters for post-training quantization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PotParameters {
    /// Number of calibration samples used to collect statistics.
    #[serde(default = "default_stat_subset_size")]
    pub stat_subset_size: usize,
    #[serde(default)]
    pub preset: QuantizationPreset,
}

fn default_stat_subset_size() -> usize {
    300
}

impl Default for PotParameters {
    fn default() -> Self {
        Self {
            stat_subset_size: default_stat_subset_size(),
            preset: QuantizationPreset::default(),
        }
    }
}

impl AnomalyHyperParameters {
    /// Parse hyperparameters from a YAML string.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let params: Self = serde_yaml::from_str(yaml)?;
        params.validate()?;
        Ok(params)
    }

    /// Load hyperparameters from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::io(format!("reading {}", path.display()), e))?;
        let params: Self = serde_yaml::from_str(&content).map_err(|e| Error::ConfigParsing {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        params.validate()?;
        Ok(params)
    }

    /// Reject values no task could run with.
    pub fn validate(&self) -> Result<()> {
        let [height, width] = self.dataset.image_size;
        if height == 0 || width == 0 {
            return Err(Error::config(
                "dataset.image_size",
                format!("image size must be positive, got {height}x{width}"),
            ));
        }
        if let Some([ch, cw]) = self.dataset.transform.center_crop {
            if ch == 0 || cw == 0 || ch > height || cw > width {
                return Err(Error::config(
                    "dataset.transform.center_crop",
                    format!("crop {ch}x{cw} must be positive and fit in {height}x{width}"),
                ));
            }
        }
        if self.pot_parameters.stat_subset_size == 0 {
            return Err(Error::config(
                "pot_parameters.stat_subset_size",
                "subset size must be at least 1",
            ));
        }
        Ok(())
    }
}
