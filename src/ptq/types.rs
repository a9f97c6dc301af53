//! Type definitions for post-training quantization.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::config::QuantizationConfig;
use super::dataset::QuantizationDataset;
use crate::ir::IrModel;
use crate::Result;

/// Requested optimization kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OptimizationType {
    /// Post-training quantization
    Pot,
    /// Training-time compression; not available for IR models
    Nncf,
}

impl fmt::Display for OptimizationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pot => "POT",
            Self::Nncf => "NNCF",
        })
    }
}

/// Quantization preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QuantizationPreset {
    /// Symmetric weights and activations
    #[default]
    Performance,
    /// Symmetric weights, asymmetric activations
    Mixed,
}

impl fmt::Display for QuantizationPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Performance => "performance",
            Self::Mixed => "mixed",
        })
    }
}

/// A post-training quantization engine.
pub trait Quantizer: Send + Sync {
    /// Quantize `model`, drawing calibration inputs from `dataset`.
    ///
    /// Implementations should consume at most `config.subset_size` samples.
    fn quantize(
        &self,
        model: &IrModel,
        dataset: &mut QuantizationDataset<'_>,
        config: &QuantizationConfig,
    ) -> Result<IrModel>;
}
