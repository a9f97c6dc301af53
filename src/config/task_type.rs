//! Task type as declared by a model template.

use serde::{Deserialize, Serialize};

/// Task type declared in the model template.
///
/// The non-anomaly variants exist so an environment created for another
/// task family can be represented; anomaly operations reject them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskType {
    Classification,
    Detection,
    Segmentation,
    AnomalyClassification,
    AnomalyDetection,
    AnomalySegmentation,
}

impl TaskType {
    /// The anomaly task kind, if this is an anomaly task.
    pub fn anomaly_kind(self) -> Option<AnomalyTaskKind> {
        match self {
            TaskType::AnomalyClassification => Some(AnomalyTaskKind::Classification),
            TaskType::AnomalyDetection => Some(AnomalyTaskKind::Detection),
            TaskType::AnomalySegmentation => Some(AnomalyTaskKind::Segmentation),
            TaskType::Classification | TaskType::Detection | TaskType::Segmentation => None,
        }
    }

    /// Kind named by the last segment of the type, for any task family.
    ///
    /// Legacy models do not record their kind, so it is derived from the
    /// template's task type.
    pub fn task_kind(self) -> AnomalyTaskKind {
        match self {
            TaskType::Classification | TaskType::AnomalyClassification => {
                AnomalyTaskKind::Classification
            }
            TaskType::Detection | TaskType::AnomalyDetection => AnomalyTaskKind::Detection,
            TaskType::Segmentation | TaskType::AnomalySegmentation => {
                AnomalyTaskKind::Segmentation
            }
        }
    }

    /// Upper-case name used as the converter type of a deployment.
    pub fn as_str(self) -> &'static str {
        match self {
            TaskType::Classification => "CLASSIFICATION",
            TaskType::Detection => "DETECTION",
            TaskType::Segmentation => "SEGMENTATION",
            TaskType::AnomalyClassification => "ANOMALY_CLASSIFICATION",
            TaskType::AnomalyDetection => "ANOMALY_DETECTION",
            TaskType::AnomalySegmentation => "ANOMALY_SEGMENTATION",
        }
    }
}

impl std::str::FromStr for TaskType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().replace('-', "_").as_str() {
            "CLASSIFICATION" => Ok(TaskType::Classification),
            "DETECTION" => Ok(TaskType::Detection),
            "SEGMENTATION" => Ok(TaskType::Segmentation),
            "ANOMALY_CLASSIFICATION" => Ok(TaskType::AnomalyClassification),
            "ANOMALY_DETECTION" => Ok(TaskType::AnomalyDetection),
            "ANOMALY_SEGMENTATION" => Ok(TaskType::AnomalySegmentation),
            _ => Err(format!(
                "Unknown task type: {s}. Valid types: classification, detection, segmentation, \
                 anomaly_classification, anomaly_detection, anomaly_segmentation"
            )),
        }
    }
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of anomaly task, stored as the `task` field of model metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnomalyTaskKind {
    Classification,
    Detection,
    Segmentation,
}

impl AnomalyTaskKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AnomalyTaskKind::Classification => "classification",
            AnomalyTaskKind::Detection => "detection",
            AnomalyTaskKind::Segmentation => "segmentation",
        }
    }
}

impl std::str::FromStr for AnomalyTaskKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "classification" => Ok(AnomalyTaskKind::Classification),
            "detection" => Ok(AnomalyTaskKind::Detection),
            "segmentation" => Ok(AnomalyTaskKind::Segmentation),
            _ => Err(format!("Unknown anomaly task kind: {s}")),
        }
    }
}

impl std::fmt::Display for AnomalyTaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
