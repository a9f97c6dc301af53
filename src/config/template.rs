//! Model template and task environment.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::hyper::AnomalyHyperParameters;
use super::task_type::TaskType;
use crate::label::LabelSchema;
use crate::model::ModelArtifact;

/// Identity of the model template a task was created from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelTemplate {
    /// Template name, e.g. `"padim"`.
    pub name: String,
    pub task_type: TaskType,
    /// Path of the template file; auxiliary configs live next to it.
    pub template_path: PathBuf,
}

impl ModelTemplate {
    pub fn new(name: impl Into<String>, task_type: TaskType, template_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            task_type,
            template_path: template_path.into(),
        }
    }

    /// Directory holding the template file.
    pub fn base_dir(&self) -> &Path {
        self.template_path.parent().unwrap_or_else(|| Path::new("."))
    }
}

/// Everything a task needs: template, hyperparameters, labels and model.
#[derive(Debug, Clone)]
pub struct TaskEnvironment {
    pub model_template: ModelTemplate,
    pub hyper_parameters: AnomalyHyperParameters,
    pub label_schema: LabelSchema,
    /// Trained model, if one is attached.
    pub model: Option<ModelArtifact>,
}

impl TaskEnvironment {
    pub fn new(
        model_template: ModelTemplate,
        hyper_parameters: AnomalyHyperParameters,
        label_schema: LabelSchema,
    ) -> Self {
        Self {
            model_template,
            hyper_parameters,
            label_schema,
            model: None,
        }
    }

    /// Attach a trained model.
    pub fn with_model(mut self, model: ModelArtifact) -> Self {
        self.model = Some(model);
        self
    }

    pub fn task_type(&self) -> TaskType {
        self.model_template.task_type
    }
}
