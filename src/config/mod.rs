//! Typed task configuration
//!
//! Model template identity, hyperparameters loaded from YAML, and the task
//! environment tying them to a label schema and an optional trained model.

mod hyper;
mod task_type;
mod template;


pub use hyper::{
    AnomalyHyperParameters, DatasetParameters, InputNormalization, PotParameters,
    TransformSettings,
};
pub use task_type::{AnomalyTaskKind, TaskType};
pub use template::{ModelTemplate, TaskEnvironment};
