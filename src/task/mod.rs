//! OpenVINO anomaly task
//!
//! [`OpenVinoTask`] ties a task environment to an inference runtime and an
//! optional quantizer, and exposes the deployment-side operations:
//! metadata resolution, legacy migration, PTQ, packaging, inference and
//! evaluation.
//!
//! # Example
//!
//! ```ignore
//! use anomaly_deploy::task::OpenVinoTask;
//!
//! let mut task = OpenVinoTask::builder(environment)
//!     .runtime(runtime)
//!     .quantizer(quantizer)
//!     .build()?;
//! let mut output = ModelArtifact::new();
//! task.optimize(OptimizationType::Pot, &dataset, &mut output, None)?;
//! task.deploy(&mut output)?;
//! ```

mod builder;
mod deploy;
mod infer;
mod openvino;
mod optimize;

#[cfg(test)]
mod tests;

pub use builder::OpenVinoTaskBuilder;
pub use openvino::OpenVinoTask;
