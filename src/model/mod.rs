//! Model artifacts
//!
//! A trained model is a flat key→bytes store plus descriptive attributes
//! (format, precision, optimization history). Optimization and deployment
//! mutate the store in place.

mod artifact;
mod store;
mod types;


pub use artifact::{ModelArtifact, KEY_IR_BIN, KEY_IR_XML, KEY_LABEL_SCHEMA, KEY_METADATA};
pub use store::blob_digest;
pub use types::{ModelFormat, ModelOptimizationType, ModelPrecision, OptimizationMethod};
