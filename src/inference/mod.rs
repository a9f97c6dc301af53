//! Inference model
//!
//! Wraps an [`InferenceRuntime`] backend with the anomaly pre- and
//! post-processing described by the graph's `model_info`.

mod model;
mod params;
mod postprocess;
mod preprocess;
mod runtime;


pub use model::AnomalyDetectionModel;
pub use params::ModelParameters;
pub use postprocess::{
    detection_annotations, mask_regions, normalize, segmentation_annotations, AnomalyResult,
    Region,
};
pub use preprocess::{resize_image, resize_map, resize_nearest, Preprocessor};
pub use runtime::{InferenceBackend, InferenceRuntime, RawPrediction};
