//! Calibration data loader for post-training quantization
//!
//! Feeds dataset images through the model's own preprocessing so the
//! quantizer sees exactly what the network sees at inference time.
//!
//! # Example
//!
//! ```ignore
//! use anomaly_deploy::calibration::CalibrationDataLoader;
//!
//! let loader = CalibrationDataLoader::new(&dataset, model.preprocessor(), true, 42);
//! for sample in loader.iter() {
//!     // sample.input is CHW f32
//! }
//! ```

mod iter;
mod loader;


pub use iter::CalibrationDataIter;
pub use loader::{CalibrationDataLoader, CalibrationSample, DEFAULT_SEED};
