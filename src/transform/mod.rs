//! Preprocessing transform description
//!
//! Models store the transform they were trained with in the serialized
//! albumentations layout:
//!
//! ```json
//! {"__version__": "1.3.0",
//!  "transform": {"__class_fullname__": "Compose", "transforms": [ ... ]}}
//! ```
//!
//! Only the entries the deployment path understands are typed; anything
//! else is carried through as [`TransformSpec::Other`].

mod pipeline;


pub use pipeline::{TransformPipeline, TransformSpec, IMAGENET_MEAN, IMAGENET_STD};
