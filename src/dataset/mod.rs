//! Datasets, items and annotations
//!
//! Images are `ndarray` HWC `u8` arrays. Geometry is kept in normalized
//! coordinates so annotations survive resizing.

mod annotation;
mod item;

#[cfg(test)]
mod tests;

pub use annotation::{Annotation, Point, ScoredLabel, Shape};
pub use item::{Dataset, DatasetItem, DatasetPurpose, ResultMedia};
