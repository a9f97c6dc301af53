//! Calibration data loader implementation.

use ndarray::Array3;
use rand::prelude::*;
use rand::rngs::StdRng;
use tracing::debug;

use super::iter::CalibrationDataIter;
use crate::dataset::{Dataset, ScoredLabel};
use crate::inference::Preprocessor;

/// Seed used when the caller does not pick one.
pub const DEFAULT_SEED: u64 = 42;

/// One preprocessed calibration sample.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationSample {
    /// Index of the item in the source dataset.
    pub index: usize,
    /// Image-level labels of the item.
    pub labels: Vec<ScoredLabel>,
    /// Network input, CHW.
    pub input: Array3<f32>,
}

/// Random-access view over a dataset in a fixed, optionally shuffled order.
#[derive(Debug, Clone)]
pub struct CalibrationDataLoader<'a> {
    dataset: &'a Dataset,
    preprocessor: Preprocessor,
    order: Vec<usize>,
}

impl<'a> CalibrationDataLoader<'a> {
    /// Create a loader. With `shuffle`, the visiting order is a permutation
    /// drawn once from `seed` and kept for the loader's lifetime.
    pub fn new(dataset: &'a Dataset, preprocessor: &Preprocessor, shuffle: bool, seed: u64) -> Self {
        let mut order: Vec<usize> = (0..dataset.len()).collect();
        if shuffle {
            let mut rng = StdRng::seed_from_u64(seed);
            order.shuffle(&mut rng);
        }
        debug!(samples = order.len(), shuffle, "Created calibration data loader");
        Self {
            dataset,
            preprocessor: preprocessor.clone(),
            order,
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Dataset indices in visiting order.
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Sample at position `position` of the visiting order.
    pub fn get(&self, position: usize) -> Option<CalibrationSample> {
        let index = *self.order.get(position)?;
        let item = self.dataset.get(index)?;
        Some(CalibrationSample {
            index,
            labels: item.labels.clone(),
            input: self.preprocessor.preprocess(&item.image),
        })
    }

    pub fn iter(&self) -> CalibrationDataIter<'_, 'a> {
        CalibrationDataIter::new(self)
    }
}

impl<'l, 'a> IntoIterator for &'l CalibrationDataLoader<'a> {
    type Item = CalibrationSample;
    type IntoIter = CalibrationDataIter<'l, 'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
