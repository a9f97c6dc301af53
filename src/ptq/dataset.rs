//! Dataset adapter handed to the quantizer.

use ndarray::Array3;

use crate::calibration::{CalibrationDataIter, CalibrationDataLoader};

/// Yields only the network inputs of a calibration loader, in its order.
pub struct QuantizationDataset<'a> {
    samples: CalibrationDataIter<'a, 'a>,
}

impl<'a> QuantizationDataset<'a> {
    pub fn new(loader: &'a CalibrationDataLoader<'a>) -> Self {
        Self {
            samples: loader.iter(),
        }
    }
}

impl Iterator for QuantizationDataset<'_> {
    type Item = Array3<f32>;

    fn next(&mut self) -> Option<Self::Item> {
        self.samples.next().map(|sample| sample.input)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.samples.size_hint()
    }
}

impl ExactSizeIterator for QuantizationDataset<'_> {}
