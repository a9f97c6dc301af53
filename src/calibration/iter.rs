//! Iterator over calibration samples.

use super::loader::{CalibrationDataLoader, CalibrationSample};

/// Sequential iterator over a [`CalibrationDataLoader`].
pub struct CalibrationDataIter<'l, 'a> {
    loader: &'l CalibrationDataLoader<'a>,
    position: usize,
}

impl<'l, 'a> CalibrationDataIter<'l, 'a> {
    pub(crate) fn new(loader: &'l CalibrationDataLoader<'a>) -> Self {
        Self {
            loader,
            position: 0,
        }
    }
}

impl Iterator for CalibrationDataIter<'_, '_> {
    type Item = CalibrationSample;

    fn next(&mut self) -> Option<Self::Item> {
        let sample = self.loader.get(self.position)?;
        self.position += 1;
        Some(sample)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.loader.len().saturating_sub(self.position);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for CalibrationDataIter<'_, '_> {}
