//! Counting and overlap metrics.

use ndarray::Array2;

use crate::dataset::Shape;

/// Minimum overlap for a predicted box to match a ground-truth box.
pub const IOU_THRESHOLD: f64 = 0.5;

/// Positive-class confusion counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BinaryCounts {
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
}

impl BinaryCounts {
    /// Count one `(truth, predicted)` pair of booleans.
    pub fn record(&mut self, truth: bool, predicted: bool) {
        match (truth, predicted) {
            (true, true) => self.true_positives += 1,
            (false, true) => self.false_positives += 1,
            (true, false) => self.false_negatives += 1,
            (false, false) => {}
        }
    }

    pub fn merge(&mut self, other: BinaryCounts) {
        self.true_positives += other.true_positives;
        self.false_positives += other.false_positives;
        self.false_negatives += other.false_negatives;
    }

    pub fn precision(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_positives)
    }

    pub fn recall(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_negatives)
    }

    /// Harmonic mean of precision and recall. With no positives on either
    /// side there is nothing to get wrong, so the score is 1.
    pub fn f_measure(&self) -> f64 {
        let denominator = 2 * self.true_positives + self.false_positives + self.false_negatives;
        if denominator == 0 {
            return 1.0;
        }
        (2 * self.true_positives) as f64 / denominator as f64
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Intersection over union of two shapes' bounding boxes.
pub fn iou(a: &Shape, b: &Shape) -> f64 {
    let (ax1, ay1, ax2, ay2) = a.bounding_box();
    let (bx1, by1, bx2, by2) = b.bounding_box();
    let width = (ax2.min(bx2) - ax1.max(bx1)).max(0.0);
    let height = (ay2.min(by2) - ay1.max(by1)).max(0.0);
    let intersection = width * height;
    let union = (ax2 - ax1) * (ay2 - ay1) + (bx2 - bx1) * (by2 - by1) - intersection;
    if union <= 0.0 {
        0.0
    } else {
        intersection / union
    }
}

/// Pixel mask of the given shapes at `(height, width)`, sampling pixel centers.
pub fn rasterize<'a>(shapes: impl IntoIterator<Item = &'a Shape>, (height, width): (usize, usize)) -> Array2<bool> {
    let mut mask = Array2::from_elem((height, width), false);
    for shape in shapes {
        for ((y, x), value) in mask.indexed_iter_mut() {
            if !*value {
                let px = (x as f64 + 0.5) / width as f64;
                let py = (y as f64 + 0.5) / height as f64;
                *value = shape.contains(px, py);
            }
        }
    }
    mask
}

/// Dice coefficient of two masks, `None` when both are empty.
pub fn dice(truth: &Array2<bool>, predicted: &Array2<bool>) -> Option<f64> {
    let mut intersection = 0usize;
    let mut total = 0usize;
    for (&t, &p) in truth.iter().zip(predicted.iter()) {
        intersection += usize::from(t && p);
        total += usize::from(t) + usize::from(p);
    }
    (total > 0).then(|| 2.0 * intersection as f64 / total as f64)
}
