//! Dataset items and datasets.

use ndarray::{Array2, Array3};
use serde::{Deserialize, Serialize};

use super::annotation::{Annotation, ScoredLabel};
use crate::label::Label;

/// Media produced by inference and attached to an item.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultMedia {
    pub name: String,
    pub media_type: String,
    pub label: Label,
    /// Heat map scaled to `0..=255`, at image resolution.
    pub numpy: Array2<u8>,
}

/// An image with its annotations and image-level labels.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetItem {
    /// Pixels in HWC layout, RGB.
    pub image: Array3<u8>,
    /// Local annotations (boxes, polygons).
    pub annotations: Vec<Annotation>,
    /// Image-level labels.
    pub labels: Vec<ScoredLabel>,
    pub metadata: Vec<ResultMedia>,
}

impl DatasetItem {
    pub fn new(image: Array3<u8>) -> Self {
        Self {
            image,
            annotations: Vec::new(),
            labels: Vec::new(),
            metadata: Vec::new(),
        }
    }

    /// Attach an image-level label with full confidence.
    pub fn with_label(mut self, label: Label) -> Self {
        self.labels.push(ScoredLabel::new(label, 1.0));
        self
    }

    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// `(height, width)` of the image.
    pub fn size(&self) -> (usize, usize) {
        let (h, w, _) = self.image.dim();
        (h, w)
    }

    /// First image-level label, which decides the item's class.
    pub fn primary_label(&self) -> Option<&Label> {
        self.labels.first().map(|l| &l.label)
    }

    pub fn is_anomalous(&self) -> bool {
        self.primary_label().is_some_and(|l| l.is_anomalous)
    }

    pub fn append_annotations(&mut self, annotations: impl IntoIterator<Item = Annotation>) {
        self.annotations.extend(annotations);
    }

    pub fn append_labels(&mut self, labels: impl IntoIterator<Item = ScoredLabel>) {
        self.labels.extend(labels);
    }

    pub fn append_metadata_item(&mut self, media: ResultMedia) {
        self.metadata.push(media);
    }
}

/// What a dataset is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DatasetPurpose {
    #[default]
    Inference,
    Training,
    Validation,
    Evaluation,
    Temporary,
}

/// Ordered collection of items.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    pub items: Vec<DatasetItem>,
    pub purpose: DatasetPurpose,
}

impl Dataset {
    pub fn new(items: Vec<DatasetItem>, purpose: DatasetPurpose) -> Self {
        Self { items, purpose }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DatasetItem> {
        self.items.iter()
    }

    pub fn get(&self, index: usize) -> Option<&DatasetItem> {
        self.items.get(index)
    }

    /// Items whose primary label is anomalous, keeping the purpose.
    ///
    /// Training subsets of anomaly tasks hold only normal images, so
    /// quantization statistics come from the anomalous items.
    pub fn anomalous_subset(&self) -> Dataset {
        Dataset {
            items: self.items.iter().filter(|i| i.is_anomalous()).cloned().collect(),
            purpose: self.purpose,
        }
    }

    /// Copy of the images without any annotations, labels or media.
    pub fn with_empty_predictions(&self) -> Dataset {
        Dataset {
            items: self.items.iter().map(|i| DatasetItem::new(i.image.clone())).collect(),
            purpose: self.purpose,
        }
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a DatasetItem;
    type IntoIter = std::slice::Iter<'a, DatasetItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<DatasetItem> for Dataset {
    fn from_iter<T: IntoIterator<Item = DatasetItem>>(iter: T) -> Self {
        Dataset::new(iter.into_iter().collect(), DatasetPurpose::default())
    }
}
