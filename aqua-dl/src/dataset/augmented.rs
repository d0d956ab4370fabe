//! Dataset that loads, augments and normalizes samples on demand.

use crate::{
    common::*,
    dataset::{
        to_tensor, AnnotationIndex, AnnotationStore, GenericDataset, ImageRecord, LabeledBox,
        RandomAccessDataset, Sample, Target,
    },
    error::Error,
    processor::Transform,
};

/// A random-access view over an annotated split with per-access
/// augmentation.
///
/// Images without a single annotation are filtered out once at construction.
/// Every access decodes the image anew and re-runs the transform, so two
/// epochs never see the same augmented pixels.
#[derive(Debug)]
pub struct AugmentedDataset<S, T>
where
    S: AnnotationStore,
    T: Transform,
{
    index: AnnotationIndex<S>,
    transform: T,
    image_ids: Vec<u64>,
}

impl<S, T> AugmentedDataset<S, T>
where
    S: AnnotationStore,
    T: Transform,
{
    pub fn new(index: AnnotationIndex<S>, transform: T) -> Result<Self> {
        let image_ids: Vec<u64> = index
            .image_ids()
            .iter()
            .copied()
            .filter(|&image_id| !index.annotations_for(image_id).is_empty())
            .collect();

        let num_dropped = index.image_ids().len() - image_ids.len();
        if num_dropped > 0 {
            warn!("dropped {} images without annotations", num_dropped);
        }

        Ok(Self {
            index,
            transform,
            image_ids,
        })
    }

    pub fn index(&self) -> &AnnotationIndex<S> {
        &self.index
    }

    /// Image ids that survived the empty-annotation filter, in the index's
    /// order.
    pub fn image_ids(&self) -> &[u64] {
        &self.image_ids
    }
}

impl<S, T> GenericDataset for AugmentedDataset<S, T>
where
    S: AnnotationStore,
    T: Transform,
{
    fn input_channels(&self) -> usize {
        3
    }

    fn classes(&self) -> &IndexSet<String> {
        self.index.classes()
    }
}

impl<S, T> RandomAccessDataset for AugmentedDataset<S, T>
where
    S: AnnotationStore,
    T: Transform,
{
    fn num_records(&self) -> usize {
        self.image_ids.len()
    }

    fn nth(&self, index: usize) -> Result<Sample> {
        let &image_id = self.image_ids.get(index).ok_or(Error::IndexOutOfRange {
            index,
            len: self.image_ids.len(),
        })?;

        let path = self.index.image_path(image_id)?;
        let record = ImageRecord::open(image_id, path)?;

        let boxes: Vec<LabeledBox> = self
            .index
            .annotations_for(image_id)
            .iter()
            .map(LabeledBox::from)
            .collect();

        let (image, boxes) = self
            .transform
            .apply(record.pixels, boxes)
            .with_context(|| format!("augmentation failed for image {}", image_id))?;

        let target = Target::from_labeled_boxes(image_id, boxes)?;
        Ok((to_tensor(&image), target))
    }
}
