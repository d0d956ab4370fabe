//! Variable-arity batch collation.

use crate::{
    common::*,
    dataset::{Sample, Target},
};

/// A collated group of samples as two parallel sequences.
///
/// Images and targets are kept as sequences, never stacked or padded: each
/// sample may carry a different number of annotations.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub images: Vec<Array3<f32>>,
    pub targets: Vec<Target>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// Groups samples into parallel image and target sequences, preserving the
/// input order and touching no element.
pub fn collate(samples: Vec<Sample>) -> Batch {
    let (images, targets) = samples.into_iter().unzip();
    Batch { images, targets }
}
