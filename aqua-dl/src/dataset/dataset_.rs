//! Dataset trait family.

use crate::{common::*, dataset::Sample};

/// The generic dataset trait.
pub trait GenericDataset {
    fn input_channels(&self) -> usize;
    fn classes(&self) -> &IndexSet<String>;
}

/// Datasets with random access to samples.
pub trait RandomAccessDataset: GenericDataset {
    fn num_records(&self) -> usize;

    /// Loads the sample at `index`, in `[0, num_records)`.
    fn nth(&self, index: usize) -> Result<Sample>;
}
