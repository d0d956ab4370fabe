//! Dataset loading, indexing and batching.

mod augmented;
mod coco_;
mod collate;
mod dataset_;
mod index;
mod loader;
mod record;

pub use augmented::*;
pub use coco_::*;
pub use collate::*;
pub use dataset_::*;
pub use index::*;
pub use loader::*;
pub use record::*;
