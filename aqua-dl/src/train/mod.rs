//! Training orchestration.

mod checkpoint;
mod report;
mod trainer;

pub use checkpoint::*;
pub use report::*;
pub use trainer::*;
