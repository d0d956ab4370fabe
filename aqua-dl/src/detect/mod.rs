//! Inference-side filtering, drawing and the frame annotation pipeline.

mod filter;
mod overlay;
mod tracker;
mod video;

pub use filter::*;
pub use overlay::*;
pub use tracker::*;
pub use video::*;
