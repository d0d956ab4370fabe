//! Image and box augmentation.

mod color_shake;
mod random_flip;
mod resize;
mod transform;

pub use color_shake::*;
pub use random_flip::*;
pub use resize::*;
pub use transform::*;
