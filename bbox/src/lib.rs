//! Safe bounding box types and functions.

mod common;

pub use into_xyxy::*;
pub mod into_xyxy;

pub use into_xywh::*;
pub mod into_xywh;

pub use transform::*;
mod transform;

pub use rect::*;
pub mod rect;

pub use xyxy::*;
pub mod xyxy;

pub use xywh::*;
pub mod xywh;

pub mod prelude {
    pub use crate::rect::{Rect, RectNum};
}
