//! Data loading, training orchestration and frame annotation for an
//! aquarium object detector.
//!
//! The crate owns everything around the model: parsing COCO annotation
//! splits, augmenting and batching samples, driving the epoch loop with its
//! divergence guard, filtering and painting detections, and walking frame
//! streams. The model itself stays behind the [Detector](detector::Detector)
//! and [Optimizer](detector::Optimizer) interfaces so any backend can plug
//! in.

pub mod common;
pub mod config;
pub mod dataset;
pub mod detect;
pub mod detector;
pub mod error;
pub mod processor;
pub mod train;

pub use error::Error;
