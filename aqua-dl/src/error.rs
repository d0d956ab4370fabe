//! Typed failure conditions that callers are expected to discriminate.

use crate::{common::*, detector::LossBundle};

/// Failure conditions with a dedicated recovery or reporting path.
///
/// Everything else in this crate propagates as a plain [anyhow::Error] with
/// context. These variants travel inside `anyhow` errors as well and are
/// recovered by downcast.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown category id {id}")]
    UnknownCategory { id: u64 },

    #[error("index {index} is out of range for a dataset of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("frame source unavailable: {reason}")]
    SourceUnavailable { reason: String },

    /// A non-finite training loss. Fatal: the parameter state can no longer
    /// be trusted, so the orchestrator stops before the optimizer runs.
    #[error("training loss diverged at epoch {epoch} step {step}: total = {total}")]
    LossDiverged {
        epoch: usize,
        step: usize,
        total: f64,
        losses: LossBundle,
    },
}
