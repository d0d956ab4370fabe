use crate::{common::*, dataset::Detection};

/// One tracked object with its stable identity.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedDetection {
    pub track_id: u64,
    pub rect: XYXY<R64>,
    pub label: u64,
    pub score: R64,
}

/// Associates per-frame detections with persistent track identities.
///
/// The annotation pipeline treats this as an optional plug-in; no
/// implementation ships in this crate.
pub trait Tracker {
    /// Feeds the detections of the next frame and returns the live tracks.
    fn update(&mut self, detection: &Detection) -> Result<Vec<TrackedDetection>>;
}
