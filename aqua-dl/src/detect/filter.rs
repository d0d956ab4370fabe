use crate::{common::*, dataset::Detection};

pub const DEFAULT_THRESHOLD: f64 = 0.8;

/// Keeps detections whose confidence reaches the threshold.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScoreFilter {
    threshold: R64,
}

impl ScoreFilter {
    pub fn new(threshold: R64) -> Result<Self> {
        ensure!(
            threshold >= r64(0.0) && threshold <= r64(1.0),
            "score threshold must be within [0.0, 1.0], but got {}",
            threshold
        );
        Ok(Self { threshold })
    }

    pub fn threshold(&self) -> R64 {
        self.threshold
    }

    /// Keeps entries with `score >= threshold`, preserving their order and
    /// the alignment of the three sequences. A boundary score survives.
    pub fn filter(&self, detection: &Detection) -> Detection {
        let mut boxes = Vec::new();
        let mut labels = Vec::new();
        let mut scores = Vec::new();

        for (rect, &label, &score) in
            izip!(&detection.boxes, &detection.labels, &detection.scores)
        {
            if score >= self.threshold {
                boxes.push(rect.clone());
                labels.push(label);
                scores.push(score);
            }
        }

        Detection {
            boxes,
            labels,
            scores,
        }
    }
}
