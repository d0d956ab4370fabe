use crate::{common::*, detector::LossBundle};

/// Per-epoch mean losses and the trainer state they were observed under.
#[derive(Debug, Clone, PartialEq)]
pub struct EpochReport {
    pub epoch: usize,
    pub learning_rate: R64,
    pub mean_total_loss: f64,
    pub mean_losses: IndexMap<String, f64>,
    pub num_steps: usize,
}

impl fmt::Display for EpochReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "epoch: {}\tlr: {:.5}\tloss: {:.5}",
            self.epoch,
            self.learning_rate.raw(),
            self.mean_total_loss
        )?;
        self.mean_losses
            .iter()
            .try_for_each(|(name, loss)| write!(f, "\t{}: {:.5}", name, loss))
    }
}

/// Accumulates step losses over an epoch and reduces them to means.
#[derive(Debug, Default)]
pub struct LossAverager {
    component_sums: IndexMap<String, f64>,
    total_sum: f64,
    count: usize,
}

impl LossAverager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, losses: &LossBundle) {
        losses.components().for_each(|(name, loss)| {
            *self.component_sums.entry(name.to_owned()).or_insert(0.0) += loss;
        });
        self.total_sum += losses.total();
        self.count += 1;
    }

    pub fn num_steps(&self) -> usize {
        self.count
    }

    pub fn into_report(self, epoch: usize, learning_rate: R64) -> Result<EpochReport> {
        ensure!(self.count > 0, "epoch {} saw no batches", epoch);

        let count = self.count as f64;
        let mean_losses = self
            .component_sums
            .into_iter()
            .map(|(name, sum)| (name, sum / count))
            .collect();

        Ok(EpochReport {
            epoch,
            learning_rate,
            mean_total_loss: self.total_sum / count,
            mean_losses,
            num_steps: self.count,
        })
    }
}
