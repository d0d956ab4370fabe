use crate::{
    common::*,
    dataset::{BatchLoader, RandomAccessDataset},
    detector::{Detector, Device, Optimizer},
    error::Error,
    train::{save_checkpoint, EpochReport, LossAverager},
};

/// Initializer of [Trainer].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrainerInit {
    pub epochs: NonZeroUsize,
    pub device: Device,
    /// Where final parameters land. `None` disables checkpointing.
    pub checkpoint_dir: Option<PathBuf>,
}

impl TrainerInit {
    pub fn build(self) -> Trainer {
        let Self {
            epochs,
            device,
            checkpoint_dir,
        } = self;

        Trainer {
            epochs: epochs.get(),
            device,
            checkpoint_dir,
        }
    }
}

/// Drives the train loop: batches in, losses out, parameters updated.
#[derive(Debug)]
pub struct Trainer {
    epochs: usize,
    device: Device,
    checkpoint_dir: Option<PathBuf>,
}

impl Trainer {
    /// Runs the full schedule and returns one report per epoch.
    ///
    /// A non-finite total loss aborts the run before the parameter update
    /// and surfaces as [Error::LossDiverged].
    pub fn run<D, O, A>(
        &self,
        detector: &mut D,
        optimizer: &mut O,
        loader: &BatchLoader<A>,
    ) -> Result<Vec<EpochReport>>
    where
        D: Detector,
        O: Optimizer,
        A: RandomAccessDataset + Send + Sync + 'static,
    {
        detector.to_device(self.device)?;
        info!("training on {} for {} epochs", self.device, self.epochs);

        let mut reports = Vec::with_capacity(self.epochs);
        for epoch in 1..=self.epochs {
            let report = self.run_epoch(detector, optimizer, loader, epoch)?;
            info!("{}", report);
            reports.push(report);
        }

        if let Some(dir) = &self.checkpoint_dir {
            if let Some(report) = reports.last() {
                save_checkpoint(detector, dir, report.epoch, report.mean_total_loss)?;
            }
        }

        Ok(reports)
    }

    fn run_epoch<D, O, A>(
        &self,
        detector: &mut D,
        optimizer: &mut O,
        loader: &BatchLoader<A>,
        epoch: usize,
    ) -> Result<EpochReport>
    where
        D: Detector,
        O: Optimizer,
        A: RandomAccessDataset + Send + Sync + 'static,
    {
        let mut averager = LossAverager::new();

        for (step, batch) in loader.epoch().enumerate() {
            let batch = batch?;
            let losses = detector.forward_train(&batch.images, &batch.targets)?;

            let total = losses.total();
            if !total.is_finite() {
                error!(
                    "loss diverged at epoch {} step {}: total = {}",
                    epoch, step, total
                );
                error!("loss components: {:#?}", losses);
                return Err(Error::LossDiverged {
                    epoch,
                    step,
                    total,
                    losses,
                }
                .into());
            }

            optimizer.zero_gradients()?;
            detector.backward()?;
            optimizer.step()?;

            averager.update(&losses);
            debug!("epoch {} step {}: {}", epoch, step, losses);
        }

        averager.into_report(epoch, optimizer.learning_rate())
    }
}
