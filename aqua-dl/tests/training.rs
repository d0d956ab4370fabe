use anyhow::{ensure, Result};
use aqua_dl::{
    dataset::{BatchLoaderInit, Detection, GenericDataset, LabeledBox, RandomAccessDataset, Sample, Target},
    detector::{Detector, Device, LossBundle, Optimizer},
    error::Error,
    train::TrainerInit,
};
use bbox::{prelude::*, XYWH};
use indexmap::IndexSet;
use ndarray::Array3;
use noisy_float::prelude::*;
use std::{fs, num::NonZeroUsize, path::Path, sync::Arc};

#[derive(Debug)]
struct SyntheticDataset {
    classes: IndexSet<String>,
    len: usize,
}

impl SyntheticDataset {
    fn new(len: usize) -> Self {
        Self {
            classes: ["fish".to_string()].into_iter().collect(),
            len,
        }
    }
}

impl GenericDataset for SyntheticDataset {
    fn input_channels(&self) -> usize {
        3
    }

    fn classes(&self) -> &IndexSet<String> {
        &self.classes
    }
}

impl RandomAccessDataset for SyntheticDataset {
    fn num_records(&self) -> usize {
        self.len
    }

    fn nth(&self, index: usize) -> Result<Sample> {
        let image = Array3::from_elem((2, 2, 3), index as f32);
        let target = Target::from_labeled_boxes(
            index as u64,
            vec![LabeledBox {
                rect: XYWH::from_xywh([0.0, 0.0, 1.0, 1.0].map(r64)),
                category: 0,
                iscrowd: false,
            }],
        )?;
        Ok((image, target))
    }
}

/// Replays a fixed sequence of total losses, split into two components.
#[derive(Debug)]
struct ScriptedDetector {
    script: Vec<f64>,
    forward_calls: usize,
    backward_calls: usize,
    device: Option<Device>,
}

impl ScriptedDetector {
    fn new(script: &[f64]) -> Self {
        Self {
            script: script.to_vec(),
            forward_calls: 0,
            backward_calls: 0,
            device: None,
        }
    }
}

impl Detector for ScriptedDetector {
    fn forward_train(&mut self, images: &[Array3<f32>], targets: &[Target]) -> Result<LossBundle> {
        ensure!(images.len() == targets.len(), "batch sequences must stay parallel");
        ensure!(!images.is_empty(), "empty batch");

        let total = self.script[self.forward_calls.min(self.script.len() - 1)];
        self.forward_calls += 1;
        Ok([
            ("loss_classifier", total / 2.0),
            ("loss_box_reg", total / 2.0),
        ]
        .into_iter()
        .collect())
    }

    fn forward_infer(&mut self, images: &[Array3<f32>]) -> Result<Vec<Detection>> {
        Ok(images.iter().map(|_| Detection::default()).collect())
    }

    fn backward(&mut self) -> Result<()> {
        self.backward_calls += 1;
        Ok(())
    }

    fn to_device(&mut self, device: Device) -> Result<()> {
        self.device = Some(device);
        Ok(())
    }

    fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, b"ckpt")?;
        Ok(())
    }

    fn load(&mut self, _path: &Path) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Default)]
struct RecordingOptimizer {
    zeroed: usize,
    stepped: usize,
}

impl Optimizer for RecordingOptimizer {
    fn zero_gradients(&mut self) -> Result<()> {
        self.zeroed += 1;
        Ok(())
    }

    fn step(&mut self) -> Result<()> {
        self.stepped += 1;
        Ok(())
    }

    fn learning_rate(&self) -> R64 {
        r64(0.005)
    }
}

fn loader(len: usize, batch_size: usize) -> aqua_dl::dataset::BatchLoader<SyntheticDataset> {
    BatchLoaderInit {
        batch_size: NonZeroUsize::new(batch_size).unwrap(),
        shuffle: false,
        num_workers: 0,
        prefetch: NonZeroUsize::new(2).unwrap(),
    }
    .build(Arc::new(SyntheticDataset::new(len)))
}

#[test]
fn full_run_reports_epoch_means() -> Result<()> {
    let mut detector = ScriptedDetector::new(&[1.0, 3.0, 5.0, 7.0]);
    let mut optimizer = RecordingOptimizer::default();
    let trainer = TrainerInit {
        epochs: NonZeroUsize::new(2).unwrap(),
        device: Device::Cpu,
        checkpoint_dir: None,
    }
    .build();

    let reports = trainer.run(&mut detector, &mut optimizer, &loader(4, 2))?;

    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].epoch, 1);
    assert_eq!(reports[0].num_steps, 2);
    assert_eq!(reports[0].learning_rate, r64(0.005));
    assert!((reports[0].mean_total_loss - 2.0).abs() < 1e-9);
    assert!((reports[1].mean_total_loss - 6.0).abs() < 1e-9);
    assert!((reports[0].mean_losses["loss_classifier"] - 1.0).abs() < 1e-9);

    assert_eq!(detector.forward_calls, 4);
    assert_eq!(detector.backward_calls, 4);
    assert_eq!(detector.device, Some(Device::Cpu));
    assert_eq!(optimizer.zeroed, 4);
    assert_eq!(optimizer.stepped, 4);
    Ok(())
}

#[test]
fn divergence_halts_before_the_update() {
    let mut detector = ScriptedDetector::new(&[1.0, f64::NAN, 9.9]);
    let mut optimizer = RecordingOptimizer::default();
    let trainer = TrainerInit {
        epochs: NonZeroUsize::new(1).unwrap(),
        device: Device::Cpu,
        checkpoint_dir: None,
    }
    .build();

    let err = trainer
        .run(&mut detector, &mut optimizer, &loader(6, 2))
        .unwrap_err();

    match err.downcast_ref::<Error>() {
        Some(Error::LossDiverged {
            epoch,
            step,
            total,
            losses,
        }) => {
            assert_eq!(*epoch, 1);
            assert_eq!(*step, 1);
            assert!(total.is_nan());
            assert_eq!(losses.len(), 2);
        }
        other => panic!("expected LossDiverged, got {:?}", other),
    }

    // the diverged step never reaches the optimizer
    assert_eq!(detector.forward_calls, 2);
    assert_eq!(detector.backward_calls, 1);
    assert_eq!(optimizer.zeroed, 1);
    assert_eq!(optimizer.stepped, 1);
}

#[test]
fn final_checkpoint_lands_in_the_directory() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let mut detector = ScriptedDetector::new(&[2.0]);
    let mut optimizer = RecordingOptimizer::default();
    let trainer = TrainerInit {
        epochs: NonZeroUsize::new(1).unwrap(),
        device: Device::Cpu,
        checkpoint_dir: Some(dir.path().to_path_buf()),
    }
    .build();

    trainer.run(&mut detector, &mut optimizer, &loader(2, 2))?;

    let entries: Vec<_> = fs::read_dir(dir.path())?
        .map(|entry| entry.unwrap().path())
        .collect();
    assert_eq!(entries.len(), 1);

    let name = entries[0].file_name().unwrap().to_str().unwrap();
    assert!(name.ends_with("_000001_02.00000.ckpt"), "unexpected name {}", name);
    assert_eq!(fs::read(&entries[0])?, b"ckpt");
    Ok(())
}
