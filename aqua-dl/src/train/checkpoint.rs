use crate::{common::*, detector::Detector};

pub const FILE_STRFTIME: &str = "%Y-%m-%d-%H-%M-%S.%3f%z";

/// Writes the detector parameters into `dir`, named by wall time, epoch and
/// loss so a directory listing sorts chronologically.
pub fn save_checkpoint<D>(detector: &D, dir: &Path, epoch: usize, loss: f64) -> Result<PathBuf>
where
    D: Detector + ?Sized,
{
    fs::create_dir_all(dir)
        .with_context(|| format!("cannot create checkpoint directory '{}'", dir.display()))?;

    let filename = format!(
        "{}_{:06}_{:08.5}.ckpt",
        Local::now().format(FILE_STRFTIME),
        epoch,
        loss
    );
    let path = dir.join(filename);
    detector.save(&path)?;
    info!("saved checkpoint to '{}'", path.display());
    Ok(path)
}
