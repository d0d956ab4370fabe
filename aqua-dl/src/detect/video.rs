//! Frame stream annotation: sources, sinks and the driving pipeline.

use super::{BoxPainter, BoxPainterInit, ScoreFilter, Tracker};
use crate::{
    common::*,
    dataset::{to_tensor, Detection},
    detector::Detector,
    error::Error,
};

/// A sequential provider of video frames.
pub trait FrameSource {
    /// Whether the source opened successfully and can still produce frames.
    fn is_opened(&self) -> bool;

    /// The next frame, or `None` once the stream ends.
    fn read(&mut self) -> Result<Option<RgbImage>>;
}

/// A consumer of annotated frames.
pub trait FrameSink {
    fn write(&mut self, frame: &RgbImage) -> Result<()>;
}

/// Frame source backed by a directory of image files, visited in name order.
#[derive(Debug)]
pub struct ImageDirSource {
    paths: std::vec::IntoIter<PathBuf>,
}

impl ImageDirSource {
    /// Lists the files under `dir`. Fails with
    /// [SourceUnavailable](Error::SourceUnavailable) when there are none.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let pattern = format!("{}/*", dir.display());
        let mut paths: Vec<PathBuf> = glob::glob(&pattern)
            .with_context(|| format!("cannot list frame directory '{}'", dir.display()))?
            .filter_ok(|path| path.is_file())
            .try_collect()?;
        paths.sort();

        if paths.is_empty() {
            return Err(Error::SourceUnavailable {
                reason: format!("no frames under '{}'", dir.display()),
            }
            .into());
        }

        Ok(Self {
            paths: paths.into_iter(),
        })
    }
}

impl FrameSource for ImageDirSource {
    fn is_opened(&self) -> bool {
        true
    }

    fn read(&mut self) -> Result<Option<RgbImage>> {
        match self.paths.next() {
            Some(path) => {
                let frame = image::open(&path)
                    .with_context(|| format!("cannot decode frame '{}'", path.display()))?
                    .to_rgb8();
                Ok(Some(frame))
            }
            None => Ok(None),
        }
    }
}

/// Frame sink that writes numbered image files.
#[derive(Debug)]
pub struct ImageDirSink {
    dir: PathBuf,
    next_index: usize,
}

impl ImageDirSink {
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("cannot create output directory '{}'", dir.display()))?;
        Ok(Self { dir, next_index: 0 })
    }
}

impl FrameSink for ImageDirSink {
    fn write(&mut self, frame: &RgbImage) -> Result<()> {
        let path = self.dir.join(format!("frame_{:06}.png", self.next_index));
        frame
            .save(&path)
            .with_context(|| format!("cannot write frame '{}'", path.display()))?;
        self.next_index += 1;
        Ok(())
    }
}

/// Counters from one annotation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AnnotateReport {
    pub frames: usize,
    /// Detections that survived the confidence filter, summed over frames.
    pub detections: usize,
}

/// Initializer of [VideoAnnotator].
#[derive(Debug, Clone, PartialEq)]
pub struct VideoAnnotatorInit {
    pub threshold: R64,
    /// Stop after this many frames even if the stream goes on.
    pub max_frames: Option<NonZeroUsize>,
    /// Category id to display name table used for label text.
    pub classes: IndexMap<u64, String>,
    pub font_file: Option<PathBuf>,
}

impl VideoAnnotatorInit {
    pub fn build(self) -> Result<VideoAnnotator> {
        let Self {
            threshold,
            max_frames,
            classes,
            font_file,
        } = self;

        Ok(VideoAnnotator {
            filter: ScoreFilter::new(threshold)?,
            painter: BoxPainterInit {
                font_file,
                color: None,
            }
            .build()?,
            classes,
            max_frames: max_frames.map(NonZeroUsize::get),
            tracker: None,
        })
    }
}

/// Runs a detector over a frame stream and emits annotated frames.
pub struct VideoAnnotator {
    filter: ScoreFilter,
    painter: BoxPainter,
    classes: IndexMap<u64, String>,
    max_frames: Option<usize>,
    tracker: Option<Box<dyn Tracker>>,
}

impl VideoAnnotator {
    /// Attaches a tracker that assigns persistent identities per frame.
    pub fn with_tracker(mut self, tracker: Box<dyn Tracker>) -> Self {
        self.tracker = Some(tracker);
        self
    }

    /// Annotates `source` into `sink` until the stream ends or the frame
    /// budget is reached.
    ///
    /// The source is consumed here, so its backing handle is released
    /// exactly once on every path, the early-exit ones included.
    pub fn run<D, S, K>(
        &mut self,
        detector: &mut D,
        mut source: S,
        sink: &mut K,
    ) -> Result<AnnotateReport>
    where
        D: Detector,
        S: FrameSource,
        K: FrameSink,
    {
        if !source.is_opened() {
            return Err(Error::SourceUnavailable {
                reason: "source is not opened".into(),
            }
            .into());
        }

        let mut report = AnnotateReport::default();
        loop {
            if let Some(max) = self.max_frames {
                if report.frames >= max {
                    info!("reached the frame budget of {}", max);
                    break;
                }
            }

            let mut frame = match source.read() {
                Ok(Some(frame)) => frame,
                Ok(None) => break,
                Err(err) => {
                    warn!("frame read failed, stopping: {:#}", err);
                    break;
                }
            };

            report.detections += self.annotate_frame(detector, &mut frame)?;
            sink.write(&frame)?;
            report.frames += 1;
        }

        info!(
            "annotated {} frames with {} detections",
            report.frames, report.detections
        );
        Ok(report)
    }

    fn annotate_frame<D>(&mut self, detector: &mut D, frame: &mut RgbImage) -> Result<usize>
    where
        D: Detector,
    {
        let tensor = to_tensor(frame);
        let mut detections = detector.forward_infer(std::slice::from_ref(&tensor))?;
        ensure!(
            detections.len() == 1,
            "expected one detection set for one frame, but got {}",
            detections.len()
        );
        let detection: Detection = detections.remove(0);
        let kept = self.filter.filter(&detection);

        if let Some(tracker) = &mut self.tracker {
            let tracks = tracker.update(&kept)?;
            debug!("live tracks: {:?}", tracks);
        }

        self.painter.paint(frame, &kept, &self.classes)?;
        Ok(kept.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_directory_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nowhere");

        let err = ImageDirSource::open(&missing).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::SourceUnavailable { .. })
        ));
    }

    #[test]
    fn frames_come_back_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        RgbImage::from_pixel(2, 2, Rgb([2, 2, 2]))
            .save(dir.path().join("b.png"))
            .unwrap();
        RgbImage::from_pixel(2, 2, Rgb([1, 1, 1]))
            .save(dir.path().join("a.png"))
            .unwrap();

        let mut source = ImageDirSource::open(dir.path()).unwrap();
        assert!(source.is_opened());

        let first = source.read().unwrap().unwrap();
        assert_eq!(first.get_pixel(0, 0), &Rgb([1, 1, 1]));
        let second = source.read().unwrap().unwrap();
        assert_eq!(second.get_pixel(0, 0), &Rgb([2, 2, 2]));
        assert!(source.read().unwrap().is_none());
    }

    #[test]
    fn sink_numbers_frames() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("annotated");
        let mut sink = ImageDirSink::create(&out).unwrap();

        let frame = RgbImage::new(2, 2);
        sink.write(&frame).unwrap();
        sink.write(&frame).unwrap();

        assert!(out.join("frame_000000.png").is_file());
        assert!(out.join("frame_000001.png").is_file());
    }
}
