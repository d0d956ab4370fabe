//! Run configuration loaded from JSON5 files.

pub use annotate::*;
pub use dataset::*;
pub use training::*;

use crate::{common::*, detect::DEFAULT_THRESHOLD, detector::Device};

pub static CONFIG_VERSION: Lazy<VersionReq> =
    Lazy::new(|| VersionReq::parse("^0.1").unwrap());

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(deserialize_with = "deserialize_version")]
    pub version: Version,
    pub dataset: DatasetConfig,
    pub training: TrainingConfig,
    pub annotate: AnnotateConfig,
}

impl Config {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("cannot open config file '{}'", path.display()))?;
        let config: Self = json5::from_str(&text)
            .with_context(|| format!("cannot parse config file '{}'", path.display()))?;
        Ok(config)
    }
}

fn deserialize_version<'de, D>(deserializer: D) -> Result<Version, D::Error>
where
    D: Deserializer<'de>,
{
    let version = Version::deserialize(deserializer)?;
    if !CONFIG_VERSION.matches(&version) {
        return Err(DeserializeError::custom(format!(
            "config version {} does not satisfy the requirement {}",
            version, *CONFIG_VERSION
        )));
    }
    Ok(version)
}

fn default_true() -> bool {
    true
}

fn default_device() -> Device {
    Device::Cpu
}

mod dataset {
    use super::*;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct DatasetConfig {
        /// Root holding one subdirectory per split.
        pub dataset_dir: PathBuf,
        pub split: String,
        #[serde(default = "default_image_size")]
        pub image_size: NonZeroUsize,
    }

    fn default_image_size() -> NonZeroUsize {
        NonZeroUsize::new(600).unwrap()
    }
}

mod training {
    use super::*;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct TrainingConfig {
        #[serde(default = "default_epochs")]
        pub epochs: NonZeroUsize,
        #[serde(default = "default_batch_size")]
        pub batch_size: NonZeroUsize,
        #[serde(default = "default_true")]
        pub shuffle: bool,
        #[serde(default = "default_num_workers")]
        pub num_workers: usize,
        #[serde(default = "default_prefetch")]
        pub prefetch: NonZeroUsize,
        #[serde(default = "default_device")]
        pub device: Device,
        #[serde(default)]
        pub checkpoint_dir: Option<PathBuf>,
    }

    fn default_epochs() -> NonZeroUsize {
        NonZeroUsize::new(10).unwrap()
    }

    fn default_batch_size() -> NonZeroUsize {
        NonZeroUsize::new(2).unwrap()
    }

    fn default_num_workers() -> usize {
        num_cpus::get()
    }

    fn default_prefetch() -> NonZeroUsize {
        NonZeroUsize::new(2).unwrap()
    }
}

mod annotate {
    use super::*;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct AnnotateConfig {
        /// Directory of frames to annotate.
        pub source_dir: PathBuf,
        pub output_dir: PathBuf,
        #[serde(default = "default_threshold")]
        pub threshold: R64,
        #[serde(default)]
        pub max_frames: Option<NonZeroUsize>,
        #[serde(default)]
        pub font_file: Option<PathBuf>,
        #[serde(default = "default_device")]
        pub device: Device,
    }

    fn default_threshold() -> R64 {
        r64(DEFAULT_THRESHOLD)
    }
}
