//! Capability interfaces for the consumed detection model and its optimizer.

use crate::{
    common::*,
    dataset::{Detection, Target},
};

/// Compute placement for model parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Device {
    Cpu,
    Cuda(usize),
}

impl FromStr for Device {
    type Err = anyhow::Error;

    fn from_str(text: &str) -> Result<Self> {
        if text == "cpu" {
            return Ok(Self::Cpu);
        }
        if let Some(index) = text.strip_prefix("cuda:") {
            let index: usize = index
                .parse()
                .with_context(|| format!("invalid device ordinal in '{}'", text))?;
            return Ok(Self::Cuda(index));
        }
        bail!("invalid device name '{}'", text);
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cpu => write!(f, "cpu"),
            Self::Cuda(index) => write!(f, "cuda:{}", index),
        }
    }
}

impl Serialize for Device {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Device {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(DeserializeError::custom)
    }
}

/// Named loss components returned by one training forward pass.
///
/// Component order is preserved so logs and reports stay stable. Values are
/// plain `f64` because the divergence guard must be able to observe NaN and
/// infinities.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LossBundle {
    components: IndexMap<String, f64>,
}

impl LossBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.components.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.components.get(name).copied()
    }

    pub fn components(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.components
            .iter()
            .map(|(name, &value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Sum of all component values.
    pub fn total(&self) -> f64 {
        self.components.values().sum()
    }

    pub fn is_finite(&self) -> bool {
        self.total().is_finite()
    }
}

impl<S> FromIterator<(S, f64)> for LossBundle
where
    S: Into<String>,
{
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
    {
        let components = iter
            .into_iter()
            .map(|(name, value)| (name.into(), value))
            .collect();
        Self { components }
    }
}

impl fmt::Display for LossBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "total = {:.5}", self.total())?;
        self.components()
            .try_for_each(|(name, value)| write!(f, ", {} = {:.5}", name, value))
    }
}

/// An object detection model consumed by the training and inference
/// pipelines.
///
/// The model internals (backbone, region proposals, loss functions) are the
/// implementer's business. The pipelines only rely on the two forward modes,
/// the gradient hook and parameter (de)serialization.
pub trait Detector {
    /// Runs the model in training mode and returns the decomposed losses for
    /// the batch.
    fn forward_train(&mut self, images: &[Array3<f32>], targets: &[Target]) -> Result<LossBundle>;

    /// Runs the model in inference mode, producing one [Detection] per input
    /// image.
    fn forward_infer(&mut self, images: &[Array3<f32>]) -> Result<Vec<Detection>>;

    /// Computes parameter gradients for the most recent training forward.
    fn backward(&mut self) -> Result<()>;

    /// Moves model parameters to the device.
    fn to_device(&mut self, device: Device) -> Result<()>;

    /// Serializes the trained parameters.
    fn save(&self, path: &Path) -> Result<()>;

    /// Restores parameters written by [save](Self::save).
    fn load(&mut self, path: &Path) -> Result<()>;
}

/// Parameter update capability driven by the training orchestrator.
pub trait Optimizer {
    fn zero_gradients(&mut self) -> Result<()>;

    fn step(&mut self) -> Result<()>;

    /// The current learning rate, surfaced in epoch reports.
    fn learning_rate(&self) -> R64;
}
