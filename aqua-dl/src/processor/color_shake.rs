use super::Transform;
use crate::{common::*, dataset::LabeledBox};

/// Initializer of [ColorShake].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColorShakeInit {
    /// Chance of perturbing at all.
    pub prob: R64,
    /// Largest brightness offset, as a fraction of the full pixel range.
    pub max_brightness: Option<R64>,
    /// Largest contrast adjustment, as a fraction.
    pub max_contrast: Option<R64>,
    /// Largest hue rotation in either direction, in degrees.
    pub max_hue_degrees: Option<i32>,
}

impl ColorShakeInit {
    pub fn build(self) -> Result<ColorShake> {
        let Self {
            prob,
            max_brightness,
            max_contrast,
            max_hue_degrees,
        } = self;
        ensure!(
            (0.0..=1.0).contains(&prob.raw()),
            "shake probability must be within [0.0, 1.0], but got {}",
            prob
        );
        if let Some(max) = max_brightness {
            ensure!(max > r64(0.0), "max_brightness must be positive");
        }
        if let Some(max) = max_contrast {
            ensure!(max > r64(0.0), "max_contrast must be positive");
        }
        if let Some(max) = max_hue_degrees {
            ensure!(max > 0, "max_hue_degrees must be positive");
        }

        Ok(ColorShake {
            prob,
            max_brightness,
            max_contrast,
            max_hue_degrees,
        })
    }
}

/// Randomly perturbs pixel colors. Boxes pass through untouched since the
/// geometry does not change.
#[derive(Debug)]
pub struct ColorShake {
    prob: R64,
    max_brightness: Option<R64>,
    max_contrast: Option<R64>,
    max_hue_degrees: Option<i32>,
}

impl Transform for ColorShake {
    fn apply(
        &self,
        image: RgbImage,
        boxes: Vec<LabeledBox>,
    ) -> Result<(RgbImage, Vec<LabeledBox>)> {
        let mut rng = StdRng::from_entropy();
        if !rng.gen_bool(self.prob.raw()) {
            return Ok((image, boxes));
        }

        let mut image = image;
        if let Some(max) = self.max_brightness {
            let shift = rng.gen_range(-max.raw()..=max.raw());
            image = imageops::brighten(&image, (shift * 255.0) as i32);
        }
        if let Some(max) = self.max_contrast {
            let shift = rng.gen_range(-max.raw()..=max.raw());
            image = imageops::contrast(&image, (shift * 100.0) as f32);
        }
        if let Some(max) = self.max_hue_degrees {
            let degrees = rng.gen_range(-max..=max);
            image = imageops::huerotate(&image, degrees);
        }

        Ok((image, boxes))
    }
}
