use super::{ColorShakeInit, RandomFlipInit, ResizeInit};
use crate::{common::*, dataset::LabeledBox};

/// A rewrite of an image together with its labeled boxes.
///
/// Implementations must keep every surviving box aligned with the pixels it
/// covered before the rewrite.
pub trait Transform: Debug + Send + Sync {
    fn apply(
        &self,
        image: RgbImage,
        boxes: Vec<LabeledBox>,
    ) -> Result<(RgbImage, Vec<LabeledBox>)>;
}

/// Applies a chain of transforms in order. The empty chain is the identity.
#[derive(Debug)]
pub struct Compose {
    transforms: Vec<Box<dyn Transform>>,
}

impl Compose {
    pub fn new(transforms: Vec<Box<dyn Transform>>) -> Self {
        Self { transforms }
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }
}

impl Transform for Compose {
    fn apply(
        &self,
        image: RgbImage,
        boxes: Vec<LabeledBox>,
    ) -> Result<(RgbImage, Vec<LabeledBox>)> {
        self.transforms
            .iter()
            .try_fold((image, boxes), |(image, boxes), transform| {
                transform.apply(image, boxes)
            })
    }
}

/// The stock augmentation chain.
///
/// Training runs a fixed resize, then random flips and mild color noise.
/// Evaluation only resizes.
pub fn augmentation(image_size: NonZeroUsize, train: bool) -> Result<Compose> {
    let resize = ResizeInit {
        height: image_size,
        width: image_size,
    }
    .build();

    let transforms: Vec<Box<dyn Transform>> = if train {
        vec![
            Box::new(resize),
            Box::new(
                RandomFlipInit {
                    horizontal_prob: r64(0.3),
                    vertical_prob: r64(0.3),
                }
                .build()?,
            ),
            Box::new(
                ColorShakeInit {
                    prob: r64(0.1),
                    max_brightness: Some(r64(0.2)),
                    max_contrast: Some(r64(0.2)),
                    max_hue_degrees: None,
                }
                .build()?,
            ),
            Box::new(
                ColorShakeInit {
                    prob: r64(0.1),
                    max_brightness: None,
                    max_contrast: None,
                    max_hue_degrees: Some(72),
                }
                .build()?,
            ),
        ]
    } else {
        vec![Box::new(resize)]
    };

    Ok(Compose::new(transforms))
}
