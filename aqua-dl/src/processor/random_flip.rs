use super::Transform;
use crate::{common::*, dataset::LabeledBox};

/// Initializer of [RandomFlip].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RandomFlipInit {
    pub horizontal_prob: R64,
    pub vertical_prob: R64,
}

impl RandomFlipInit {
    pub fn build(self) -> Result<RandomFlip> {
        let Self {
            horizontal_prob,
            vertical_prob,
        } = self;
        ensure!(
            (0.0..=1.0).contains(&horizontal_prob.raw())
                && (0.0..=1.0).contains(&vertical_prob.raw()),
            "flip probabilities must be within [0.0, 1.0], but got {} and {}",
            horizontal_prob,
            vertical_prob
        );

        Ok(RandomFlip {
            horizontal_prob,
            vertical_prob,
        })
    }
}

/// Mirrors the image about either axis, each drawn independently.
#[derive(Debug)]
pub struct RandomFlip {
    horizontal_prob: R64,
    vertical_prob: R64,
}

impl Transform for RandomFlip {
    fn apply(
        &self,
        image: RgbImage,
        boxes: Vec<LabeledBox>,
    ) -> Result<(RgbImage, Vec<LabeledBox>)> {
        let mut rng = StdRng::from_entropy();
        let (width, height) = image.dimensions();
        let frame_w = r64(width as f64);
        let frame_h = r64(height as f64);

        let (image, boxes) = if rng.gen_bool(self.horizontal_prob.raw()) {
            let image = imageops::flip_horizontal(&image);
            let boxes = boxes
                .into_iter()
                .map(|labeled| LabeledBox {
                    rect: labeled.rect.hflip(frame_w),
                    ..labeled
                })
                .collect();
            (image, boxes)
        } else {
            (image, boxes)
        };

        let (image, boxes) = if rng.gen_bool(self.vertical_prob.raw()) {
            let image = imageops::flip_vertical(&image);
            let boxes = boxes
                .into_iter()
                .map(|labeled| LabeledBox {
                    rect: labeled.rect.vflip(frame_h),
                    ..labeled
                })
                .collect();
            (image, boxes)
        } else {
            (image, boxes)
        };

        Ok((image, boxes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marked_image() -> RgbImage {
        let mut image = RgbImage::new(4, 2);
        image.put_pixel(0, 0, Rgb([255, 0, 0]));
        image
    }

    fn corner_box() -> LabeledBox {
        LabeledBox {
            rect: XYWH::from_xywh([0.0, 0.0, 1.0, 1.0].map(r64)),
            category: 0,
            iscrowd: false,
        }
    }

    #[test]
    fn certain_flip_mirrors_image_and_boxes() {
        let flip = RandomFlipInit {
            horizontal_prob: r64(1.0),
            vertical_prob: r64(0.0),
        }
        .build()
        .unwrap();

        let (out, boxes) = flip.apply(marked_image(), vec![corner_box()]).unwrap();
        assert_eq!(out.get_pixel(3, 0), &Rgb([255, 0, 0]));
        assert_eq!(boxes[0].rect.xywh(), [3.0, 0.0, 1.0, 1.0].map(r64));
    }

    #[test]
    fn never_flip_is_identity() {
        let flip = RandomFlipInit {
            horizontal_prob: r64(0.0),
            vertical_prob: r64(0.0),
        }
        .build()
        .unwrap();

        let image = marked_image();
        let (out, boxes) = flip.apply(image.clone(), vec![corner_box()]).unwrap();
        assert_eq!(out, image);
        assert_eq!(boxes, vec![corner_box()]);
    }

    #[test]
    fn build_rejects_probability_out_of_range() {
        let result = RandomFlipInit {
            horizontal_prob: r64(1.5),
            vertical_prob: r64(0.0),
        }
        .build();
        assert!(result.is_err());
    }
}
