use super::Transform;
use crate::{common::*, dataset::LabeledBox};

/// Initializer of [Resize].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResizeInit {
    pub height: NonZeroUsize,
    pub width: NonZeroUsize,
}

impl ResizeInit {
    pub fn build(self) -> Resize {
        let Self { height, width } = self;
        Resize {
            height: height.get() as u32,
            width: width.get() as u32,
        }
    }
}

/// Scales every image to one fixed size and carries the boxes along.
#[derive(Debug)]
pub struct Resize {
    height: u32,
    width: u32,
}

impl Transform for Resize {
    fn apply(
        &self,
        image: RgbImage,
        boxes: Vec<LabeledBox>,
    ) -> Result<(RgbImage, Vec<LabeledBox>)> {
        let (src_w, src_h) = image.dimensions();
        ensure!(src_w > 0 && src_h > 0, "cannot resize an empty image");

        let resized = imageops::resize(&image, self.width, self.height, FilterType::Triangle);
        let map = bbox::Transform::from_resize(
            [src_h as f64, src_w as f64].map(r64),
            [self.height as f64, self.width as f64].map(r64),
        )?;
        let boxes = boxes
            .into_iter()
            .map(|labeled| LabeledBox {
                rect: &map * &labeled.rect,
                ..labeled
            })
            .collect();

        Ok((resized, boxes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_rescales_boxes() {
        let image = RgbImage::from_pixel(200, 100, Rgb([10, 10, 10]));
        let boxes = vec![LabeledBox {
            rect: XYWH::from_xywh([40.0, 20.0, 80.0, 60.0].map(r64)),
            category: 1,
            iscrowd: false,
        }];
        let resize = ResizeInit {
            height: NonZeroUsize::new(50).unwrap(),
            width: NonZeroUsize::new(50).unwrap(),
        }
        .build();

        let (out, boxes) = resize.apply(image, boxes).unwrap();
        assert_eq!(out.dimensions(), (50, 50));
        assert_eq!(boxes[0].rect.xywh(), [10.0, 10.0, 20.0, 30.0].map(r64));
        assert_eq!(boxes[0].category, 1);
    }
}
