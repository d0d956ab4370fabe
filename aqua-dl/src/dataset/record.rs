//! Value records flowing through the dataset and inference pipelines.

use crate::common::*;

/// One training sample: the normalized image and its target.
pub type Sample = (Array3<f32>, Target);

/// One category of the dataset's label space.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    pub name: String,
}

/// An image listed by the annotation store. The pixel payload is loaded on
/// demand, not here.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageEntry {
    pub id: u64,
    pub file_name: String,
    pub height: u32,
    pub width: u32,
}

/// A ground-truth object instance tied to one image, in the annotation
/// store's position+size box convention.
#[derive(Debug, Clone, PartialEq)]
pub struct RawAnnotation {
    pub image_id: u64,
    pub category_id: u64,
    pub bbox: XYWH<R64>,
    pub iscrowd: bool,
}

/// An image payload decoded to canonical RGB.
#[derive(Debug, Clone)]
pub struct ImageRecord {
    pub id: u64,
    pub path: PathBuf,
    pub pixels: RgbImage,
}

impl ImageRecord {
    /// Decodes the file and converts to RGB regardless of the source color
    /// layout.
    pub fn open(id: u64, path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let pixels = image::open(&path)
            .with_context(|| format!("cannot open image file '{}'", path.display()))?
            .to_rgb8();
        Ok(Self { id, path, pixels })
    }
}

/// A box together with its label payload, as carried through augmentation.
///
/// The category and crowd flag travel with the rectangle so a transform that
/// drops or reorders boxes keeps every target sequence aligned.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledBox {
    pub rect: XYWH<R64>,
    pub category: u64,
    pub iscrowd: bool,
}

impl From<&RawAnnotation> for LabeledBox {
    fn from(annotation: &RawAnnotation) -> Self {
        Self {
            rect: annotation.bbox.clone(),
            category: annotation.category_id,
            iscrowd: annotation.iscrowd,
        }
    }
}

/// Ground truth for one image in the detector's corner box convention.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub boxes: Vec<XYXY<R64>>,
    pub labels: Vec<u64>,
    pub image_id: u64,
    pub areas: Vec<R64>,
    pub iscrowd: Vec<bool>,
}

impl Target {
    /// Builds the target from post-augmentation boxes, converting each to
    /// corner form and deriving its area.
    pub fn from_labeled_boxes(image_id: u64, boxes: Vec<LabeledBox>) -> Result<Self> {
        let zero = r64(0.0);
        let mut corner_boxes = Vec::with_capacity(boxes.len());
        let mut labels = Vec::with_capacity(boxes.len());
        let mut areas = Vec::with_capacity(boxes.len());
        let mut iscrowd = Vec::with_capacity(boxes.len());

        for LabeledBox {
            rect,
            category,
            iscrowd: crowd,
        } in boxes
        {
            ensure!(
                rect.w() > zero && rect.h() > zero,
                "degenerate box {:?} for image {}: width and height must be positive",
                rect,
                image_id
            );
            let corner = rect.to_xyxy();
            areas.push(corner.area());
            corner_boxes.push(corner);
            labels.push(category);
            iscrowd.push(crowd);
        }

        Ok(Self {
            boxes: corner_boxes,
            labels,
            image_id,
            areas,
            iscrowd,
        })
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}

/// Per-image inference output as parallel sequences.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Detection {
    pub boxes: Vec<XYXY<R64>>,
    pub labels: Vec<u64>,
    pub scores: Vec<R64>,
}

impl Detection {
    pub fn try_from_parts(boxes: Vec<XYXY<R64>>, labels: Vec<u64>, scores: Vec<R64>) -> Result<Self> {
        ensure!(
            boxes.len() == labels.len() && labels.len() == scores.len(),
            "boxes, labels and scores must have equal lengths, got {}/{}/{}",
            boxes.len(),
            labels.len(),
            scores.len()
        );
        ensure!(
            scores
                .iter()
                .all(|&score| score >= r64(0.0) && score <= r64(1.0)),
            "scores must lie in [0, 1]"
        );

        Ok(Self {
            boxes,
            labels,
            scores,
        })
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}

/// Converts an RGB image to a HWC float array with values in `[0, 1]`.
pub fn to_tensor(image: &RgbImage) -> Array3<f32> {
    let (width, height) = image.dimensions();
    let mut tensor = Array3::zeros((height as usize, width as usize, 3));
    for (x, y, pixel) in image.enumerate_pixels() {
        for (channel, &value) in pixel.0.iter().enumerate() {
            tensor[(y as usize, x as usize, channel)] = value as f32 / 255.0;
        }
    }
    tensor
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn labeled(xywh: [f64; 4], category: u64, iscrowd: bool) -> LabeledBox {
        LabeledBox {
            rect: XYWH::from_xywh(xywh.map(r64)),
            category,
            iscrowd,
        }
    }

    #[test]
    fn target_sequences_stay_parallel() {
        let target = Target::from_labeled_boxes(
            7,
            vec![
                labeled([0.0, 0.0, 4.0, 2.0], 1, false),
                labeled([10.0, 20.0, 5.0, 5.0], 2, true),
                labeled([3.5, 1.5, 2.0, 8.0], 1, false),
            ],
        )
        .unwrap();

        assert_eq!(target.len(), 3);
        assert_eq!(target.labels.len(), target.boxes.len());
        assert_eq!(target.iscrowd.len(), target.boxes.len());
        assert_eq!(target.areas.len(), target.boxes.len());
        assert_eq!(target.image_id, 7);
        assert_eq!(target.labels, vec![1, 2, 1]);
        assert_eq!(target.iscrowd, vec![false, true, false]);

        for (rect, &area) in izip!(&target.boxes, &target.areas) {
            assert_eq!((rect.xmax() - rect.xmin()) * (rect.ymax() - rect.ymin()), area);
        }
    }

    #[test]
    fn target_rejects_degenerate_boxes() {
        let result = Target::from_labeled_boxes(1, vec![labeled([5.0, 5.0, 0.0, 3.0], 1, false)]);
        assert!(result.is_err());
    }

    #[test]
    fn empty_target_is_coherent() {
        let target = Target::from_labeled_boxes(3, vec![]).unwrap();
        assert!(target.is_empty());
        assert!(target.labels.is_empty());
        assert!(target.iscrowd.is_empty());
    }

    #[test]
    fn tensor_layout_and_normalization() {
        let mut image = RgbImage::new(4, 2);
        image.put_pixel(0, 0, Rgb([255, 0, 128]));
        image.put_pixel(3, 1, Rgb([51, 102, 204]));

        let tensor = to_tensor(&image);
        assert_eq!(tensor.dim(), (2, 4, 3));
        assert_abs_diff_eq!(tensor[(0, 0, 0)], 1.0);
        assert_abs_diff_eq!(tensor[(0, 0, 1)], 0.0);
        assert_abs_diff_eq!(tensor[(0, 0, 2)], 128.0 / 255.0);
        assert_abs_diff_eq!(tensor[(1, 3, 0)], 0.2);
        assert_abs_diff_eq!(tensor[(1, 3, 1)], 0.4);
        assert_abs_diff_eq!(tensor[(1, 3, 2)], 0.8);
    }

    #[test]
    fn detection_parts_must_align() {
        let result = Detection::try_from_parts(
            vec![XYXY::from_xyxy([0.0, 0.0, 1.0, 1.0].map(r64))],
            vec![1, 2],
            vec![r64(0.5)],
        );
        assert!(result.is_err());
    }
}
