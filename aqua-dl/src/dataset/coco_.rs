//! COCO JSON annotation store.

use crate::{
    common::*,
    dataset::{AnnotationStore, Category, ImageEntry, RawAnnotation},
};

pub const ANNOTATION_FILE: &str = "_annotations.coco.json";

#[derive(Debug, Clone, Deserialize)]
struct CocoSplit {
    #[serde(default)]
    images: Vec<CocoImage>,
    #[serde(default)]
    annotations: Vec<CocoAnnotation>,
    #[serde(default)]
    categories: Vec<CocoCategory>,
}

#[derive(Debug, Clone, Deserialize)]
struct CocoImage {
    id: u64,
    file_name: String,
    #[serde(default)]
    width: u32,
    #[serde(default)]
    height: u32,
}

#[derive(Debug, Clone, Deserialize)]
struct CocoAnnotation {
    #[serde(default)]
    id: u64,
    image_id: u64,
    category_id: u64,
    /// `[x, y, width, height]` in pixels.
    bbox: Vec<f64>,
    #[serde(default)]
    iscrowd: u8,
}

#[derive(Debug, Clone, Deserialize)]
struct CocoCategory {
    id: u64,
    name: String,
}

/// Annotation store over one COCO-format split directory.
///
/// The split lives at `<root>/<split>/` with the annotation file
/// `_annotations.coco.json` next to the image files it references.
#[derive(Debug, Clone)]
pub struct CocoStore {
    image_dir: PathBuf,
    categories: Vec<Category>,
    images: Vec<ImageEntry>,
    annotations: Vec<RawAnnotation>,
}

impl CocoStore {
    pub fn open(root: impl AsRef<Path>, split: &str) -> Result<Self> {
        let image_dir = root.as_ref().join(split);
        let annotation_file = image_dir.join(ANNOTATION_FILE);
        let text = fs::read_to_string(&annotation_file).with_context(|| {
            format!(
                "cannot open annotation file '{}'",
                annotation_file.display()
            )
        })?;
        let split: CocoSplit = serde_json::from_str(&text).with_context(|| {
            format!(
                "cannot parse annotation file '{}'",
                annotation_file.display()
            )
        })?;
        Self::from_split(image_dir, split)
    }

    fn from_split(image_dir: PathBuf, split: CocoSplit) -> Result<Self> {
        let categories: Vec<_> = split
            .categories
            .into_iter()
            .map(|CocoCategory { id, name }| Category { id, name })
            .collect();

        let images: Vec<_> = split
            .images
            .into_iter()
            .map(
                |CocoImage {
                     id,
                     file_name,
                     width,
                     height,
                 }| ImageEntry {
                    id,
                    file_name,
                    height,
                    width,
                },
            )
            .collect();

        let annotations: Vec<_> = split
            .annotations
            .into_iter()
            .map(|annotation| {
                let CocoAnnotation {
                    id,
                    image_id,
                    category_id,
                    bbox,
                    iscrowd,
                } = annotation;
                let bbox: [f64; 4] = bbox.as_slice().try_into().map_err(|_| {
                    format_err!(
                        "annotation {} has a malformed bbox of {} elements",
                        id,
                        bbox.len()
                    )
                })?;
                let bbox = bbox
                    .iter()
                    .map(|&value| {
                        R64::try_new(value)
                            .ok_or_else(|| format_err!("annotation {} has a NaN coordinate", id))
                    })
                    .try_collect::<_, Vec<_>, _>()?;
                let bbox = XYWH::try_from_xywh([bbox[0], bbox[1], bbox[2], bbox[3]])
                    .with_context(|| format!("annotation {} has an invalid bbox", id))?;

                anyhow::Ok(RawAnnotation {
                    image_id,
                    category_id,
                    bbox,
                    iscrowd: iscrowd != 0,
                })
            })
            .try_collect()?;

        Ok(Self {
            image_dir,
            categories,
            images,
            annotations,
        })
    }
}

impl AnnotationStore for CocoStore {
    fn categories(&self) -> &[Category] {
        &self.categories
    }

    fn images(&self) -> &[ImageEntry] {
        &self.images
    }

    fn annotations(&self) -> &[RawAnnotation] {
        &self.annotations
    }

    fn image_path(&self, entry: &ImageEntry) -> PathBuf {
        self.image_dir.join(&entry.file_name)
    }
}
