//! Order-preserving index over a parsed annotation split.

use crate::{
    common::*,
    dataset::{Category, ImageEntry, RawAnnotation},
    error::Error,
};

/// A parsed annotation split: the triple of categories, images and
/// annotations, plus pixel file resolution.
pub trait AnnotationStore {
    fn categories(&self) -> &[Category];
    fn images(&self) -> &[ImageEntry];
    fn annotations(&self) -> &[RawAnnotation];

    /// Resolves the pixel file behind an image entry.
    fn image_path(&self, entry: &ImageEntry) -> PathBuf;
}

/// Lookup structure built once per split from an [AnnotationStore].
///
/// Image ids are listed in ascending order. Per-image annotation buckets and
/// the category name table are owned here so lookups stay allocation-free.
#[derive(Debug)]
pub struct AnnotationIndex<S>
where
    S: AnnotationStore,
{
    store: S,
    image_ids: Vec<u64>,
    entries: HashMap<u64, ImageEntry>,
    buckets: HashMap<u64, Vec<RawAnnotation>>,
    categories: IndexMap<u64, String>,
    classes: IndexSet<String>,
}

impl<S> AnnotationIndex<S>
where
    S: AnnotationStore,
{
    pub fn new(store: S) -> Result<Self> {
        let mut categories = IndexMap::new();
        for Category { id, name } in store.categories() {
            let prev = categories.insert(*id, name.clone());
            ensure!(prev.is_none(), "duplicate category id {}", id);
        }
        let classes: IndexSet<String> = categories.values().cloned().collect();

        let mut image_ids = Vec::with_capacity(store.images().len());
        let mut entries = HashMap::with_capacity(store.images().len());
        for entry in store.images() {
            let prev = entries.insert(entry.id, entry.clone());
            ensure!(prev.is_none(), "duplicate image id {}", entry.id);
            image_ids.push(entry.id);
        }
        image_ids.sort_unstable();

        let mut buckets: HashMap<u64, Vec<RawAnnotation>> = HashMap::new();
        for annotation in store.annotations() {
            ensure!(
                entries.contains_key(&annotation.image_id),
                "annotation references unknown image id {}",
                annotation.image_id
            );
            ensure!(
                categories.contains_key(&annotation.category_id),
                Error::UnknownCategory {
                    id: annotation.category_id
                }
            );
            buckets
                .entry(annotation.image_id)
                .or_default()
                .push(annotation.clone());
        }

        Ok(Self {
            store,
            image_ids,
            entries,
            buckets,
            categories,
            classes,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Image ids in ascending order.
    pub fn image_ids(&self) -> &[u64] {
        &self.image_ids
    }

    /// Annotations of one image; empty when the image has none.
    pub fn annotations_for(&self, image_id: u64) -> &[RawAnnotation] {
        self.buckets
            .get(&image_id)
            .map(|bucket| bucket.as_slice())
            .unwrap_or(&[])
    }

    pub fn entry(&self, image_id: u64) -> Option<&ImageEntry> {
        self.entries.get(&image_id)
    }

    /// Pixel file of one image.
    pub fn image_path(&self, image_id: u64) -> Result<PathBuf> {
        let entry = self
            .entries
            .get(&image_id)
            .ok_or_else(|| format_err!("unknown image id {}", image_id))?;
        Ok(self.store.image_path(entry))
    }

    pub fn category_name(&self, category_id: u64) -> Result<&str> {
        let name = self
            .categories
            .get(&category_id)
            .ok_or(Error::UnknownCategory { id: category_id })?;
        Ok(name)
    }

    /// Category id to name table in file order.
    pub fn categories(&self) -> &IndexMap<u64, String> {
        &self.categories
    }

    /// Category names in file order.
    pub fn classes(&self) -> &IndexSet<String> {
        &self.classes
    }

    pub fn num_categories(&self) -> usize {
        self.categories.len()
    }
}
