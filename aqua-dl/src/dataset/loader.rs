//! Prefetching batch assembly over a random-access dataset.

use crate::{
    common::*,
    dataset::{collate, Batch, RandomAccessDataset},
};

/// Initializer of [BatchLoader].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BatchLoaderInit {
    pub batch_size: NonZeroUsize,
    pub shuffle: bool,
    /// Number of loader threads. Zero loads on the caller's thread.
    pub num_workers: usize,
    /// Bounded count of assembled batches waiting to be consumed.
    pub prefetch: NonZeroUsize,
}

impl BatchLoaderInit {
    pub fn build<D>(self, dataset: Arc<D>) -> BatchLoader<D>
    where
        D: RandomAccessDataset + Send + Sync + 'static,
    {
        let Self {
            batch_size,
            shuffle,
            num_workers,
            prefetch,
        } = self;

        BatchLoader {
            dataset,
            batch_size: batch_size.get(),
            shuffle,
            num_workers,
            prefetch: prefetch.get(),
        }
    }
}

/// Chunks the (optionally shuffled) index sequence into batch-sized runs and
/// assembles each run into a [Batch].
#[derive(Debug)]
pub struct BatchLoader<D> {
    dataset: Arc<D>,
    batch_size: usize,
    shuffle: bool,
    num_workers: usize,
    prefetch: usize,
}

impl<D> BatchLoader<D>
where
    D: RandomAccessDataset + Send + Sync + 'static,
{
    pub fn dataset(&self) -> &Arc<D> {
        &self.dataset
    }

    /// Starts one pass over the dataset.
    ///
    /// With workers, batches arrive in completion order; samples within a
    /// batch always keep their run's index order. The final partial batch is
    /// yielded, not dropped.
    pub fn epoch(&self) -> BatchStream<D> {
        let mut indices: Vec<usize> = (0..self.dataset.num_records()).collect();
        if self.shuffle {
            indices.shuffle(&mut StdRng::from_entropy());
        }
        let chunks: Vec<Vec<usize>> = indices
            .chunks(self.batch_size)
            .map(<[usize]>::to_vec)
            .collect();

        if self.num_workers == 0 {
            return BatchStream {
                inner: Inner::Inline {
                    dataset: self.dataset.clone(),
                    chunks: chunks.into_iter(),
                },
            };
        }

        let (chunk_tx, chunk_rx) = flume::unbounded();
        chunks.into_iter().for_each(|chunk| {
            let _ = chunk_tx.send(chunk);
        });
        drop(chunk_tx);

        let (batch_tx, batch_rx) = flume::bounded(self.prefetch);
        (0..self.num_workers).for_each(|_| {
            let dataset = self.dataset.clone();
            let chunk_rx = chunk_rx.clone();
            let batch_tx = batch_tx.clone();

            thread::spawn(move || {
                for chunk in chunk_rx.iter() {
                    let batch = load_chunk(&*dataset, &chunk);
                    // The consumer hung up; remaining chunks are moot.
                    if batch_tx.send(batch).is_err() {
                        break;
                    }
                }
            });
        });

        BatchStream {
            inner: Inner::Channel(batch_rx),
        }
    }
}

fn load_chunk<D>(dataset: &D, chunk: &[usize]) -> Result<Batch>
where
    D: RandomAccessDataset + ?Sized,
{
    let samples: Vec<_> = chunk
        .iter()
        .map(|&index| dataset.nth(index))
        .try_collect()?;
    Ok(collate(samples))
}

/// Blocking iterator over one epoch's batches.
pub struct BatchStream<D> {
    inner: Inner<D>,
}

enum Inner<D> {
    Inline {
        dataset: Arc<D>,
        chunks: std::vec::IntoIter<Vec<usize>>,
    },
    Channel(flume::Receiver<Result<Batch>>),
}

impl<D> Iterator for BatchStream<D>
where
    D: RandomAccessDataset + Send + Sync + 'static,
{
    type Item = Result<Batch>;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.inner {
            Inner::Inline { dataset, chunks } => chunks
                .next()
                .map(|chunk| load_chunk(&**dataset, &chunk)),
            Inner::Channel(receiver) => receiver.recv().ok(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{GenericDataset, LabeledBox, Sample, Target};

    #[derive(Debug)]
    struct SyntheticDataset {
        classes: IndexSet<String>,
        len: usize,
        fail_at: Option<usize>,
    }

    impl SyntheticDataset {
        fn new(len: usize) -> Self {
            Self {
                classes: ["fish".to_string()].into_iter().collect(),
                len,
                fail_at: None,
            }
        }
    }

    impl GenericDataset for SyntheticDataset {
        fn input_channels(&self) -> usize {
            3
        }

        fn classes(&self) -> &IndexSet<String> {
            &self.classes
        }
    }

    impl RandomAccessDataset for SyntheticDataset {
        fn num_records(&self) -> usize {
            self.len
        }

        fn nth(&self, index: usize) -> Result<Sample> {
            if self.fail_at == Some(index) {
                bail!("record {} is broken", index);
            }
            let image = Array3::from_elem((1, 1, 3), index as f32);
            let target = Target::from_labeled_boxes(
                index as u64,
                vec![LabeledBox {
                    rect: XYWH::from_xywh([0.0, 0.0, 1.0, 1.0].map(r64)),
                    category: 0,
                    iscrowd: false,
                }],
            )?;
            Ok((image, target))
        }
    }

    fn batch_ids(batch: &Batch) -> Vec<u64> {
        batch.targets.iter().map(|target| target.image_id).collect()
    }

    #[test]
    fn inline_epoch_keeps_index_order() {
        let dataset = Arc::new(SyntheticDataset::new(8));
        let loader = BatchLoaderInit {
            batch_size: NonZeroUsize::new(3).unwrap(),
            shuffle: false,
            num_workers: 0,
            prefetch: NonZeroUsize::new(2).unwrap(),
        }
        .build(dataset);

        let batches: Vec<Batch> = loader.epoch().try_collect().unwrap();
        let ids: Vec<Vec<u64>> = batches.iter().map(batch_ids).collect();
        assert_eq!(ids, vec![vec![0, 1, 2], vec![3, 4, 5], vec![6, 7]]);
    }

    #[test]
    fn worker_epoch_covers_every_run() {
        let dataset = Arc::new(SyntheticDataset::new(8));
        let loader = BatchLoaderInit {
            batch_size: NonZeroUsize::new(3).unwrap(),
            shuffle: false,
            num_workers: 2,
            prefetch: NonZeroUsize::new(2).unwrap(),
        }
        .build(dataset);

        let batches: Vec<Batch> = loader.epoch().try_collect().unwrap();
        let mut ids: Vec<Vec<u64>> = batches.iter().map(batch_ids).collect();
        ids.sort();
        assert_eq!(ids, vec![vec![0, 1, 2], vec![3, 4, 5], vec![6, 7]]);
    }

    #[test]
    fn shuffled_epoch_is_a_permutation() {
        let dataset = Arc::new(SyntheticDataset::new(10));
        let loader = BatchLoaderInit {
            batch_size: NonZeroUsize::new(4).unwrap(),
            shuffle: true,
            num_workers: 0,
            prefetch: NonZeroUsize::new(2).unwrap(),
        }
        .build(dataset);

        let batches: Vec<Batch> = loader.epoch().try_collect().unwrap();
        let mut seen: Vec<u64> = batches.iter().flat_map(|batch| batch_ids(batch)).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..10).collect::<Vec<u64>>());
    }

    #[test]
    fn broken_record_propagates() {
        let mut dataset = SyntheticDataset::new(4);
        dataset.fail_at = Some(2);
        let loader = BatchLoaderInit {
            batch_size: NonZeroUsize::new(2).unwrap(),
            shuffle: false,
            num_workers: 0,
            prefetch: NonZeroUsize::new(2).unwrap(),
        }
        .build(Arc::new(dataset));

        let results: Vec<Result<Batch>> = loader.epoch().collect();
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }
}
