#[cfg(feature = "multi-threaded")]
use crate::parallel::pool::sort_parallel;
#[cfg(feature = "multi-threaded")]
use crate::parallel::{SortStats, ThreadConfig};
use crate::sort_key::{SortElement, SortKey};
use crate::sorts::recursion::{radix_sort, ScalarEngine, VectorEngine};
use std::marker::PhantomData;

/// Configurable entry point of the sorter.
///
/// `K` is the key type stored in the low bits of each element, `E` the
/// element type. For elements that are their own key, prefer the
/// [`RadixSort`](crate::RadixSort) extension trait which constructs the
/// builder for you.
pub struct SortBuilder<'a, K, E>
where
    K: SortKey,
    E: SortElement<K>,
{
    data: &'a mut [E],
    ascending: bool,
    cmp_sort_thresh: usize,
    scalar_partition: bool,
    #[cfg(feature = "multi-threaded")]
    threads: Option<ThreadConfig>,
    #[cfg(feature = "multi-threaded")]
    stats: Option<&'a mut SortStats>,
    _key: PhantomData<fn() -> K>,
}

impl<'a, K, E> SortBuilder<'a, K, E>
where
    K: SortKey,
    E: SortElement<K>,
{
    /// Build a sort of `data` by the key in each element's low bits,
    /// ascending, with the widest partition the target supports.
    ///
    /// ```
    /// use bitsort::SortBuilder;
    ///
    /// // f32 keys in the low half, u32 payloads in the high half.
    /// let mut data: Vec<u64> = [1.5f32, -2.0, 0.25]
    ///     .iter()
    ///     .enumerate()
    ///     .map(|(i, f)| ((i as u64) << 32) | f.to_bits() as u64)
    ///     .collect();
    ///
    /// SortBuilder::<f32, u64>::new(&mut data).sort();
    ///
    /// assert_eq!(data[0] as u32, (-2.0f32).to_bits());
    /// assert_eq!(data[0] >> 32, 1); // payload still attached
    /// ```
    pub fn new(data: &'a mut [E]) -> Self {
        Self {
            data,
            ascending: true,
            cmp_sort_thresh: 32,
            scalar_partition: false,
            #[cfg(feature = "multi-threaded")]
            threads: None,
            #[cfg(feature = "multi-threaded")]
            stats: None,
            _key: PhantomData,
        }
    }

    /// Sort in descending key order.
    pub fn descending(mut self) -> Self {
        self.ascending = false;
        self
    }

    /// Range size below which the recursion switches to insertion sort.
    /// Sensible values are 16 to 64; the default is 32.
    pub fn with_insertion_threshold(mut self, thresh: usize) -> Self {
        self.cmp_sort_thresh = thresh;
        self
    }

    /// Use the scalar two-pointer partition on every level, even where the
    /// wide-vector partition is available.
    pub fn with_scalar_partition(mut self) -> Self {
        self.scalar_partition = true;
        self
    }

    /// Run the sort on a worker pool.
    ///
    /// ```
    /// use bitsort::{SortBuilder, ThreadConfig};
    ///
    /// let mut data: Vec<u32> = (0..100_000).rev().collect();
    /// SortBuilder::<u32, u32>::new(&mut data)
    ///     .with_threads(ThreadConfig::new(4))
    ///     .sort();
    /// assert!(data.windows(2).all(|w| w[0] <= w[1]));
    /// ```
    #[cfg(feature = "multi-threaded")]
    pub fn with_threads(mut self, config: ThreadConfig) -> Self {
        self.threads = Some(config);
        self
    }

    /// Collect per-worker counters into `stats`. Only meaningful together
    /// with [`with_threads`](Self::with_threads).
    #[cfg(feature = "multi-threaded")]
    pub fn with_stats(mut self, stats: &'a mut SortStats) -> Self {
        self.stats = Some(stats);
        self
    }

    /// Run the configured sort, consuming the builder. The slice is sorted
    /// in place; equal keys may be reordered.
    pub fn sort(self) {
        if self.data.len() <= 1 {
            return;
        }

        #[cfg(feature = "multi-threaded")]
        if let Some(config) = &self.threads {
            if self.scalar_partition {
                sort_parallel::<K, E, ScalarEngine>(
                    config,
                    self.stats,
                    self.data,
                    self.ascending,
                    self.cmp_sort_thresh,
                );
            } else {
                sort_parallel::<K, E, VectorEngine>(
                    config,
                    self.stats,
                    self.data,
                    self.ascending,
                    self.cmp_sort_thresh,
                );
            }
            return;
        }

        if self.scalar_partition {
            radix_sort::<K, E, ScalarEngine>(self.data, self.ascending, 0, self.cmp_sort_thresh);
        } else {
            radix_sort::<K, E, VectorEngine>(self.data, self.ascending, 0, self.cmp_sort_thresh);
        }
    }
}
