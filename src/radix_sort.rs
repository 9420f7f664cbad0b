use crate::sort_builder::SortBuilder;
use crate::sort_key::{SortElement, SortKey};

/// Convenience entry points for slices whose elements are their own key.
pub trait RadixSort<T> {
    /// Sort ascending with the default configuration. Equal keys may be
    /// reordered.
    fn radix_sort_unstable(&mut self);

    /// Start configuring a sort of this slice.
    ///
    /// ```
    /// use bitsort::RadixSort;
    ///
    /// let mut data: Vec<f32> = vec![3.0, -1.5, 0.0, 2.5];
    /// data.radix_sort_builder().descending().sort();
    /// assert_eq!(data, vec![3.0, 2.5, 0.0, -1.5]);
    /// ```
    fn radix_sort_builder(&mut self) -> SortBuilder<'_, T, T>
    where
        T: SortKey + SortElement<T>;
}

impl<T> RadixSort<T> for [T]
where
    T: SortKey + SortElement<T>,
{
    fn radix_sort_unstable(&mut self) {
        SortBuilder::new(self).sort();
    }

    fn radix_sort_builder(&mut self) -> SortBuilder<'_, T, T> {
        SortBuilder::new(self)
    }
}

impl<T> RadixSort<T> for Vec<T>
where
    T: SortKey + SortElement<T>,
{
    fn radix_sort_unstable(&mut self) {
        SortBuilder::new(self).sort();
    }

    fn radix_sort_builder(&mut self) -> SortBuilder<'_, T, T> {
        SortBuilder::new(self)
    }
}
