pub(crate) mod compress_partition;
pub(crate) mod insertion_sort;
pub(crate) mod recursion;
pub(crate) mod scalar_partition;
