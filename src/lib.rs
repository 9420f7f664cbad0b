//! # bitsort
//!
//! bitsort is an in-place, unstable MSB radix sort that partitions one key
//! bit at a time. On x86-64 targets built with AVX-512 the bit partition
//! runs on 512-bit vectors using mask-test and compress-store; everywhere
//! else a scalar two-pointer partition is used. Large inputs can be sorted
//! by a pool of worker threads that cooperate on single bit levels.
//!
//! ## Usage
//!
//! Slices of the primitive integer and float types sort directly:
//!
//! ```
//! use bitsort::RadixSort;
//!
//! let mut data = vec![5u32, 2, 8, 1, 9, 3];
//! data.radix_sort_unstable();
//! assert_eq!(data, vec![1, 2, 3, 5, 8, 9]);
//! ```
//!
//! Options live on the builder:
//!
//! ```
//! use bitsort::{RadixSort, ThreadConfig};
//!
//! let mut data: Vec<i32> = (0..200_000).map(|i| i ^ 0x2A).collect();
//! data.radix_sort_builder()
//!     .descending()
//!     .with_threads(ThreadConfig::default())
//!     .sort();
//! assert!(data.windows(2).all(|w| w[0] >= w[1]));
//! ```
//!
//! ## Keys and payloads
//!
//! The sort key occupies the low bits of each element and is interpreted as
//! an unsigned integer, a two's-complement signed integer, or an IEEE
//! float. An element twice as wide as its key carries a payload in the high
//! half that travels with the key: a `Vec<u64>` holding an `f32` key in the
//! low half is sorted with `SortBuilder::<f32, u64>::new(&mut data)`.
//!
//! Float keys order by their sign-magnitude bit pattern. This places NaN
//! patterns after the finite values of their sign; callers that need IEEE
//! `total_cmp` semantics should canonicalise NaNs first.
//!
//! ## Performance notes
//!
//! The data is mutated in place and no temporary buffers proportional to
//! the input are allocated. For the vector path, aligning the data to the
//! 64-byte vector width avoids split loads; unaligned data is handled
//! correctly either way.
//!
//! ## License
//!
//! Licensed under either of
//!
//! * Apache License, Version 2.0 (<http://www.apache.org/licenses/LICENSE-2.0>)
//! * MIT license (<http://opensource.org/licenses/MIT>)
//!
//! at your option.

#[cfg(feature = "multi-threaded")]
mod parallel;
mod pattern;
mod radix_sort;
mod sort_builder;
mod sort_key;
mod sort_key_impl;
mod sorts;

#[cfg(test)]
mod utils;

#[cfg(feature = "multi-threaded")]
pub use parallel::{QueueMode, SortStats, ThreadConfig};
pub use pattern::{BitPartition, BitPattern, Element};
pub use radix_sort::RadixSort;
pub use sort_builder::SortBuilder;
pub use sort_key::{SortElement, SortKey};
