//! Wide-vector bit partition built on AVX-512 mask-test and compress-store.
//!
//! The range is processed in whole vector blocks. A single scratch vector
//! holds one block that has been read but not yet written back, so at every
//! step the data written to the low side, the data written to the high side,
//! the scratch vector and the unread middle together form exactly the
//! original multiset of the range:
//!
//! 1. Preload the rightmost full block into the scratch vector.
//! 2. Test the scratch block against the broadcast bit mask, producing a
//!    low-side and a high-side lane mask with their popcounts.
//! 3. Exactly one side must be refilled before it is overwritten: the side
//!    whose free gap is smaller than the lanes about to land there. If both
//!    gaps are large enough, the right side is loaded anyway so the loop
//!    always makes progress.
//! 4. Compress-store the low lanes to the left write cursor and the high
//!    lanes to the (pre-decremented) right write cursor.
//!
//! When the read cursors meet, one block remains in the scratch vector and
//! is compressed to both sides without a reload. The area between the write
//! cursors plus the sub-vector tail of the range is then finished by the
//! right-bounded scalar partition.
//!
//! Elements wider than 64 bits are handled as adjacent 64-bit lane pairs:
//! the key-half test bits are duplicated onto the payload lanes so
//! compress-store moves the payload together with its key, and popcounts are
//! halved to count elements rather than lanes.
//!
//! 8- and 16-bit lanes additionally need the VBMI2 compress-store
//! instructions; without them those widths keep the scalar partition.

use crate::pattern::BitPartition;

#[cfg(all(target_arch = "x86_64", target_feature = "avx512f"))]
macro_rules! vector_partition_impl {
    ($($t:ty),*) => {
        $(
            impl BitPartition for $t {
                const VECTOR: bool = true;

                #[inline]
                fn vector_partition<const UP: bool>(d: &mut [Self], bit_no: u32) -> usize {
                    avx512::compress_partition::<$t, UP>(d, bit_no)
                }
            }
        )*
    };
}

#[cfg(all(target_arch = "x86_64", target_feature = "avx512f"))]
vector_partition_impl!(u32, u64, u128);

#[cfg(all(
    target_arch = "x86_64",
    target_feature = "avx512f",
    target_feature = "avx512bw",
    target_feature = "avx512vbmi2"
))]
vector_partition_impl!(u8, u16);

#[cfg(not(all(target_arch = "x86_64", target_feature = "avx512f")))]
mod scalar_only {
    use super::BitPartition;

    impl BitPartition for u32 {}
    impl BitPartition for u64 {}
    impl BitPartition for u128 {}
}

#[cfg(not(all(
    target_arch = "x86_64",
    target_feature = "avx512f",
    target_feature = "avx512bw",
    target_feature = "avx512vbmi2"
)))]
mod scalar_only_narrow {
    use super::BitPartition;

    impl BitPartition for u8 {}
    impl BitPartition for u16 {}
}

#[cfg(all(target_arch = "x86_64", target_feature = "avx512f"))]
mod avx512 {
    use crate::pattern::{BitPartition, BitPattern};
    use crate::sorts::scalar_partition::{partition_in_place, partition_right_bounded};
    use std::arch::x86_64::*;

    /// Per-width vector primitives. `LANES` counts elements per 512-bit
    /// vector; masks are carried as `u64` with one bit per 64-bit hardware
    /// lane, which for 128-bit elements means two (duplicated) bits per
    /// element.
    pub(super) trait SimdLanes: BitPattern {
        const LANES: usize;

        unsafe fn load(p: *const Self) -> __m512i;
        unsafe fn broadcast(mask: Self) -> __m512i;
        /// Per-lane nonzero test of `v & m`.
        unsafe fn test_lanes(v: __m512i, m: __m512i) -> u64;
        /// Lane-complement of a test result.
        fn invert(mask: u64) -> u64;
        /// Number of elements selected by `mask`.
        fn count(mask: u64) -> usize;
        unsafe fn compress_store(p: *mut Self, mask: u64, v: __m512i);
    }

    impl SimdLanes for u8 {
        const LANES: usize = 64;

        #[inline(always)]
        unsafe fn load(p: *const Self) -> __m512i {
            _mm512_loadu_si512(p as *const _)
        }

        #[inline(always)]
        unsafe fn broadcast(mask: Self) -> __m512i {
            _mm512_set1_epi8(mask as i8)
        }

        #[inline(always)]
        unsafe fn test_lanes(v: __m512i, m: __m512i) -> u64 {
            _mm512_test_epi8_mask(v, m)
        }

        #[inline(always)]
        fn invert(mask: u64) -> u64 {
            !mask
        }

        #[inline(always)]
        fn count(mask: u64) -> usize {
            mask.count_ones() as usize
        }

        #[inline(always)]
        unsafe fn compress_store(p: *mut Self, mask: u64, v: __m512i) {
            _mm512_mask_compressstoreu_epi8(p as *mut _, mask, v)
        }
    }

    impl SimdLanes for u16 {
        const LANES: usize = 32;

        #[inline(always)]
        unsafe fn load(p: *const Self) -> __m512i {
            _mm512_loadu_si512(p as *const _)
        }

        #[inline(always)]
        unsafe fn broadcast(mask: Self) -> __m512i {
            _mm512_set1_epi16(mask as i16)
        }

        #[inline(always)]
        unsafe fn test_lanes(v: __m512i, m: __m512i) -> u64 {
            _mm512_test_epi16_mask(v, m) as u64
        }

        #[inline(always)]
        fn invert(mask: u64) -> u64 {
            !mask & 0xFFFF_FFFF
        }

        #[inline(always)]
        fn count(mask: u64) -> usize {
            mask.count_ones() as usize
        }

        #[inline(always)]
        unsafe fn compress_store(p: *mut Self, mask: u64, v: __m512i) {
            _mm512_mask_compressstoreu_epi16(p as *mut _, mask as __mmask32, v)
        }
    }

    impl SimdLanes for u32 {
        const LANES: usize = 16;

        #[inline(always)]
        unsafe fn load(p: *const Self) -> __m512i {
            _mm512_loadu_si512(p as *const _)
        }

        #[inline(always)]
        unsafe fn broadcast(mask: Self) -> __m512i {
            _mm512_set1_epi32(mask as i32)
        }

        #[inline(always)]
        unsafe fn test_lanes(v: __m512i, m: __m512i) -> u64 {
            _mm512_test_epi32_mask(v, m) as u64
        }

        #[inline(always)]
        fn invert(mask: u64) -> u64 {
            !mask & 0xFFFF
        }

        #[inline(always)]
        fn count(mask: u64) -> usize {
            mask.count_ones() as usize
        }

        #[inline(always)]
        unsafe fn compress_store(p: *mut Self, mask: u64, v: __m512i) {
            _mm512_mask_compressstoreu_epi32(p as *mut _, mask as __mmask16, v)
        }
    }

    impl SimdLanes for u64 {
        const LANES: usize = 8;

        #[inline(always)]
        unsafe fn load(p: *const Self) -> __m512i {
            _mm512_loadu_si512(p as *const _)
        }

        #[inline(always)]
        unsafe fn broadcast(mask: Self) -> __m512i {
            _mm512_set1_epi64(mask as i64)
        }

        #[inline(always)]
        unsafe fn test_lanes(v: __m512i, m: __m512i) -> u64 {
            _mm512_test_epi64_mask(v, m) as u64
        }

        #[inline(always)]
        fn invert(mask: u64) -> u64 {
            !mask & 0xFF
        }

        #[inline(always)]
        fn count(mask: u64) -> usize {
            mask.count_ones() as usize
        }

        #[inline(always)]
        unsafe fn compress_store(p: *mut Self, mask: u64, v: __m512i) {
            _mm512_mask_compressstoreu_epi64(p as *mut _, mask as __mmask8, v)
        }
    }

    impl SimdLanes for u128 {
        const LANES: usize = 4;

        #[inline(always)]
        unsafe fn load(p: *const Self) -> __m512i {
            _mm512_loadu_si512(p as *const _)
        }

        #[inline(always)]
        unsafe fn broadcast(mask: Self) -> __m512i {
            // Interleave the two element halves: qword lanes
            // [lo, hi, lo, hi, ...] with the key half at even lanes.
            _mm512_unpacklo_epi64(
                _mm512_set1_epi64(mask as u64 as i64),
                _mm512_set1_epi64((mask >> 64) as u64 as i64),
            )
        }

        #[inline(always)]
        unsafe fn test_lanes(v: __m512i, m: __m512i) -> u64 {
            // The key sits in the even (low-half) lanes; duplicate its test
            // bits onto the odd payload lanes so compress-store moves both
            // halves of each element.
            let k = _mm512_test_epi64_mask(v, m) as u64;
            k | (k << 1)
        }

        #[inline(always)]
        fn invert(mask: u64) -> u64 {
            !mask & 0xFF
        }

        #[inline(always)]
        fn count(mask: u64) -> usize {
            // Two mask bits per element.
            (mask.count_ones() / 2) as usize
        }

        #[inline(always)]
        unsafe fn compress_store(p: *mut Self, mask: u64, v: __m512i) {
            _mm512_mask_compressstoreu_epi64(p as *mut _, mask as __mmask8, v)
        }
    }

    #[inline(always)]
    unsafe fn split_masks<B: SimdLanes, const UP: bool>(
        block: __m512i,
        mask_vec: __m512i,
    ) -> (u64, u64, usize, usize) {
        let set = B::test_lanes(block, mask_vec);
        let (lo, hi) = if UP {
            (B::invert(set), set)
        } else {
            (set, B::invert(set))
        };
        let hi_n = B::count(hi);
        (lo, hi, B::LANES - hi_n, hi_n)
    }

    pub(super) fn compress_partition<B, const UP: bool>(d: &mut [B], bit_no: u32) -> usize
    where
        B: SimdLanes + BitPartition,
    {
        let n = B::LANES;
        let len = d.len();
        // Index just past the last whole vector block.
        let after_block = len & !(n - 1);
        if after_block == 0 {
            return partition_in_place::<B, UP>(d, bit_no);
        }

        let p = d.as_mut_ptr();
        unsafe {
            let mask_vec = B::broadcast(B::bit_mask(bit_no));
            let mut read = [0usize, after_block];
            let mut write = [0usize, after_block];

            // Preload the rightmost block; its slots are now free to
            // receive compressed data.
            let mut scratch = B::load(p.add(read[1] - n));
            read[1] -= n;

            while read[0] < read[1] {
                let block = scratch;
                let (lo_bits, hi_bits, lo_n, hi_n) = split_masks::<B, UP>(block, mask_vec);

                // The side whose free gap cannot take the lanes headed its
                // way must be refilled first; ties load the right side so
                // the cursors always close in.
                let load_right = write[1] - hi_n < read[1];
                if !load_right {
                    scratch = B::load(p.add(read[0]));
                    read[0] += n;
                }
                B::compress_store(p.add(write[0]), lo_bits, block);
                write[0] += lo_n;

                if load_right {
                    read[1] -= n;
                    scratch = B::load(p.add(read[1]));
                }
                write[1] -= hi_n;
                B::compress_store(p.add(write[1]), hi_bits, block);
            }

            // One block is still in the scratch vector unless the range had
            // no room for the preload to be consumed.
            if read[0] == read[1] {
                let (lo_bits, hi_bits, lo_n, hi_n) = split_masks::<B, UP>(scratch, mask_vec);
                B::compress_store(p.add(write[0]), lo_bits, scratch);
                write[0] += lo_n;
                write[1] -= hi_n;
                B::compress_store(p.add(write[1]), hi_bits, scratch);
            }

            debug_assert_eq!(write[0], write[1]);
        }

        // [0, write[0]) and [after_block, len) still need the scalar pass:
        // the former is the unresolved middle, the latter the sub-vector
        // tail.
        partition_right_bounded::<B, UP>(d, write[0], after_block, bit_no)
    }
}
