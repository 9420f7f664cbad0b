//! Shared helpers for the test suites.

use crate::sort_key::{SortElement, SortKey};
use nanorand::{Rng, WyRand};
use rayon::prelude::*;

/// Random u32s, generated chunk-parallel so the large suites stay fast.
pub(crate) fn random_u32s(n: usize, seed: u64) -> Vec<u32> {
    let mut out = vec![0u32; n];
    out.par_chunks_mut(65_536).enumerate().for_each(|(i, chunk)| {
        let mut rng = WyRand::new_seed(seed ^ (i as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15));
        for v in chunk {
            *v = rng.generate();
        }
    });
    out
}

pub(crate) fn random_u64s(n: usize, seed: u64) -> Vec<u64> {
    let mut out = vec![0u64; n];
    out.par_chunks_mut(65_536).enumerate().for_each(|(i, chunk)| {
        let mut rng = WyRand::new_seed(seed ^ (i as u64).wrapping_mul(0x517C_C1B7_2722_0A95));
        for v in chunk {
            *v = rng.generate();
        }
    });
    out
}

/// Finite random f64s covering both signs and several magnitudes.
pub(crate) fn random_f64s(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = WyRand::new_seed(seed);
    (0..n)
        .map(|_| {
            let mantissa = rng.generate::<i32>() as f64;
            let scale = 10f64.powi((rng.generate::<u8>() % 17) as i32 - 8);
            mantissa * scale
        })
        .collect()
}

/// Assert `d` is ordered by semantic key in the given direction.
pub(crate) fn assert_sorted_by_key<K, E>(d: &[E], up: bool)
where
    K: SortKey,
    E: SortElement<K>,
{
    for (i, w) in d.windows(2).enumerate() {
        let (a, b) = (w[0].key(), w[1].key());
        let ordered = if up { !b.key_lt(a) } else { !a.key_lt(b) };
        assert!(ordered, "order violated at index {}", i);
    }
}

/// Assert `a` and `b` hold the same elements, compared by bit pattern.
pub(crate) fn assert_same_multiset<E>(a: &[E], b: &[E])
where
    E: crate::pattern::Element,
    E::Bits: Ord + std::fmt::Debug,
{
    let mut a: Vec<E::Bits> = a.iter().map(|e| e.bits()).collect();
    let mut b: Vec<E::Bits> = b.iter().map(|e| e.bits()).collect();
    a.sort_unstable();
    b.sort_unstable();
    assert_eq!(a, b);
}
