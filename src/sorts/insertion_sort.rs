//! Comparison-based fallback for small ranges.
//!
//! A plain insertion sort that compares extracted keys and moves whole
//! elements, so a payload in the high half of an element always travels
//! with its key.

use crate::sort_key::{SortElement, SortKey};

#[inline(always)]
fn precedes<K: SortKey, const UP: bool>(a: K, b: K) -> bool {
    if UP {
        a.key_lt(b)
    } else {
        b.key_lt(a)
    }
}

pub(crate) fn insertion_sort<K, E, const UP: bool>(d: &mut [E])
where
    K: SortKey,
    E: SortElement<K>,
{
    for j in 1..d.len() {
        let value = d[j];
        let key = value.key();
        let mut i = j;
        while i > 0 && precedes::<K, UP>(key, d[i - 1].key()) {
            i -= 1;
        }
        if i < j {
            // Shift the intervening run up in one block move.
            d.copy_within(i..j, i + 1);
            d[i] = value;
        }
    }
}
