//! Two-pointer bit partition.
//!
//! Reorders a range around a single key bit: for ascending order (`UP`)
//! elements with the bit clear end up in front of elements with the bit set,
//! for descending order the other way around. The returned split index is
//! the first element of the high side. This is the scalar workhorse behind
//! every partition in the crate; the wide-vector path also finishes its
//! scalar residue here.

use crate::pattern::{BitPattern, Element};

#[inline(always)]
fn low_side<E: Element, const UP: bool>(e: E, mask: E::Bits) -> bool {
    if UP {
        !e.bits().test(mask)
    } else {
        e.bits().test(mask)
    }
}

/// Partition the whole of `d` on key bit `bit_no`. Returns the split index.
pub(crate) fn partition_in_place<E: Element, const UP: bool>(d: &mut [E], bit_no: u32) -> usize {
    let mask = <E::Bits as BitPattern>::bit_mask(bit_no);
    let mut l: isize = 0;
    let mut r: isize = d.len() as isize - 1;
    loop {
        while l <= r && low_side::<E, UP>(d[l as usize], mask) {
            l += 1;
        }
        while l <= r && !low_side::<E, UP>(d[r as usize], mask) {
            r -= 1;
        }
        if l > r {
            break;
        }
        d.swap(l as usize, r as usize);
    }
    l as usize
}

/// Partition variant whose right scan refuses to move below `min_right`,
/// for finishing a range whose tail `[min_right, len)` is already
/// partitioned. `l` may end up beyond `min_right` when everything in front
/// of the already-partitioned tail is homogeneous on this bit, so the loop
/// must stop on `min_right > r` as well as on the index cross-over.
pub(crate) fn partition_right_bounded<E: Element, const UP: bool>(
    d: &mut [E],
    left: usize,
    min_right: usize,
    bit_no: u32,
) -> usize {
    let mask = <E::Bits as BitPattern>::bit_mask(bit_no);
    let mut l = left as isize;
    let mut r: isize = d.len() as isize - 1;
    let min_r = min_right as isize;
    loop {
        while l <= r && low_side::<E, UP>(d[l as usize], mask) {
            l += 1;
        }
        while l <= r && min_r <= r && !low_side::<E, UP>(d[r as usize], mask) {
            r -= 1;
        }
        if l > r || min_r > r {
            break;
        }
        d.swap(l as usize, r as usize);
    }
    l as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use nanorand::{Rng, WyRand};

    fn check_split<const UP: bool>(d: &[u32], bit_no: u32, split: usize) {
        let mask = 1u32 << bit_no;
        for (i, v) in d.iter().enumerate() {
            let set = v & mask != 0;
            if i < split {
                assert_eq!(set, !UP, "index {} on wrong side of split {}", i, split);
            } else {
                assert_eq!(set, UP, "index {} on wrong side of split {}", i, split);
            }
        }
    }

    #[test]
    fn partitions_random_input_both_directions() {
        let mut rng = WyRand::new_seed(7);
        for bit_no in [0, 5, 31] {
            let mut d: Vec<u32> = (0..257).map(|_| rng.generate()).collect();
            let mut e = d.clone();

            let split = partition_in_place::<u32, true>(&mut d, bit_no);
            check_split::<true>(&d, bit_no, split);

            let split = partition_in_place::<u32, false>(&mut e, bit_no);
            check_split::<false>(&e, bit_no, split);
        }
    }

    #[test]
    fn split_agrees_with_partition_index() {
        let mut rng = WyRand::new_seed(11);
        let mut d: Vec<u32> = (0..500).map(|_| rng.generate()).collect();
        let mut e = d.clone();

        let split = partition_in_place::<u32, true>(&mut d, 17);
        let expected = partition::partition_index(&mut e, |v| v & (1 << 17) == 0);
        assert_eq!(split, expected);
    }

    #[test]
    fn homogeneous_and_trivial_inputs() {
        let mut d: Vec<u32> = vec![0b100; 64];
        assert_eq!(partition_in_place::<u32, true>(&mut d, 2), 0);
        assert_eq!(partition_in_place::<u32, true>(&mut d, 0), 64);

        let mut empty: Vec<u32> = vec![];
        assert_eq!(partition_in_place::<u32, true>(&mut empty, 0), 0);

        let mut one = vec![1u32];
        assert_eq!(partition_in_place::<u32, true>(&mut one, 0), 0);
    }

    #[test]
    fn right_bounded_finishes_partitioned_tail() {
        // Tail [4, 8) is already partitioned on bit 0; the head is not.
        let mut d: Vec<u32> = vec![1, 0, 1, 0, 0, 0, 1, 1];
        let split = partition_right_bounded::<u32, true>(&mut d, 0, 4, 0);
        check_split::<true>(&d, 0, split);
        assert_eq!(split, 4);
    }

    #[test]
    fn right_bounded_left_passes_min_right_on_homogeneous_head() {
        // Everything below min_right is low-side, so `l` runs past it.
        let mut d: Vec<u32> = vec![0, 0, 0, 0, 0, 0, 1, 1];
        let split = partition_right_bounded::<u32, true>(&mut d, 0, 4, 0);
        assert_eq!(split, 6);
        check_split::<true>(&d, 0, split);
    }

    #[test]
    fn right_bounded_all_high() {
        let mut d: Vec<u32> = vec![1; 8];
        let split = partition_right_bounded::<u32, true>(&mut d, 0, 4, 0);
        assert_eq!(split, 0);
    }
}
