use crate::sorts::scalar_partition::partition_in_place;

/// An unsigned bit pattern of one of the supported element widths.
///
/// All bit manipulation done by the partition loops goes through this trait,
/// so the partition code never needs to know whether the caller's element is
/// an integer, a float, or a key/payload pair.
pub trait BitPattern: Copy + Eq + Send + Sync + 'static {
    /// Width of the pattern in bits.
    const BITS: u32;

    /// A pattern with only bit `bit_no` set.
    fn bit_mask(bit_no: u32) -> Self;

    /// True if any bit selected by `mask` is set.
    fn test(self, mask: Self) -> bool;
}

macro_rules! bit_pattern {
    ($($t:ty),*) => {
        $(
            impl BitPattern for $t {
                const BITS: u32 = <$t>::BITS;

                #[inline(always)]
                fn bit_mask(bit_no: u32) -> Self {
                    1 << bit_no
                }

                #[inline(always)]
                fn test(self, mask: Self) -> bool {
                    self & mask != 0
                }
            }
        )*
    };
}

bit_pattern!(u8, u16, u32, u64, u128);

/// Per-width partition capability table.
///
/// The default method is the scalar two-pointer partition. On targets with
/// the required AVX-512 extensions, `compress_partition` overrides it per
/// width with the wide-vector compress-store path (see
/// `sorts/compress_partition.rs`), so generic code can always call
/// `vector_partition` and gets the best partition compiled in for this
/// width on this target.
pub trait BitPartition: BitPattern + Element<Bits = Self> {
    /// True when the wide-vector partition is compiled in for this width.
    const VECTOR: bool = false;

    /// Reorder `d` so that elements whose key bit `bit_no` belongs on the
    /// low side (bit clear for ascending, set for descending) come first,
    /// returning the index of the first high-side element.
    #[inline]
    fn vector_partition<const UP: bool>(d: &mut [Self], bit_no: u32) -> usize {
        partition_in_place::<Self, UP>(d, bit_no)
    }
}

/// A sortable element: a fixed-width value that exposes its unsigned bit
/// pattern. The key occupies the low bits of the pattern; an optional
/// payload occupies the high half.
///
/// # Safety
///
/// Implementations must guarantee that `Self` has the same size as
/// `Self::Bits` and that `bits()` is a plain bit-cast, because the
/// wide-vector partition reinterprets `&mut [Self]` as `&mut [Self::Bits]`.
pub unsafe trait Element: Copy + Send + Sync + 'static {
    type Bits: BitPartition;

    /// The element's bit pattern.
    fn bits(self) -> Self::Bits;
}

macro_rules! element {
    ($($t:ty => $b:ty, $conv:expr;)*) => {
        $(
            unsafe impl Element for $t {
                type Bits = $b;

                #[inline(always)]
                fn bits(self) -> $b {
                    $conv(self)
                }
            }
        )*
    };
}

element! {
    u8 => u8, |v| v;
    u16 => u16, |v| v;
    u32 => u32, |v| v;
    u64 => u64, |v| v;
    u128 => u128, |v| v;
    i8 => u8, |v: i8| v as u8;
    i16 => u16, |v: i16| v as u16;
    i32 => u32, |v: i32| v as u32;
    i64 => u64, |v: i64| v as u64;
    f32 => u32, f32::to_bits;
    f64 => u64, f64::to_bits;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_mask_u128_high_half() {
        let m = <u128 as BitPattern>::bit_mask(100);
        assert_eq!(m, 1u128 << 100);
        assert!(m.test(m));
        assert!(!0u128.test(m));
    }

    #[test]
    fn float_bits_are_ieee() {
        assert_eq!((-0.0f32).bits(), 0x8000_0000);
        assert_eq!(1.0f64.bits(), 0x3FF0_0000_0000_0000);
    }

    #[test]
    fn signed_bits_are_twos_complement() {
        assert_eq!((-1i8).bits(), 0xFF);
        assert_eq!(i32::MIN.bits(), 0x8000_0000);
    }
}
