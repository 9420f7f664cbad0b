use crate::pattern::Element;

/// A key type the sorter understands: an unsigned integer, a
/// two's-complement signed integer, or an IEEE sign-magnitude float of
/// 8 to 64 bits.
///
/// The constants describe the key's encoding so the recursion can pick the
/// partition direction per bit level; `key_lt` is the semantic comparison
/// used by the insertion-sort fallback.
pub trait SortKey: Copy + Send + Sync + 'static {
    /// Width of the key in bits.
    const BITS: u32;
    /// Two's-complement encoding (sign bit inverts the partition order).
    const SIGNED: bool;
    /// Sign-magnitude float encoding (magnitude bits of negative values
    /// sort in reverse).
    const FLOAT: bool;

    /// Semantic `self < other`.
    fn key_lt(self, other: Self) -> bool;
}

/// An element carrying a key of type `K` in its low bits.
///
/// Implemented for every key type itself (no payload) and for the
/// double-width pattern holding a key in the low half and a payload in the
/// high half.
pub trait SortElement<K: SortKey>: Element {
    /// The key stored in the element's low bits.
    fn key(self) -> K;
}
