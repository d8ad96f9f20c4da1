use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::ops::{BitAnd, BitOr, Not};

/// Integer element type of an encoded flag array.
///
/// Implemented for every fixed-width primitive integer. Flag tests only need
/// bitwise AND/OR/NOT and equality; the `i128` conversions exist for adapters
/// that read metadata from untyped sources.
pub trait FlagInt:
    Copy
    + Eq
    + Hash
    + Debug
    + Display
    + Send
    + Sync
    + 'static
    + BitAnd<Output = Self>
    + BitOr<Output = Self>
    + Not<Output = Self>
{
    /// No bits set
    const ZERO: Self;

    /// Every bit set, the mask used when none is given
    const ALL_BITS: Self;

    /// Widen to `i128` (lossless for every implementor)
    fn to_i128(self) -> i128;

    /// Narrow from `i128`, `None` when the value does not fit
    fn from_i128(value: i128) -> Option<Self>;
}

macro_rules! impl_flag_int {
    ($($t:ty),* $(,)?) => {
        $(
            impl FlagInt for $t {
                const ZERO: Self = 0;
                const ALL_BITS: Self = !0;

                fn to_i128(self) -> i128 {
                    self as i128
                }

                fn from_i128(value: i128) -> Option<Self> {
                    <$t>::try_from(value).ok()
                }
            }
        )*
    };
}

impl_flag_int!(i8, i16, i32, i64, u8, u16, u32, u64);
