//! Fixed-width counters used for the histogram counts array.
//!
//! Narrower counters trade the maximum count per bucket for a smaller memory
//! footprint. Overflow is always detected and reported, never wrapped.

use core::fmt::Debug;

use num_traits::{Bounded, CheckedAdd, FromPrimitive, Num, ToPrimitive};

mod private {
    pub trait Sealed {}

    impl Sealed for u16 {}
    impl Sealed for u32 {}
    impl Sealed for u64 {}
}

/// An unsigned integer type which may be used as the counter for each slot
/// in a histogram's counts array. Implemented for `u16`, `u32`, and `u64`.
pub trait Counter:
    private::Sealed
    + Num
    + CheckedAdd
    + Bounded
    + ToPrimitive
    + FromPrimitive
    + Copy
    + Default
    + Debug
    + Send
    + Sync
{
    /// The largest count a single counter can hold.
    #[inline]
    fn max_count() -> u64 {
        Self::max_value().to_u64().unwrap_or(u64::MAX)
    }

    /// Widen the counter to a `u64`.
    #[inline]
    fn as_u64(self) -> u64 {
        // counters are unsigned and at most 64 bits wide
        self.to_u64().unwrap_or(u64::MAX)
    }

    /// Add `count` to the counter, returning `None` if the result does not
    /// fit in the counter.
    #[inline]
    fn checked_add_u64(self, count: u64) -> Option<Self> {
        Self::from_u64(count).and_then(|count| self.checked_add(&count))
    }
}

impl<T> Counter for T where
    T: private::Sealed
        + Num
        + CheckedAdd
        + Bounded
        + ToPrimitive
        + FromPrimitive
        + Copy
        + Default
        + Debug
        + Send
        + Sync
{
}
