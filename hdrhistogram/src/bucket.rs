//! Buckets represent the range of equivalent values behind a single counter
//! and the count of observations within that range.

/// A bucket represents a range of equivalent values and a count of
/// observations that fall into that range.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Bucket {
    pub(crate) count: u64,
    pub(crate) lower: u64,
    pub(crate) upper: u64,
}

impl Bucket {
    /// Returns the number of observations within the bucket's range.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Returns the range for the bucket.
    pub fn range(&self) -> std::ops::RangeInclusive<u64> {
        std::ops::RangeInclusive::new(self.lower, self.upper)
    }

    /// Returns the inclusive lower bound for the bucket. This is the lowest
    /// equivalent value.
    pub fn lower(&self) -> u64 {
        self.lower
    }

    /// Returns the inclusive upper bound for the bucket. This is the highest
    /// equivalent value.
    pub fn upper(&self) -> u64 {
        self.upper
    }
}
