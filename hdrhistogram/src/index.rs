//! Mapping between values and positions in the counts array.
//!
//! A counts index is composed from a bucket index (the power of two the value
//! falls into, relative to the sub-bucket span) and a sub-bucket index (the
//! linear position within that bucket). Every value within the same
//! sub-bucket is equivalent: they share a counter and cannot be told apart.

use crate::Config;

impl Config {
    /// Returns the bucket index for the value.
    #[inline]
    pub fn bucket_index(&self, value: u64) -> u32 {
        // smallest power of two containing the value, with values in the
        // first bucket raised to the top of it by the mask
        let pow2ceiling = 64 - (value | self.sub_bucket_mask).leading_zeros();
        pow2ceiling - self.unit_magnitude - (self.sub_bucket_half_count_magnitude + 1)
    }

    /// Returns the sub-bucket index for the value within the given bucket.
    #[inline]
    pub fn sub_bucket_index(&self, value: u64, bucket_index: u32) -> u64 {
        value >> (bucket_index + self.unit_magnitude)
    }

    /// Returns the position in the counts array for a bucket and sub-bucket.
    #[inline]
    pub fn counts_index(&self, bucket_index: u32, sub_bucket_index: u64) -> usize {
        let bucket_base_index = (bucket_index as usize + 1) << self.sub_bucket_half_count_magnitude;
        // only the top half of buckets after the first is used, so the offset
        // is relative to the half count
        bucket_base_index + sub_bucket_index as usize - self.sub_bucket_half_count as usize
    }

    /// Returns the position in the counts array for the value. The result may
    /// be beyond `counts_len()` if the value exceeds the trackable range.
    #[inline]
    pub fn index_of(&self, value: u64) -> usize {
        let bucket_index = self.bucket_index(value);
        let sub_bucket_index = self.sub_bucket_index(value, bucket_index);
        self.counts_index(bucket_index, sub_bucket_index)
    }

    /// Returns the lowest value which maps to the counts index.
    pub fn value_at_index(&self, index: usize) -> u64 {
        let half_count = self.sub_bucket_half_count as usize;

        let mut bucket_index = (index >> self.sub_bucket_half_count_magnitude) as i64 - 1;
        let mut sub_bucket_index = (index & (half_count - 1)) + half_count;

        if bucket_index < 0 {
            sub_bucket_index -= half_count;
            bucket_index = 0;
        }

        value_from_location(bucket_index as u32, sub_bucket_index as u64, self.unit_magnitude)
    }

    /// Returns the number of distinct values which are equivalent to the
    /// value, the width of its sub-bucket.
    pub fn equivalent_range_len(&self, value: u64) -> u64 {
        let bucket_index = self.bucket_index(value);
        let sub_bucket_index = self.sub_bucket_index(value, bucket_index);
        let adjusted_bucket = if sub_bucket_index >= self.sub_bucket_count as u64 {
            bucket_index + 1
        } else {
            bucket_index
        };
        1_u64
            .checked_shl(self.unit_magnitude + adjusted_bucket)
            .unwrap_or(u64::MAX)
    }

    /// Returns the lowest value that is equivalent to the value.
    pub fn lowest_equivalent(&self, value: u64) -> u64 {
        let bucket_index = self.bucket_index(value);
        let sub_bucket_index = self.sub_bucket_index(value, bucket_index);
        value_from_location(bucket_index, sub_bucket_index, self.unit_magnitude)
    }

    /// Returns the highest value that is equivalent to the value.
    pub fn highest_equivalent(&self, value: u64) -> u64 {
        self.lowest_equivalent(value)
            .saturating_add(self.equivalent_range_len(value) - 1)
    }

    /// Returns the value in the middle (rounded up) of the range of values
    /// equivalent to the value.
    pub fn median_equivalent(&self, value: u64) -> u64 {
        self.lowest_equivalent(value)
            .saturating_add(self.equivalent_range_len(value) >> 1)
    }

    /// Returns the smallest value greater than the value which is not
    /// equivalent to it. Saturates at `u64::MAX`.
    pub fn next_non_equivalent(&self, value: u64) -> u64 {
        self.highest_equivalent(value).saturating_add(1)
    }

    /// Returns true if both values map to the same counter.
    pub fn equivalent(&self, a: u64, b: u64) -> bool {
        self.lowest_equivalent(a) == self.lowest_equivalent(b)
    }
}

#[inline]
fn value_from_location(bucket_index: u32, sub_bucket_index: u64, unit_magnitude: u32) -> u64 {
    sub_bucket_index << (bucket_index + unit_magnitude)
}

#[cfg(test)]
mod tests {
    use crate::{Config, Resolution};
    use rand::Rng;

    fn default() -> Config {
        Config::new(1, 16_777_215, Resolution::BucketFactor(16)).unwrap()
    }

    fn width(config: &Config, value: u64) -> u64 {
        config.next_non_equivalent(value) - config.lowest_equivalent(value)
    }

    #[test]
    fn index_of() {
        let config = default();
        assert_eq!(config.index_of(0), 0);
        assert_eq!(config.index_of(1), 1);
        assert_eq!(config.index_of(5), 5);
        assert_eq!(config.index_of(15), 15);
        // second bucket has a resolution of 2
        assert_eq!(config.index_of(16), 16);
        assert_eq!(config.index_of(17), 16);
        assert_eq!(config.index_of(18), 17);
        assert_eq!(config.index_of(8_388_607), 167);
        assert_eq!(config.index_of(8_388_608), 168);
        assert_eq!(config.index_of(9_000_000), 168);
        assert_eq!(config.index_of(16_777_215), 175);
        assert_eq!(config.index_of(16_777_216), 176);
    }

    #[test]
    fn value_at_index() {
        let config = default();
        assert_eq!(config.value_at_index(0), 0);
        assert_eq!(config.value_at_index(15), 15);
        assert_eq!(config.value_at_index(16), 16);
        assert_eq!(config.value_at_index(17), 18);
        assert_eq!(config.value_at_index(168), 8_388_608);
        assert_eq!(config.value_at_index(175), 15 << 20);

        for index in 0..config.counts_len() {
            assert_eq!(config.index_of(config.value_at_index(index)), index);
        }
    }

    #[test]
    fn equivalent_range() {
        let config = default();
        assert_eq!(width(&config, 5), 1);
        assert_eq!(width(&config, 17), 2);
        assert_eq!(width(&config, 123), 8);
        assert_eq!(config.lowest_equivalent(123), 120);
        assert_eq!(config.highest_equivalent(123), 127);
        assert_eq!(config.median_equivalent(123), 124);

        let max = 16_777_215;
        assert_eq!(config.lowest_equivalent(max), max + 1 - width(&config, max));
        assert_eq!(config.highest_equivalent(max), max);

        let config = Config::new(1, 30_000, Resolution::BucketFactor(16)).unwrap();
        assert_eq!(width(&config, 6_000), 512);
        assert_eq!(width(&config, 30_000), width(&config, 32_767));
        assert_eq!(config.lowest_equivalent(32_767), 32_768 - width(&config, 32_767));
        assert_eq!(config.highest_equivalent(32_767), 32_767);
    }

    #[test]
    fn unit_magnitude() {
        let config = Config::new(1024, 1 << 40, Resolution::SignificantFigures(2)).unwrap();
        assert_eq!(config.lowest_equivalent(1023), 0);
        assert_eq!(config.highest_equivalent(1023), 1023);
        assert_eq!(config.lowest_equivalent(1500), 1024);
        assert!(config.equivalent(1024, 2047));
        assert!(!config.equivalent(1023, 1024));
    }

    #[test]
    fn saturates() {
        let config = Config::new(1, u64::MAX, Resolution::SignificantFigures(3)).unwrap();
        assert_eq!(config.highest_equivalent(u64::MAX), u64::MAX);
        assert_eq!(config.next_non_equivalent(u64::MAX), u64::MAX);
        assert_eq!(config.index_of(u64::MAX), config.counts_len() - 1);
    }

    #[test]
    fn equivalence_invariants() {
        let mut rng = rand::thread_rng();

        for resolution in [
            Resolution::SignificantFigures(1),
            Resolution::SignificantFigures(3),
            Resolution::BucketFactor(16),
        ] {
            let config = Config::new(1, 1 << 40, resolution).unwrap();
            let max = config.max_trackable_value();

            for _ in 0..10_000 {
                let value = rng.gen_range(0..=max);
                let lowest = config.lowest_equivalent(value);
                let highest = config.highest_equivalent(value);

                assert!(lowest <= value && value <= highest);
                assert_eq!(highest + 1, config.next_non_equivalent(value));
                assert_eq!(config.index_of(lowest), config.index_of(value));
                assert_eq!(config.index_of(highest), config.index_of(value));
                assert!(config.equivalent(lowest, highest));
                assert_eq!(config.value_at_index(config.index_of(value)), lowest);
                if highest < max {
                    assert_eq!(config.index_of(highest + 1), config.index_of(value) + 1);
                }
            }
        }
    }
}
