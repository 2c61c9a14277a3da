//! The parameters and derived bucket layout for a histogram.
//!
//! Values are stored in buckets which each span a power of two. Each bucket is
//! split into equal width sub-buckets, so the width of a sub-bucket (and with
//! it the absolute error) doubles from one bucket to the next while the
//! relative error stays bounded.
//!
//! Bucket 0 uses all `sub_bucket_count` sub-buckets with a width of
//! `2^unit_magnitude`. Every following bucket only needs its upper half, the
//! lower half being covered at a finer resolution by the buckets before it.
//! This gives a counts array of `(bucket_count + 1) * sub_bucket_half_count`
//! slots.

use crate::BuildError;

/// The largest supported length of the counts array.
pub(crate) const MAX_COUNTS_LEN: usize = i32::MAX as usize;

// the sub-bucket span, `sub_bucket_count << unit_magnitude`, must be
// representable with room to spare for at least one doubling
const MAX_MAGNITUDE: u32 = 62;

const MAX_SIGNIFICANT_FIGURES: u8 = 5;

/// Controls the width of sub-buckets and therefore the relative error.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub enum Resolution {
    /// Maintain value precision of this many significant decimal digits.
    /// Must be in the range `1..=5`.
    SignificantFigures(u8),
    /// The number of values with unit resolution in the first bucket. Rounded
    /// up to the next power of two and must be at least `2`.
    BucketFactor(u32),
}

/// How an auto-resizing histogram grows when a value exceeds its range.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub enum GrowthPolicy {
    /// Grow to exactly the number of buckets needed to cover the value.
    Exact,
    /// At least double the number of buckets.
    #[default]
    Doubling,
}

/// The parameters which describe a histogram.
///
/// # Constraints
/// * `lowest_discernible_value` must be at least `1`
/// * `highest_trackable_value` must be at least twice the
///   `lowest_discernible_value`
/// * `resolution` must be within the range allowed for its variant
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct Parameters {
    pub lowest_discernible_value: u64,
    pub highest_trackable_value: u64,
    pub resolution: Resolution,
    #[cfg_attr(feature = "serde", serde(default))]
    pub auto_resize: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub growth: GrowthPolicy,
}

impl Parameters {
    pub fn new(
        lowest_discernible_value: u64,
        highest_trackable_value: u64,
        resolution: Resolution,
    ) -> Self {
        Self {
            lowest_discernible_value,
            highest_trackable_value,
            resolution,
            auto_resize: false,
            growth: GrowthPolicy::default(),
        }
    }
}

/// The bucket layout of a histogram. This is fully determined by the lowest
/// discernible value, the highest trackable value, and the resolution.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Config {
    pub(crate) lowest_discernible_value: u64,
    pub(crate) highest_trackable_value: u64,
    pub(crate) resolution: Resolution,
    pub(crate) unit_magnitude: u32,
    pub(crate) sub_bucket_count: u32,
    pub(crate) sub_bucket_half_count: u32,
    pub(crate) sub_bucket_half_count_magnitude: u32,
    pub(crate) sub_bucket_mask: u64,
    pub(crate) bucket_count: u32,
    pub(crate) counts_len: usize,
}

impl Config {
    /// Calculate the bucket layout for the provided parameters.
    pub fn new(
        lowest_discernible_value: u64,
        highest_trackable_value: u64,
        resolution: Resolution,
    ) -> Result<Self, BuildError> {
        if lowest_discernible_value < 1 {
            return Err(BuildError::InvalidRange);
        }

        // the number of values which must be representable at unit resolution
        let single_unit_range: u64 = match resolution {
            Resolution::SignificantFigures(figures) => {
                if !(1..=MAX_SIGNIFICANT_FIGURES).contains(&figures) {
                    return Err(BuildError::InvalidResolution);
                }
                2 * 10_u64.pow(figures as u32)
            }
            Resolution::BucketFactor(factor) => {
                if factor < 2 {
                    return Err(BuildError::InvalidResolution);
                }
                factor as u64
            }
        };

        match lowest_discernible_value.checked_mul(2) {
            Some(min) if highest_trackable_value >= min => {}
            _ => return Err(BuildError::InvalidRange),
        }

        // ceil(log2(single_unit_range)), at least 1
        let sub_bucket_count_magnitude = single_unit_range
            .next_power_of_two()
            .trailing_zeros()
            .max(1);
        // the sub-bucket count is held in a u32
        if sub_bucket_count_magnitude >= u32::BITS {
            return Err(BuildError::InvalidResolution);
        }
        let sub_bucket_half_count_magnitude = sub_bucket_count_magnitude - 1;

        let unit_magnitude = lowest_discernible_value.ilog2();

        if unit_magnitude + sub_bucket_half_count_magnitude > MAX_MAGNITUDE {
            return Err(BuildError::InvalidResolution);
        }

        let sub_bucket_count = 1_u32 << sub_bucket_count_magnitude;
        let sub_bucket_half_count = sub_bucket_count / 2;
        let sub_bucket_mask = ((sub_bucket_count - 1) as u64) << unit_magnitude;

        let bucket_count =
            buckets_needed_to_cover(highest_trackable_value, sub_bucket_count, unit_magnitude);
        let counts_len = counts_len_for(bucket_count, sub_bucket_half_count)?;

        log::trace!(
            "histogram layout: unit_magnitude: {unit_magnitude} sub_bucket_count: {sub_bucket_count} bucket_count: {bucket_count} counts_len: {counts_len}"
        );

        Ok(Self {
            lowest_discernible_value,
            highest_trackable_value,
            resolution,
            unit_magnitude,
            sub_bucket_count,
            sub_bucket_half_count,
            sub_bucket_half_count_magnitude,
            sub_bucket_mask,
            bucket_count,
            counts_len,
        })
    }

    /// Returns a copy of this layout extended (or reduced) to the provided
    /// number of buckets. Counts indices are unaffected by the number of
    /// buckets, so counters from this layout keep their positions.
    pub(crate) fn with_bucket_count(&self, bucket_count: u32) -> Result<Self, BuildError> {
        let counts_len = counts_len_for(bucket_count, self.sub_bucket_half_count)?;

        let mut config = Self {
            bucket_count,
            counts_len,
            ..*self
        };
        config.highest_trackable_value = config.max_trackable_value();

        Ok(config)
    }

    /// The number of buckets needed to cover the value with this layout.
    pub(crate) fn buckets_needed_to_cover(&self, value: u64) -> u32 {
        buckets_needed_to_cover(value, self.sub_bucket_count, self.unit_magnitude)
    }

    /// The number of buckets needed to cover every `u64`.
    pub(crate) fn max_bucket_count(&self) -> u32 {
        self.buckets_needed_to_cover(u64::MAX)
    }

    pub fn lowest_discernible_value(&self) -> u64 {
        self.lowest_discernible_value
    }

    /// The highest trackable value that was requested. The layout may be able
    /// to track somewhat larger values, see `max_trackable_value()`.
    pub fn highest_trackable_value(&self) -> u64 {
        self.highest_trackable_value
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn unit_magnitude(&self) -> u32 {
        self.unit_magnitude
    }

    pub fn sub_bucket_count(&self) -> u32 {
        self.sub_bucket_count
    }

    pub fn sub_bucket_half_count(&self) -> u32 {
        self.sub_bucket_half_count
    }

    pub fn sub_bucket_half_count_magnitude(&self) -> u32 {
        self.sub_bucket_half_count_magnitude
    }

    pub fn bucket_count(&self) -> u32 {
        self.bucket_count
    }

    /// The number of counters in the counts array.
    pub fn counts_len(&self) -> usize {
        self.counts_len
    }

    /// The largest value that can be recorded with this layout. Always at
    /// least the requested highest trackable value.
    pub fn max_trackable_value(&self) -> u64 {
        self.highest_equivalent(self.value_at_index(self.counts_len - 1))
    }
}

fn counts_len_for(bucket_count: u32, sub_bucket_half_count: u32) -> Result<usize, BuildError> {
    (bucket_count as usize + 1)
        .checked_mul(sub_bucket_half_count as usize)
        .filter(|len| *len <= MAX_COUNTS_LEN)
        .ok_or(BuildError::CountsOverflow)
}

// Bucket `k` covers `0..sub_bucket_count * 2^(k + unit_magnitude)` in units of
// `2^(k + unit_magnitude)`.
fn buckets_needed_to_cover(value: u64, sub_bucket_count: u32, unit_magnitude: u32) -> u32 {
    let mut smallest_untrackable_value = (sub_bucket_count as u64) << unit_magnitude;

    let mut buckets_needed = 1;
    while smallest_untrackable_value <= value {
        if smallest_untrackable_value > u64::MAX / 2 {
            // the next bucket reaches past u64::MAX
            return buckets_needed + 1;
        }
        smallest_untrackable_value <<= 1;
        buckets_needed += 1;
    }
    buckets_needed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_factor() {
        let config = Config::new(1, 16_777_215, Resolution::BucketFactor(16)).unwrap();
        assert_eq!(config.unit_magnitude(), 0);
        assert_eq!(config.sub_bucket_count(), 16);
        assert_eq!(config.sub_bucket_half_count(), 8);
        assert_eq!(config.sub_bucket_half_count_magnitude(), 3);
        assert_eq!(config.bucket_count(), 21);
        assert_eq!(config.counts_len(), 176);
        assert_eq!(config.max_trackable_value(), 16_777_215);
    }

    #[test]
    fn significant_figures() {
        let config = Config::new(1, 16_777_215, Resolution::SignificantFigures(1)).unwrap();
        assert_eq!(config.sub_bucket_count(), 32);
        assert_eq!(config.bucket_count(), 20);
        assert_eq!(config.counts_len(), 336);

        let config = Config::new(1, 3_600_000_000, Resolution::SignificantFigures(3)).unwrap();
        assert_eq!(config.sub_bucket_count(), 2048);
        assert_eq!(config.sub_bucket_half_count_magnitude(), 10);
        assert_eq!(config.bucket_count(), 22);
        assert_eq!(config.counts_len(), 23_552);
    }

    #[test]
    fn derived_max() {
        let config = Config::new(1, 30_000, Resolution::BucketFactor(16)).unwrap();
        assert_eq!(config.bucket_count(), 12);
        assert_eq!(config.counts_len(), 104);
        assert_eq!(config.max_trackable_value(), 32_767);
        assert_eq!(
            config.max_trackable_value(),
            (1 << (config.sub_bucket_half_count_magnitude() + config.bucket_count())) - 1
        );
    }

    #[test]
    fn unit_magnitude() {
        let config = Config::new(20_000_000, 100_000_000, Resolution::BucketFactor(32)).unwrap();
        assert_eq!(config.unit_magnitude(), 24);
        assert_eq!(config.sub_bucket_count(), 32);
        assert_eq!(config.bucket_count(), 1);
        assert_eq!(config.counts_len(), 32);
    }

    #[test]
    fn factor_rounds_to_power_of_two() {
        let a = Config::new(1, 1_000_000, Resolution::BucketFactor(12)).unwrap();
        let b = Config::new(1, 1_000_000, Resolution::BucketFactor(16)).unwrap();
        assert_eq!(a.sub_bucket_count(), b.sub_bucket_count());
        assert_eq!(a.counts_len(), b.counts_len());

        let config = Config::new(1, 1_000, Resolution::BucketFactor(2)).unwrap();
        assert_eq!(config.sub_bucket_count(), 2);
        assert_eq!(config.sub_bucket_half_count_magnitude(), 0);
    }

    #[test]
    fn full_range() {
        let config = Config::new(1, u64::MAX, Resolution::SignificantFigures(2)).unwrap();
        assert_eq!(config.max_trackable_value(), u64::MAX);
        assert_eq!(config.bucket_count(), config.max_bucket_count());
    }

    #[test]
    fn deterministic() {
        for resolution in [
            Resolution::SignificantFigures(1),
            Resolution::SignificantFigures(3),
            Resolution::SignificantFigures(5),
            Resolution::BucketFactor(8),
            Resolution::BucketFactor(1000),
        ] {
            let a = Config::new(7, 123_456_789, resolution).unwrap();
            let b = Config::new(7, 123_456_789, resolution).unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn invalid_range() {
        assert_eq!(
            Config::new(0, 100, Resolution::SignificantFigures(2)),
            Err(BuildError::InvalidRange)
        );
        assert_eq!(
            Config::new(10, 19, Resolution::SignificantFigures(2)),
            Err(BuildError::InvalidRange)
        );
        assert_eq!(
            Config::new(u64::MAX / 2 + 1, u64::MAX, Resolution::SignificantFigures(2)),
            Err(BuildError::InvalidRange)
        );
        assert!(Config::new(10, 20, Resolution::SignificantFigures(2)).is_ok());
    }

    #[test]
    fn invalid_resolution() {
        for resolution in [
            Resolution::SignificantFigures(0),
            Resolution::SignificantFigures(6),
            Resolution::BucketFactor(0),
            Resolution::BucketFactor(1),
            Resolution::BucketFactor((1 << 31) + 1),
            Resolution::BucketFactor(u32::MAX),
        ] {
            assert_eq!(
                Config::new(1, 16_777_215, resolution),
                Err(BuildError::InvalidResolution)
            );
        }

        // sub-bucket span would not fit
        assert_eq!(
            Config::new(1 << 60, u64::MAX, Resolution::SignificantFigures(2)),
            Err(BuildError::InvalidResolution)
        );
    }

    #[test]
    fn counts_overflow() {
        assert_eq!(
            Config::new(1, u64::MAX, Resolution::BucketFactor(1 << 30)),
            Err(BuildError::CountsOverflow)
        );
        // the widest sub-bucket count still fits, but not its counters
        assert_eq!(
            Config::new(1, 1000, Resolution::BucketFactor(1 << 31)),
            Err(BuildError::CountsOverflow)
        );
    }
}
