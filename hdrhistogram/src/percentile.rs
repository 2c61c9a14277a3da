//! Percentile queries.
//!
//! The count needed for a percentile is rounded to the nearest whole count
//! (half up) and is always at least one, so the 0th percentile is the first
//! recorded value.

use crate::{Bucket, Counter, Error, Histogram};

impl<C: Counter> Histogram<C> {
    fn count_at_percentile(&self, percentile: f64) -> u64 {
        let count = (percentile / 100.0 * self.total_count as f64 + 0.5) as u64;
        count.clamp(1, self.total_count)
    }

    /// Returns the `Bucket` where the requested percentile falls within the
    /// value range for the bucket. Percentiles should be expressed as a value
    /// in the range `0.0..=100.0`.
    pub fn percentile(&self, percentile: f64) -> Result<Bucket, Error> {
        self.percentiles(&[percentile])?
            .pop()
            .map(|(_, bucket)| bucket)
            .ok_or(Error::Empty)
    }

    /// Returns the `Bucket` for each requested percentile, sorted by
    /// percentile. The counts array is walked only once.
    pub fn percentiles(&self, percentiles: &[f64]) -> Result<Vec<(f64, Bucket)>, Error> {
        // if the histogram is empty, then we should return an error
        if self.is_empty() {
            return Err(Error::Empty);
        }

        if !percentiles.iter().all(|p| (0.0..=100.0).contains(p)) {
            return Err(Error::InvalidPercentile);
        }

        // sort the requested percentiles so we can find them in a single pass
        let mut percentiles = percentiles.to_vec();
        percentiles.sort_by(|a, b| a.total_cmp(b));

        let mut result = Vec::with_capacity(percentiles.len());

        let mut have = 0_u64;
        let mut current_idx = 0_usize;
        // the last index with a non-zero count we have seen
        let mut last_idx = 0_usize;

        for percentile in percentiles {
            let needed = self.count_at_percentile(percentile);

            // walk the counters until there are enough for the percentile,
            // which always happens before the end since needed <= total
            while have < needed && current_idx < self.counts.len() {
                let count = self.get_count(current_idx);
                if count > 0 {
                    have += count;
                    last_idx = current_idx;
                }
                current_idx += 1;
            }

            result.push((percentile, self.get_bucket(last_idx)));
        }

        Ok(result)
    }

    /// Returns the value at the percentile. This is the highest value
    /// equivalent to the value which that percentage of recorded values are
    /// at or below. For the 0th percentile, it is the lowest value equivalent
    /// to the smallest recorded value.
    pub fn value_at_percentile(&self, percentile: f64) -> Result<u64, Error> {
        let bucket = self.percentile(percentile)?;

        if percentile == 0.0 {
            Ok(bucket.lower())
        } else {
            Ok(bucket.upper())
        }
    }

    /// Returns the percentage of recorded values that are at or below the
    /// value, to within the histogram's resolution.
    pub fn percentile_below(&self, value: u64) -> Result<f64, Error> {
        if self.is_empty() {
            return Err(Error::Empty);
        }

        let index = self.config.index_of(value).min(self.counts.len() - 1);
        let below: u64 = self.counts[..=index].iter().map(|c| c.as_u64()).sum();

        Ok(100.0 * below as f64 / self.total_count as f64)
    }

    /// Returns the `(percentile, value)` ladder of a percentile iteration, for
    /// reporting a distribution compactly. See `iter_percentiles()`.
    pub fn percentile_ladder(
        &self,
        ticks_per_half_distance: u32,
    ) -> Result<Vec<(f64, u64)>, Error> {
        if self.is_empty() {
            return Err(Error::Empty);
        }

        Ok(self
            .iter_percentiles(ticks_per_half_distance)?
            .map(|v| (v.percentile_level_iterated_to(), v.value_iterated_to()))
            .collect())
    }
}
