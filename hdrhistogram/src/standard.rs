use crate::{Bucket, BuildError, Config, Counter, Error, GrowthPolicy, Parameters, Resolution};

/// A builder for a `Histogram` which allows optional behaviors to be set.
pub struct Builder {
    parameters: Parameters,
}

impl Builder {
    /// Begin building a histogram which tracks values from
    /// `lowest_discernible_value` to `highest_trackable_value` with the given
    /// resolution.
    pub fn new(
        lowest_discernible_value: u64,
        highest_trackable_value: u64,
        resolution: Resolution,
    ) -> Self {
        Self {
            parameters: Parameters::new(
                lowest_discernible_value,
                highest_trackable_value,
                resolution,
            ),
        }
    }

    /// Grow the histogram when a value beyond its range is recorded, rather
    /// than rejecting the value.
    pub fn auto_resize(mut self, enabled: bool) -> Self {
        self.parameters.auto_resize = enabled;
        self
    }

    /// Set how an auto-resizing histogram grows.
    pub fn growth_policy(mut self, growth: GrowthPolicy) -> Self {
        self.parameters.growth = growth;
        self
    }

    pub fn build<C: Counter>(self) -> Result<Histogram<C>, BuildError> {
        Histogram::from_parameters(&self.parameters)
    }
}

impl From<Parameters> for Builder {
    fn from(parameters: Parameters) -> Self {
        Self { parameters }
    }
}

/// A histogram that tracks the distribution of `u64` values with bounded
/// relative error, using a fixed number of counters of type `C`.
///
/// Recording is constant time. Queries scan the counts array, which is small
/// and fixed for a given set of parameters.
///
/// The histogram is not internally synchronized. Any number of readers may
/// share a reference, but writes need exclusive access.
#[derive(Clone, Debug)]
pub struct Histogram<C: Counter = u64> {
    pub(crate) config: Config,
    pub(crate) counts: Box<[C]>,
    pub(crate) total_count: u64,
    // highest equivalent value of the largest recorded value
    pub(crate) max_value: u64,
    // lowest equivalent value of the smallest recorded non-zero value
    pub(crate) min_non_zero_value: u64,
    pub(crate) auto_resize: bool,
    pub(crate) growth: GrowthPolicy,
}

impl<C: Counter> Histogram<C> {
    /// Construct a new `Histogram` which tracks values from
    /// `lowest_discernible_value` to `highest_trackable_value`.
    ///
    /// # Constraints
    /// * `lowest_discernible_value` must be at least `1`
    /// * `highest_trackable_value` must be at least twice the
    ///   `lowest_discernible_value`
    /// * `resolution` must be in the supported range for its variant
    pub fn new(
        lowest_discernible_value: u64,
        highest_trackable_value: u64,
        resolution: Resolution,
    ) -> Result<Self, BuildError> {
        let config = Config::new(lowest_discernible_value, highest_trackable_value, resolution)?;

        Ok(Self::from_config(config))
    }

    /// Construct a new `Histogram` from a set of `Parameters`.
    pub fn from_parameters(parameters: &Parameters) -> Result<Self, BuildError> {
        let config = Config::new(
            parameters.lowest_discernible_value,
            parameters.highest_trackable_value,
            parameters.resolution,
        )?;

        let mut histogram = Self::from_config(config);
        histogram.auto_resize = parameters.auto_resize;
        histogram.growth = parameters.growth;

        Ok(histogram)
    }

    pub(crate) fn from_config(config: Config) -> Self {
        let counts: Box<[C]> = vec![C::zero(); config.counts_len()].into();

        Self {
            config,
            counts,
            total_count: 0,
            max_value: 0,
            min_non_zero_value: u64::MAX,
            auto_resize: false,
            growth: GrowthPolicy::default(),
        }
    }

    /// Record a single occurrence of the value.
    pub fn record(&mut self, value: u64) -> Result<(), Error> {
        self.record_n(value, 1)
    }

    /// Record `count` occurrences of the value.
    ///
    /// Fails with `Error::ValueOutOfRange` if the value is beyond the
    /// trackable range and the histogram does not auto-resize, or with
    /// `Error::CounterOverflow` if the counter or the total count would
    /// overflow. The histogram is unchanged when an error is returned.
    pub fn record_n(&mut self, value: u64, count: u64) -> Result<(), Error> {
        let index = self.config.index_of(value);
        let in_range = index < self.counts.len();

        if !in_range && !self.auto_resize {
            return Err(Error::ValueOutOfRange);
        }

        if count == 0 {
            return Ok(());
        }

        let total_count = self
            .total_count
            .checked_add(count)
            .filter(|_| count <= C::max_count())
            .ok_or(Error::CounterOverflow)?;

        if !in_range {
            self.resize(value)?;
        }

        let counter = self.counts[index]
            .checked_add_u64(count)
            .ok_or(Error::CounterOverflow)?;

        self.counts[index] = counter;
        self.total_count = total_count;
        self.update_min_max(value);

        Ok(())
    }

    fn update_min_max(&mut self, value: u64) {
        let highest = self.config.highest_equivalent(value);
        if highest > self.max_value {
            self.max_value = highest;
        }

        if value != 0 {
            let lowest = self.config.lowest_equivalent(value);
            if lowest < self.min_non_zero_value {
                self.min_non_zero_value = lowest;
            }
        }
    }

    /// Grow the counts array so that the value can be recorded. Either the
    /// layout and counters are both replaced, or nothing changes.
    fn resize(&mut self, value: u64) -> Result<(), Error> {
        let needed = self.config.buckets_needed_to_cover(value);
        let bucket_count = match self.growth {
            GrowthPolicy::Exact => needed,
            GrowthPolicy::Doubling => needed.max(self.config.bucket_count().saturating_mul(2)),
        }
        .min(self.config.max_bucket_count());

        let config = self.config.with_bucket_count(bucket_count).map_err(|e| {
            log::warn!("refusing to grow histogram to {bucket_count} buckets: {e}");
            Error::from(e)
        })?;

        let mut counts: Vec<C> = Vec::new();
        counts
            .try_reserve_exact(config.counts_len())
            .map_err(|_| Error::AllocationFailed)?;
        counts.extend_from_slice(&self.counts);
        counts.resize(config.counts_len(), C::zero());

        log::debug!(
            "growing histogram from {} to {} buckets ({} to {} counters) to record {value}",
            self.config.bucket_count(),
            config.bucket_count(),
            self.config.counts_len(),
            config.counts_len(),
        );

        self.config = config;
        self.counts = counts.into_boxed_slice();

        Ok(())
    }

    /// Clear all recorded values. The counts array is kept.
    pub fn reset(&mut self) {
        self.counts.fill(C::zero());
        self.total_count = 0;
        self.max_value = 0;
        self.min_non_zero_value = u64::MAX;
    }

    /// Returns the number of bytes used by the histogram, including the
    /// counts array.
    pub fn memory_size(&self) -> usize {
        core::mem::size_of::<Self>() + self.counts.len() * core::mem::size_of::<C>()
    }

    /// Returns the bucket layout.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the raw counters, in counts index order.
    pub fn counts(&self) -> &[C] {
        &self.counts
    }

    /// Returns the total number of recorded values.
    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    pub fn is_empty(&self) -> bool {
        self.total_count == 0
    }

    pub fn auto_resize(&self) -> bool {
        self.auto_resize
    }

    pub fn set_auto_resize(&mut self, enabled: bool) {
        self.auto_resize = enabled;
    }

    pub fn growth_policy(&self) -> GrowthPolicy {
        self.growth
    }

    /// Returns the largest value that can currently be recorded.
    pub fn max_trackable_value(&self) -> u64 {
        self.config.max_trackable_value()
    }

    /// See `Config::lowest_equivalent`.
    pub fn lowest_equivalent(&self, value: u64) -> u64 {
        self.config.lowest_equivalent(value)
    }

    /// See `Config::highest_equivalent`.
    pub fn highest_equivalent(&self, value: u64) -> u64 {
        self.config.highest_equivalent(value)
    }

    /// See `Config::median_equivalent`.
    pub fn median_equivalent(&self, value: u64) -> u64 {
        self.config.median_equivalent(value)
    }

    /// See `Config::next_non_equivalent`.
    pub fn next_non_equivalent(&self, value: u64) -> u64 {
        self.config.next_non_equivalent(value)
    }

    /// See `Config::equivalent`.
    pub fn equivalent(&self, a: u64, b: u64) -> bool {
        self.config.equivalent(a, b)
    }

    pub(crate) fn get_count(&self, index: usize) -> u64 {
        self.counts[index].as_u64()
    }

    pub(crate) fn get_bucket(&self, index: usize) -> Bucket {
        let lower = self.config.value_at_index(index);

        Bucket {
            count: self.get_count(index),
            lower,
            upper: self.config.highest_equivalent(lower),
        }
    }

    /// Returns the bucket for the counts index, or `None` if the index is out
    /// of range.
    pub fn bucket(&self, index: usize) -> Option<Bucket> {
        if index < self.counts.len() {
            Some(self.get_bucket(index))
        } else {
            None
        }
    }

    /// Returns the count recorded for values equivalent to the value.
    pub fn count_at(&self, value: u64) -> Result<u64, Error> {
        self.counts
            .get(self.config.index_of(value))
            .map(|count| count.as_u64())
            .ok_or(Error::ValueOutOfRange)
    }

    /// Returns the count of recorded values between `low` and `high`,
    /// inclusive to within the histogram's resolution. Values past the end
    /// of the trackable range are clamped to it.
    pub fn count_between(&self, low: u64, high: u64) -> u64 {
        let last = self.counts.len() - 1;
        let low = self.config.index_of(low).min(last);
        let high = self.config.index_of(high).min(last);

        if low > high {
            return 0;
        }

        self.counts[low..=high].iter().map(|count| count.as_u64()).sum()
    }

    /// Returns the lowest recorded value, to within the histogram's
    /// resolution.
    pub fn min(&self) -> Result<u64, Error> {
        if self.is_empty() {
            return Err(Error::Empty);
        }

        if self.counts[0].as_u64() != 0 {
            Ok(0)
        } else {
            Ok(self.min_non_zero_value)
        }
    }

    /// Returns the highest recorded value, to within the histogram's
    /// resolution.
    pub fn max(&self) -> Result<u64, Error> {
        if self.is_empty() {
            return Err(Error::Empty);
        }

        Ok(self.max_value)
    }

    /// Returns the lowest recorded non-zero value, to within the histogram's
    /// resolution.
    pub fn min_non_zero(&self) -> Result<u64, Error> {
        if self.min_non_zero_value == u64::MAX {
            return Err(Error::Empty);
        }

        Ok(self.min_non_zero_value)
    }

    /// Returns the mean of all recorded values, using the median equivalent
    /// value of each counter.
    pub fn mean(&self) -> Result<f64, Error> {
        if self.is_empty() {
            return Err(Error::Empty);
        }

        let total = self.total_count as f64;

        Ok(self.iter_recorded().fold(0.0, |mean, v| {
            mean + self.config.median_equivalent(v.value_iterated_to()) as f64 * v.count() as f64
                / total
        }))
    }

    /// Returns the standard deviation of all recorded values.
    pub fn stdev(&self) -> Result<f64, Error> {
        let mean = self.mean()?;

        let deviation = self.iter_recorded().fold(0.0, |total, v| {
            let dev = self.config.median_equivalent(v.value_iterated_to()) as f64 - mean;
            total + dev * dev * v.count() as f64
        });

        Ok((deviation / self.total_count as f64).sqrt())
    }
}
