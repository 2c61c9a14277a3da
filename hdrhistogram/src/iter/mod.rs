//! Iteration over the counts array of a histogram.
//!
//! A `HistogramIter` walks the counts array from the lowest index, keeping a
//! cumulative count, and reports a step whenever its `Pick` strategy decides
//! that a reporting level has been reached. Counts seen since the previous
//! step are summed into the next one, so strategies may group many counters
//! into a single step or report several steps for one counter.
//!
//! Iteration ends once every recorded value has been reported. Iterators
//! borrow the histogram, so it cannot be modified while one is alive.

pub mod all;
pub mod linear;
pub mod log;
pub mod percentile;
pub mod recorded;

use crate::{Config, Counter, Error, Histogram};

/// The position of an iterator within the counts array.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Cursor {
    /// The current counts index.
    pub index: usize,
    /// The lowest value equivalent to the current counts index.
    pub value: u64,
    /// The count at the current counts index.
    pub count: u64,
    /// The sum of the counts up to and including the current counts index.
    pub cumulative_count: u64,
    /// The total count of the histogram.
    pub total_count: u64,
}

impl Cursor {
    /// The percentage of the total count at or below the current index.
    pub fn percentile(&self) -> f64 {
        100.0 * self.cumulative_count as f64 / self.total_count as f64
    }
}

/// A reporting level chosen by a `Pick` strategy.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Step {
    /// The value up to which the step reports.
    pub value_iterated_to: u64,
    /// The percentile level the step reports, if the strategy targets
    /// percentiles rather than values.
    pub percentile_level: Option<f64>,
}

/// A strategy which decides where the steps of an iteration end.
pub trait Pick {
    /// Called with the cursor at a counts index. Returning a step reports
    /// it. The cursor stays at the same index until `pick` returns `None`.
    fn pick(&mut self, config: &Config, cursor: &Cursor) -> Option<Step>;

    /// Called once after every recorded value has been reported, to allow a
    /// final step.
    fn finish(&mut self, _config: &Config, _cursor: &Cursor) -> Option<Step> {
        None
    }
}

/// A single step of a histogram iteration.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IterationValue {
    counts_index: usize,
    value_iterated_from: u64,
    value_iterated_to: u64,
    highest_equivalent_value: u64,
    count_at_index: u64,
    count: u64,
    cumulative_count: u64,
    percentile: f64,
    percentile_level_iterated_to: f64,
}

impl IterationValue {
    /// The counts index at which the step was reported.
    pub fn counts_index(&self) -> usize {
        self.counts_index
    }

    /// The value the previous step reported up to, or zero for the first.
    pub fn value_iterated_from(&self) -> u64 {
        self.value_iterated_from
    }

    /// The value this step reports up to.
    pub fn value_iterated_to(&self) -> u64 {
        self.value_iterated_to
    }

    /// The highest value equivalent to `value_iterated_to()`.
    pub fn highest_equivalent_value(&self) -> u64 {
        self.highest_equivalent_value
    }

    /// The count at the counts index of this step.
    pub fn count_at_index(&self) -> u64 {
        self.count_at_index
    }

    /// The count added since the previous step.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// The count of all values up to and including this step.
    pub fn cumulative_count(&self) -> u64 {
        self.cumulative_count
    }

    /// The percentage of all values up to and including this step.
    pub fn percentile(&self) -> f64 {
        self.percentile
    }

    /// The percentile level this step was reported for. Only differs from
    /// `percentile()` for percentile iteration.
    pub fn percentile_level_iterated_to(&self) -> f64 {
        self.percentile_level_iterated_to
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum State {
    Start,
    InBucket,
    Done,
}

/// An iterator over a histogram which reports steps chosen by `P`.
pub struct HistogramIter<'a, C: Counter, P: Pick> {
    histogram: &'a Histogram<C>,
    picker: P,
    state: State,
    cursor: Cursor,
    // the count at the cursor has not been added yet
    fresh: bool,
    // count added since the last reported step
    pending: u64,
    value_iterated_from: u64,
}

impl<'a, C: Counter, P: Pick> HistogramIter<'a, C, P> {
    pub(crate) fn new(histogram: &'a Histogram<C>, picker: P) -> Self {
        Self {
            histogram,
            picker,
            state: State::Start,
            cursor: Cursor {
                total_count: histogram.total_count(),
                ..Default::default()
            },
            fresh: true,
            pending: 0,
            value_iterated_from: 0,
        }
    }

    fn emit(&mut self, step: Step) -> IterationValue {
        let config = &self.histogram.config;
        let percentile = self.cursor.percentile();

        let value = IterationValue {
            counts_index: self.cursor.index,
            value_iterated_from: self.value_iterated_from,
            value_iterated_to: step.value_iterated_to,
            highest_equivalent_value: config.highest_equivalent(step.value_iterated_to),
            count_at_index: self.cursor.count,
            count: self.pending,
            cumulative_count: self.cursor.cumulative_count,
            percentile,
            percentile_level_iterated_to: step.percentile_level.unwrap_or(percentile),
        };

        self.pending = 0;
        self.value_iterated_from = step.value_iterated_to;

        value
    }
}

impl<C: Counter, P: Pick> Iterator for HistogramIter<'_, C, P> {
    type Item = IterationValue;

    fn next(&mut self) -> Option<Self::Item> {
        let histogram = self.histogram;
        let config = &histogram.config;

        loop {
            match self.state {
                State::Done => return None,
                State::Start => {
                    if self.cursor.total_count == 0 {
                        self.state = State::Done;
                        return None;
                    }
                    self.state = State::InBucket;
                }
                State::InBucket => {
                    let counts_len = histogram.counts.len();

                    if self.cursor.index >= counts_len {
                        // the strategy never reached a level covering the
                        // last counts, report them against the last index
                        self.state = State::Done;
                        if self.pending == 0 {
                            return None;
                        }
                        self.cursor.index = counts_len - 1;
                        let step = Step {
                            value_iterated_to: config.highest_equivalent(self.cursor.value),
                            percentile_level: None,
                        };
                        return Some(self.emit(step));
                    }

                    if self.fresh {
                        self.fresh = false;
                        let count = histogram.get_count(self.cursor.index);
                        self.cursor.value = config.value_at_index(self.cursor.index);
                        self.cursor.count = count;
                        self.cursor.cumulative_count += count;
                        self.pending += count;
                    }

                    if self.pending == 0 && self.cursor.cumulative_count >= self.cursor.total_count
                    {
                        self.state = State::Done;
                        let step = self.picker.finish(config, &self.cursor)?;
                        return Some(self.emit(step));
                    }

                    if let Some(step) = self.picker.pick(config, &self.cursor) {
                        return Some(self.emit(step));
                    }

                    self.cursor.index += 1;
                    self.fresh = true;
                }
            }
        }
    }
}

impl<C: Counter> Histogram<C> {
    /// Iterate through every counts index, including ones with a zero count,
    /// up to the last recorded value.
    pub fn iter_all(&self) -> HistogramIter<'_, C, all::All> {
        HistogramIter::new(self, all::All::new())
    }

    /// Iterate through every counts index with a non-zero count.
    pub fn iter_recorded(&self) -> HistogramIter<'_, C, recorded::Recorded> {
        HistogramIter::new(self, recorded::Recorded::new())
    }

    /// Iterate in steps of `value_units_per_bucket`, until every recorded
    /// value has been reported.
    ///
    /// Returns `Error::InvalidStep` if `value_units_per_bucket` is zero.
    pub fn iter_linear(
        &self,
        value_units_per_bucket: u64,
    ) -> Result<HistogramIter<'_, C, linear::Linear>, Error> {
        Ok(HistogramIter::new(
            self,
            linear::Linear::new(value_units_per_bucket)?,
        ))
    }

    /// Iterate in steps which start at `value_units_in_first_bucket` and grow
    /// by a factor of `log_base`, until every recorded value has been
    /// reported.
    ///
    /// Returns `Error::InvalidStep` if `value_units_in_first_bucket` is zero
    /// or `log_base` is not greater than `1.0`.
    pub fn iter_log(
        &self,
        value_units_in_first_bucket: u64,
        log_base: f64,
    ) -> Result<HistogramIter<'_, C, log::Log>, Error> {
        Ok(HistogramIter::new(
            self,
            log::Log::new(value_units_in_first_bucket, log_base)?,
        ))
    }

    /// Iterate through percentile levels which start at 0% and approach 100%
    /// in steps that halve in size every `ticks_per_half_distance` steps,
    /// ending with a step at 100%.
    ///
    /// Returns `Error::InvalidStep` if `ticks_per_half_distance` is zero.
    pub fn iter_percentiles(
        &self,
        ticks_per_half_distance: u32,
    ) -> Result<HistogramIter<'_, C, percentile::Percentile>, Error> {
        Ok(HistogramIter::new(
            self,
            percentile::Percentile::new(ticks_per_half_distance)?,
        ))
    }
}
