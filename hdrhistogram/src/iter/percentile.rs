use super::{Cursor, Pick, Step};
use crate::{Config, Error};

/// Reports steps at percentile levels which start at 0% and close in on
/// 100%. The distance to 100% halves every `ticks_per_half_distance` steps.
///
/// Each step reports the highest value equivalent to the first counter at
/// which the cumulative count reaches the percentile level. A final step is
/// reported at 100%.
#[derive(Clone, Debug)]
pub struct Percentile {
    ticks_per_half_distance: u32,
    percentile_to_iterate_to: f64,
    reached_last: bool,
}

impl Percentile {
    /// Returns `Error::InvalidStep` if `ticks_per_half_distance` is zero.
    pub fn new(ticks_per_half_distance: u32) -> Result<Self, Error> {
        if ticks_per_half_distance == 0 {
            return Err(Error::InvalidStep);
        }

        Ok(Self {
            ticks_per_half_distance,
            percentile_to_iterate_to: 0.0,
            reached_last: false,
        })
    }

    fn advance(&mut self) {
        let remaining = 100.0 / (100.0 - self.percentile_to_iterate_to);
        // at 100% the log is infinite and the increment becomes zero
        let half_distance = 2_f64.powi((remaining.log2() as i32).saturating_add(1));
        let ticks = self.ticks_per_half_distance as f64 * half_distance;
        let next = self.percentile_to_iterate_to + 100.0 / ticks;
        // once the increment is lost to rounding, the next level is 100%
        self.percentile_to_iterate_to = if next > self.percentile_to_iterate_to {
            next.min(100.0)
        } else {
            100.0
        };
    }
}

impl Pick for Percentile {
    fn pick(&mut self, config: &Config, cursor: &Cursor) -> Option<Step> {
        if cursor.count == 0 || self.percentile_to_iterate_to > cursor.percentile() {
            return None;
        }

        // with large totals the percentile rounds up to 100% before the last
        // counter, only the last counter reaches it
        if self.percentile_to_iterate_to >= 100.0
            && cursor.cumulative_count < cursor.total_count
        {
            return None;
        }

        let level = self.percentile_to_iterate_to;
        self.advance();

        Some(Step {
            value_iterated_to: config.highest_equivalent(cursor.value),
            percentile_level: Some(level),
        })
    }

    fn finish(&mut self, config: &Config, cursor: &Cursor) -> Option<Step> {
        if self.reached_last {
            return None;
        }
        self.reached_last = true;

        Some(Step {
            value_iterated_to: config.highest_equivalent(cursor.value),
            percentile_level: Some(100.0),
        })
    }
}
