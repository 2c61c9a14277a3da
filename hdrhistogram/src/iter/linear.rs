use super::{Cursor, Pick, Step};
use crate::{Config, Error};

/// Reports steps of a fixed number of value units. The step ending at level
/// `n * value_units_per_bucket` covers the values below that level, and
/// includes the whole counter holding the highest of them.
#[derive(Clone, Debug)]
pub struct Linear {
    value_units_per_bucket: u64,
    next_level: u64,
}

impl Linear {
    /// Returns `Error::InvalidStep` if `value_units_per_bucket` is zero.
    pub fn new(value_units_per_bucket: u64) -> Result<Self, Error> {
        if value_units_per_bucket == 0 {
            return Err(Error::InvalidStep);
        }

        Ok(Self {
            value_units_per_bucket,
            next_level: value_units_per_bucket,
        })
    }
}

impl Pick for Linear {
    fn pick(&mut self, config: &Config, cursor: &Cursor) -> Option<Step> {
        let highest = self.next_level - 1;

        if cursor.value < config.lowest_equivalent(highest) {
            return None;
        }

        self.next_level = self.next_level.saturating_add(self.value_units_per_bucket);

        Some(Step {
            value_iterated_to: highest,
            percentile_level: None,
        })
    }
}
