use super::{Cursor, Pick, Step};
use crate::{Config, Error};

/// Reports steps ending at levels which grow by a constant factor.
#[derive(Clone, Debug)]
pub struct Log {
    log_base: f64,
    next_level: f64,
}

impl Log {
    /// Returns `Error::InvalidStep` if the first step is zero or `log_base`
    /// is not greater than `1.0`.
    pub fn new(value_units_in_first_bucket: u64, log_base: f64) -> Result<Self, Error> {
        if value_units_in_first_bucket == 0 || log_base.is_nan() || log_base <= 1.0 {
            return Err(Error::InvalidStep);
        }

        Ok(Self {
            log_base,
            next_level: value_units_in_first_bucket as f64,
        })
    }
}

impl Pick for Log {
    fn pick(&mut self, config: &Config, cursor: &Cursor) -> Option<Step> {
        // float to int casts saturate
        let highest = (self.next_level as u64).saturating_sub(1);

        if cursor.value < config.lowest_equivalent(highest) {
            return None;
        }

        self.next_level *= self.log_base;

        Some(Step {
            value_iterated_to: highest,
            percentile_level: None,
        })
    }
}
