use super::{Cursor, Pick, Step};
use crate::Config;

/// Reports every counts index with a non-zero count.
#[derive(Clone, Debug, Default)]
pub struct Recorded {
    last: Option<usize>,
}

impl Recorded {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Pick for Recorded {
    fn pick(&mut self, config: &Config, cursor: &Cursor) -> Option<Step> {
        if cursor.count == 0 || self.last == Some(cursor.index) {
            return None;
        }
        self.last = Some(cursor.index);

        Some(Step {
            value_iterated_to: config.highest_equivalent(cursor.value),
            percentile_level: None,
        })
    }
}
