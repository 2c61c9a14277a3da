use super::{Cursor, Pick, Step};
use crate::Config;

/// Reports every counts index, whether or not it has a count.
#[derive(Clone, Debug, Default)]
pub struct All {
    last: Option<usize>,
}

impl All {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Pick for All {
    fn pick(&mut self, config: &Config, cursor: &Cursor) -> Option<Step> {
        if self.last == Some(cursor.index) {
            return None;
        }
        self.last = Some(cursor.index);

        Some(Step {
            value_iterated_to: config.highest_equivalent(cursor.value),
            percentile_level: None,
        })
    }
}
