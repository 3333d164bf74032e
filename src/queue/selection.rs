//! Counter selection for new enrollments

use crate::types::{CounterIndex, CounterLoad};

/// Trait for choosing the counter a new user joins
pub trait CounterSelector: Send + Sync {
    /// Pick a counter given the current loads, ordered by counter index.
    ///
    /// `loads` is never empty.
    fn select(&self, loads: &[CounterLoad]) -> CounterIndex;
}

/// Picks the counter with the fewest active users.
///
/// Counters are scanned in index order and the running minimum only moves on
/// a strictly smaller active count, so ties go to the lowest index.
#[derive(Debug, Default, Clone, Copy)]
pub struct LeastLoadedSelector;

impl LeastLoadedSelector {
    pub fn new() -> Self {
        Self
    }
}

impl CounterSelector for LeastLoadedSelector {
    fn select(&self, loads: &[CounterLoad]) -> CounterIndex {
        let Some(first) = loads.first() else {
            return 0;
        };

        let mut min = first;
        for load in &loads[1..] {
            if load.active < min.active {
                min = load;
            }
        }
        min.counter
    }
}
