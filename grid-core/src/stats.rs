//! Per-lane statistics

use std::time::Duration;

/// Cheap running estimate of computation duration
///
/// Each update halves the weight of everything seen so far:
/// `average = (average + sample) / 2`. This is not an arithmetic mean.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunningAverage {
    value: Duration,
    samples: u64,
}

impl RunningAverage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds a new sample in and returns the updated estimate
    pub fn update(&mut self, sample: Duration) -> Duration {
        self.value = (self.value + sample) / 2;
        self.samples += 1;
        self.value
    }

    pub fn value(&self) -> Duration {
        self.value
    }

    /// Number of samples folded in so far
    pub fn samples(&self) -> u64 {
        self.samples
    }
}
