//! Occurrence meter.

use metrics::{Counter, CounterFn};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Counts occurrences of an event since the meter was created.
///
/// The count lives in the same atomic storage `metrics` uses for its
/// counters, and a meter can be handed to `metrics` code as a [`Counter`].
#[derive(Debug)]
pub struct Meter {
    count: AtomicU64,
    created_at: Instant,
}

/// Point-in-time view of a [`Meter`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeterSnapshot {
    pub count: u64,
    /// Events per second since creation.
    pub mean_rate: f64,
}

impl Meter {
    pub fn new() -> Self {
        Meter {
            count: AtomicU64::new(0),
            created_at: Instant::now(),
        }
    }

    /// Records a single occurrence.
    pub fn mark(&self) {
        self.mark_n(1);
    }

    /// Records `n` occurrences at once.
    pub fn mark_n(&self, n: u64) {
        CounterFn::increment(&self.count, n);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Acquire)
    }

    /// Mean number of occurrences per second over the meter's lifetime.
    pub fn mean_rate(&self) -> f64 {
        let count = self.count();
        if count == 0 {
            return 0.0;
        }
        let elapsed = self.created_at.elapsed().as_secs_f64();
        if elapsed <= 0.0 {
            return 0.0;
        }
        count as f64 / elapsed
    }

    pub fn snapshot(&self) -> MeterSnapshot {
        MeterSnapshot {
            count: self.count(),
            mean_rate: self.mean_rate(),
        }
    }

    /// A `metrics` handle that marks this meter.
    pub fn handle(self: &Arc<Self>) -> Counter {
        Counter::from_arc(Arc::clone(self))
    }
}

impl Default for Meter {
    fn default() -> Self {
        Self::new()
    }
}

impl CounterFn for Meter {
    fn increment(&self, value: u64) {
        self.mark_n(value);
    }

    fn absolute(&self, value: u64) {
        CounterFn::absolute(&self.count, value);
    }
}
