//! Latency timer and its running context.

use metrics::{Histogram, HistogramFn};
use metrics_util::AtomicBucket;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Keeps every measured duration, in seconds, in a lock-free bucket.
///
/// Samples are retained for the timer's lifetime; a [`TimerSnapshot`] is
/// computed from them on demand.
pub struct Timer {
    samples: AtomicBucket<f64>,
}

/// Point-in-time view of a [`Timer`]. All durations are in nanoseconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimerSnapshot {
    pub count: u64,
    pub total_nanos: u64,
    pub min_nanos: u64,
    pub max_nanos: u64,
    pub mean_nanos: u64,
}

impl Timer {
    pub fn new() -> Self {
        Timer {
            samples: AtomicBucket::new(),
        }
    }

    /// Starts timing. The elapsed time is recorded when the returned context
    /// is stopped or dropped, whichever comes first.
    pub fn time(self: &Arc<Self>) -> TimerContext {
        TimerContext {
            timer: Arc::clone(self),
            started_at: Instant::now(),
            stopped: false,
        }
    }

    /// Records one measured duration.
    pub fn update(&self, duration: Duration) {
        self.samples.push(duration.as_secs_f64());
    }

    pub fn count(&self) -> u64 {
        let mut count = 0;
        self.samples.data_with(|block| count += block.len() as u64);
        count
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        let mut count = 0u64;
        let mut total = 0.0f64;
        let mut min = f64::MAX;
        let mut max = 0.0f64;
        self.samples.data_with(|block| {
            for &secs in block {
                count += 1;
                total += secs;
                min = min.min(secs);
                max = max.max(secs);
            }
        });

        if count == 0 {
            return TimerSnapshot {
                count: 0,
                total_nanos: 0,
                min_nanos: 0,
                max_nanos: 0,
                mean_nanos: 0,
            };
        }
        let total_nanos = to_nanos(total);
        TimerSnapshot {
            count,
            total_nanos,
            min_nanos: to_nanos(min),
            max_nanos: to_nanos(max),
            mean_nanos: total_nanos / count,
        }
    }

    /// A `metrics` handle that records into this timer. Values are seconds.
    pub fn handle(self: &Arc<Self>) -> Histogram {
        Histogram::from_arc(Arc::clone(self))
    }
}

fn to_nanos(secs: f64) -> u64 {
    // `as` saturates, so negative samples read as zero
    (secs * 1e9).round() as u64
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl HistogramFn for Timer {
    fn record(&self, value: f64) {
        self.samples.push(value);
    }
}

impl fmt::Debug for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timer")
            .field("count", &self.count())
            .finish()
    }
}

/// A running measurement on a [`Timer`].
///
/// The measurement is recorded exactly once: by [`TimerContext::stop`], or by
/// `Drop` if the context goes out of scope first (early return, unwinding,
/// a cancelled future).
#[must_use = "dropping the context immediately records a near-zero duration"]
#[derive(Debug)]
pub struct TimerContext {
    timer: Arc<Timer>,
    started_at: Instant,
    stopped: bool,
}

impl TimerContext {
    /// Stops the measurement and returns the elapsed time.
    pub fn stop(mut self) -> Duration {
        self.record()
    }

    fn record(&mut self) -> Duration {
        let elapsed = self.started_at.elapsed();
        if !self.stopped {
            self.stopped = true;
            self.timer.update(elapsed);
        }
        elapsed
    }
}

impl Drop for TimerContext {
    fn drop(&mut self) {
        if !self.stopped {
            self.record();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic;
    use std::thread::sleep;

    #[test]
    fn test_update_tracks_bounds() {
        let timer = Timer::new();
        timer.update(Duration::from_millis(10));
        timer.update(Duration::from_millis(30));

        let snapshot = timer.snapshot();
        assert_eq!(snapshot.count, 2);
        assert_eq!(snapshot.min_nanos, 10_000_000);
        assert_eq!(snapshot.max_nanos, 30_000_000);
        assert_eq!(snapshot.mean_nanos, 20_000_000);
    }

    #[test]
    fn test_empty_snapshot_is_zeroed() {
        let snapshot = Timer::new().snapshot();
        assert_eq!(snapshot.count, 0);
        assert_eq!(snapshot.min_nanos, 0);
    }

    #[test]
    fn test_histogram_handle_records_seconds() {
        let timer = Arc::new(Timer::new());
        timer.handle().record(0.5);

        let snapshot = timer.snapshot();
        assert_eq!(snapshot.count, 1);
        assert_eq!(snapshot.max_nanos, 500_000_000);
    }

    #[test]
    fn test_stop_records_once() {
        let timer = Arc::new(Timer::new());
        let ctx = timer.time();
        sleep(Duration::from_millis(5));
        let elapsed = ctx.stop();

        assert!(elapsed >= Duration::from_millis(5));
        assert_eq!(timer.count(), 1);
    }

    #[test]
    fn test_drop_records_when_not_stopped() {
        let timer = Arc::new(Timer::new());
        {
            let _ctx = timer.time();
        }
        assert_eq!(timer.count(), 1);
    }

    /// A panic while the context is live still records the measurement.
    #[test]
    fn test_unwinding_records_once() {
        let timer = Arc::new(Timer::new());
        let inner = timer.clone();
        let result = panic::catch_unwind(panic::AssertUnwindSafe(move || {
            let _ctx = inner.time();
            panic!("boom");
        }));

        assert!(result.is_err());
        assert_eq!(timer.count(), 1);
    }
}
