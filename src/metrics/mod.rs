//! Timer and meter instruments.
//!
//! Both are `metrics` sinks: a [`Meter`] is a `CounterFn`, a [`Timer`] a
//! `HistogramFn`. Instruments live behind an `Arc`, so a registry can hand the
//! same instance to any number of concurrent invocations.

mod meter;
mod timer;

pub use meter::{Meter, MeterSnapshot};
pub use timer::{Timer, TimerContext, TimerSnapshot};
