use std::error::Error;
use std::future::Future;
use std::sync::Arc;

use tracing::debug;

use crate::directives::{AsFailure, FailureKind};
use crate::metrics::{Meter, Timer, TimerContext};

/// A meter paired with the failure kind it counts.
#[derive(Debug, Clone)]
pub struct ExceptionMeter {
    meter: Arc<Meter>,
    cause: FailureKind,
}

impl ExceptionMeter {
    pub fn new(meter: Arc<Meter>, cause: FailureKind) -> Self {
        ExceptionMeter { meter, cause }
    }

    pub fn meter(&self) -> &Arc<Meter> {
        &self.meter
    }

    pub fn cause(&self) -> FailureKind {
        self.cause
    }

    /// Marks the meter if `failure` or its immediate source matches the
    /// cause. Returns whether it was marked.
    pub fn observe(&self, failure: &(dyn Error + 'static)) -> bool {
        if self.cause.matches_or_cause(failure) {
            self.meter.mark();
            true
        } else {
            false
        }
    }
}

/// The instruments resolved for one method, ready to wrap its invocations.
///
/// Cheap to clone; clones share the same instruments.
#[derive(Debug, Clone)]
pub struct Instrumented {
    method: String,
    meter: Option<Arc<Meter>>,
    exception_meter: Option<ExceptionMeter>,
    timer: Option<Arc<Timer>>,
}

impl Instrumented {
    pub(crate) fn new(
        method: String,
        meter: Option<Arc<Meter>>,
        exception_meter: Option<ExceptionMeter>,
        timer: Option<Arc<Timer>>,
    ) -> Self {
        Instrumented {
            method,
            meter,
            exception_meter,
            timer,
        }
    }

    /// Qualified name of the instrumented method.
    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn meter(&self) -> Option<&Arc<Meter>> {
        self.meter.as_ref()
    }

    pub fn exception_meter(&self) -> Option<&ExceptionMeter> {
        self.exception_meter.as_ref()
    }

    pub fn timer(&self) -> Option<&Arc<Timer>> {
        self.timer.as_ref()
    }

    /// Runs `f` inside the method's instruments and returns its result
    /// unchanged.
    ///
    /// The rate meter is marked and the timer started before `f` runs. A
    /// failure is offered to the exception meter. The timer is stopped once
    /// `f` has finished, also when `f` panics.
    ///
    /// `E` is any error type, or a boxed `dyn Error`; see [`AsFailure`].
    pub fn call<T, E, M, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: AsFailure<M>,
    {
        let timer_ctx = self.enter();
        let result = f();
        self.observe(&result);
        if let Some(ctx) = timer_ctx {
            ctx.stop();
        }
        result
    }

    /// Async form of [`Instrumented::call`]. Entry happens on first poll.
    ///
    /// If the returned future is dropped before `future` completes, the timer
    /// still records the time spent until then.
    pub async fn call_async<T, E, M, Fut>(&self, future: Fut) -> Result<T, E>
    where
        Fut: Future<Output = Result<T, E>>,
        E: AsFailure<M>,
    {
        let timer_ctx = self.enter();
        let result = future.await;
        self.observe(&result);
        if let Some(ctx) = timer_ctx {
            ctx.stop();
        }
        result
    }

    /// Decorates `f`: the returned closure has `f`'s signature and runs every
    /// call through [`Instrumented::call`].
    pub fn wrap<A, T, E, M, F>(self, f: F) -> impl Fn(A) -> Result<T, E>
    where
        F: Fn(A) -> Result<T, E>,
        E: AsFailure<M>,
    {
        move |args| self.call(|| f(args))
    }

    fn enter(&self) -> Option<TimerContext> {
        if let Some(meter) = &self.meter {
            meter.mark();
        }
        self.timer.as_ref().map(|timer| timer.time())
    }

    fn observe<T, E: AsFailure<M>, M>(&self, result: &Result<T, E>) {
        let (Err(failure), Some(exception_meter)) = (result, &self.exception_meter) else {
            return;
        };
        if exception_meter.observe(failure.as_failure()) {
            debug!(
                event_name = "advice.failure.metered",
                event_domain = "advice",
                method_name = self.method.as_str(),
                cause = exception_meter.cause().name(),
                "Counted failure"
            );
        }
    }
}
