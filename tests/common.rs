#![allow(dead_code)]

use std::sync::Arc;

use callmetrics::advice::{CallJoinPoint, MetricAdvice};
use callmetrics::directives::{ExceptionMetered, FailureKind, Metered, Method, Timed};
use callmetrics::registry::InMemoryRegistry;
use thiserror::Error;

pub const TIMED: &str = "timed";
pub const METERED: &str = "metered";
pub const EXCEPTION_METERED: &str = "exceptionmetered";
pub const ALL_TIMED: &str = "all.timed";
pub const ALL_METERED: &str = "all.metered";
pub const ALL_EXCEPTION_METERED: &str = "all.exceptionmetered";

pub const EVERY_NAME: [&str; 6] = [
    TIMED,
    METERED,
    EXCEPTION_METERED,
    ALL_TIMED,
    ALL_METERED,
    ALL_EXCEPTION_METERED,
];

#[derive(Debug, Error, PartialEq, Eq)]
#[error("burp")]
pub struct Burp;

#[derive(Debug, Error)]
#[error("call failed")]
pub struct Wrapped(#[source] pub Burp);

#[derive(Debug, Error)]
#[error("unrelated failure")]
pub struct Unrelated;

pub fn fresh_advice() -> (Arc<InMemoryRegistry>, MetricAdvice) {
    let registry = Arc::new(InMemoryRegistry::new());
    let advice = MetricAdvice::new(registry.clone());
    (registry, advice)
}

/// A service whose methods each carry a different mix of directives.
pub struct Metriced {
    advice: MetricAdvice,
}

impl Metriced {
    pub fn new(advice: MetricAdvice) -> Self {
        Metriced { advice }
    }

    pub fn all_the_metrics_method() -> Method {
        Method::of::<Metriced>("all_the_metrics")
            .timed(Timed::named(ALL_TIMED).absolute())
            .metered(Metered::named(ALL_METERED).absolute())
            .exception_metered(ExceptionMetered::named(ALL_EXCEPTION_METERED).absolute())
    }

    pub fn timed_method() -> Method {
        Method::of::<Metriced>("timed").timed(Timed::named(TIMED).absolute())
    }

    pub fn metered_method() -> Method {
        Method::of::<Metriced>("metered").metered(Metered::named(METERED).absolute())
    }

    pub fn exception_metered_method() -> Method {
        Method::of::<Metriced>("exception_metered").exception_metered(
            ExceptionMetered::named(EXCEPTION_METERED)
                .absolute()
                .cause(FailureKind::of::<Burp>()),
        )
    }

    pub fn all_the_metrics(&self) -> Result<(), Burp> {
        self.run(Self::all_the_metrics_method(), || Err(Burp))
    }

    pub fn timed(&self) -> Result<(), Burp> {
        self.run(Self::timed_method(), || Ok(()))
    }

    pub fn metered(&self, fail: bool) -> Result<(), Burp> {
        self.run(Self::metered_method(), || if fail { Err(Burp) } else { Ok(()) })
    }

    pub fn exception_metered(&self, fail: bool) -> Result<(), Burp> {
        self.run(Self::exception_metered_method(), || {
            if fail {
                Err(Burp)
            } else {
                Ok(())
            }
        })
    }

    fn run<F>(&self, method: Method, call: F) -> Result<(), Burp>
    where
        F: FnOnce() -> Result<(), Burp>,
    {
        self.advice
            .around(CallJoinPoint::new(method, call))
            .expect("instruments should resolve")
    }
}
