//! Declarative runtime metrics for method invocations.
//!
//! Methods declare timing, rate and failure-rate directives once; the
//! [`MetricAdvice`](advice::MetricAdvice) resolves the matching instruments in a
//! shared [`MetricRegistry`](registry::MetricRegistry) and updates them around
//! every call, without the called code touching any metrics API.

pub mod advice;
pub mod config;
pub mod directives;
pub mod error;
pub mod metrics;
pub mod registry;
pub mod store;
pub mod utils;

pub use advice::{choose_name, Instrumented, JoinPoint, MetricAdvice};
pub use directives::{DirectiveSet, ExceptionMetered, FailureKind, Metered, Method, Timed};
pub use error::{AdviceError, ConfigError, RegistryError, ResolveError};
pub use registry::{InMemoryRegistry, MetricRegistry};
pub use store::RegistryStore;
