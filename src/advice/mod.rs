//! Around-invocation metric advice.
//!
//! [`MetricAdvice`] turns a [`Method`](crate::directives::Method)'s directives
//! into instruments and runs calls inside them. Calls reach it either through
//! explicit decoration ([`MetricAdvice::instrument`] then
//! [`Instrumented::call`]) or through a [`JoinPoint`] handed over by whatever
//! mechanism intercepts the call.

mod advice;
mod instrumented;
mod join_point;

pub use advice::{choose_name, MetricAdvice};
pub use instrumented::{ExceptionMeter, Instrumented};
pub use join_point::{AsyncCallJoinPoint, AsyncJoinPoint, CallJoinPoint, JoinPoint};
