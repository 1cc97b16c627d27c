//! Declarative metric directives and the methods that carry them.
//!
//! A [`Method`] pairs a callable's identity (declaring type and name) with the
//! [`DirectiveSet`] declared for it. Both are plain values built once, when the
//! callable is registered or wrapped, and read-only afterwards.

mod catalog;
mod directive;
mod failure;
mod method;

pub use catalog::MethodCatalog;
pub use directive::{DirectiveSet, ExceptionMetered, Metered, Timed, METERED_SUFFIX, TIMED_SUFFIX};
pub use failure::{AsFailure, BoxedError, FailureKind, TypedError};
pub use method::{Declaration, Method};
