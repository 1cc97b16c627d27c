use std::error::Error;
use std::fmt;

type Matcher = fn(&(dyn Error + 'static)) -> bool;

/// Describes which failures an exception-rate directive counts.
///
/// The Rust counterpart of "an exception class": either every failure, one
/// concrete error type, or a named predicate over `dyn Error`.
#[derive(Clone, Copy)]
pub struct FailureKind {
    name: &'static str,
    matcher: Matcher,
}

impl FailureKind {
    /// Matches every failure.
    pub fn any() -> Self {
        FailureKind {
            name: "Error",
            matcher: |_| true,
        }
    }

    /// Matches failures whose concrete type is `E`.
    pub fn of<E: Error + 'static>() -> Self {
        FailureKind {
            name: std::any::type_name::<E>(),
            matcher: |failure| failure.is::<E>(),
        }
    }

    /// Matches failures accepted by `matcher`, e.g. a single enum variant.
    pub fn custom(name: &'static str, matcher: Matcher) -> Self {
        FailureKind { name, matcher }
    }

    /// The full name, e.g. `std::io::error::Error`.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The last path segment without generics, e.g. `Error`.
    pub fn simple_name(&self) -> &'static str {
        let base = self.name.split('<').next().unwrap_or(self.name);
        base.rsplit("::").next().unwrap_or(base)
    }

    /// Does `failure` itself belong to this kind?
    pub fn matches(&self, failure: &(dyn Error + 'static)) -> bool {
        (self.matcher)(failure)
    }

    /// Does `failure`, or its immediate source, belong to this kind?
    ///
    /// Only one level of `source()` is inspected.
    pub fn matches_or_cause(&self, failure: &(dyn Error + 'static)) -> bool {
        self.matches(failure) || failure.source().is_some_and(|cause| self.matches(cause))
    }
}

/// Views a call's error value as a `dyn Error` so it can be classified.
///
/// The marker `M` only tells the impls apart and is always inferred:
/// [`TypedError`] for any concrete `E: Error`, [`BoxedError`] for boxed
/// `dyn Error` values, which do not implement `Error` themselves.
pub trait AsFailure<M> {
    fn as_failure(&self) -> &(dyn Error + 'static);
}

/// Marker for the [`AsFailure`] impl over concrete error types.
pub enum TypedError {}

/// Marker for the [`AsFailure`] impls over `Box<dyn Error ..>`.
pub enum BoxedError {}

impl<E: Error + 'static> AsFailure<TypedError> for E {
    fn as_failure(&self) -> &(dyn Error + 'static) {
        self
    }
}

impl AsFailure<BoxedError> for Box<dyn Error + Send + Sync> {
    fn as_failure(&self) -> &(dyn Error + 'static) {
        &**self
    }
}

impl AsFailure<BoxedError> for Box<dyn Error + Send> {
    fn as_failure(&self) -> &(dyn Error + 'static) {
        &**self
    }
}

impl AsFailure<BoxedError> for Box<dyn Error> {
    fn as_failure(&self) -> &(dyn Error + 'static) {
        &**self
    }
}

impl Default for FailureKind {
    fn default() -> Self {
        FailureKind::any()
    }
}

impl fmt::Debug for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FailureKind").field(&self.name).finish()
    }
}
