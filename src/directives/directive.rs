use super::failure::FailureKind;

/// Suffix of derived timer names.
pub const TIMED_SUFFIX: &str = "timed";
/// Suffix of derived rate-meter names.
pub const METERED_SUFFIX: &str = "metered";

/// Requests a latency timer around every invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timed {
    /// Overrides the derived name.
    pub name: Option<String>,
    /// Use `name` verbatim instead of scoping it under the declaring type.
    pub absolute: bool,
}

impl Timed {
    pub fn new() -> Self {
        Timed::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Timed {
            name: Some(name.into()),
            absolute: false,
        }
    }

    pub fn absolute(mut self) -> Self {
        self.absolute = true;
        self
    }
}

/// Requests a meter marked on every invocation, whatever its outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metered {
    pub name: Option<String>,
    pub absolute: bool,
}

impl Metered {
    pub fn new() -> Self {
        Metered::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Metered {
            name: Some(name.into()),
            absolute: false,
        }
    }

    pub fn absolute(mut self) -> Self {
        self.absolute = true;
        self
    }
}

/// Requests a meter marked whenever an invocation fails with `cause`.
///
/// When unnamed, the meter's suffix is the simple name of `cause`.
#[derive(Debug, Clone, Default)]
pub struct ExceptionMetered {
    pub name: Option<String>,
    pub absolute: bool,
    pub cause: FailureKind,
}

impl ExceptionMetered {
    pub fn new() -> Self {
        ExceptionMetered::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        ExceptionMetered {
            name: Some(name.into()),
            ..ExceptionMetered::default()
        }
    }

    pub fn absolute(mut self) -> Self {
        self.absolute = true;
        self
    }

    pub fn cause(mut self, cause: FailureKind) -> Self {
        self.cause = cause;
        self
    }
}

/// The directives declared on one callable. Any subset may be present.
#[derive(Debug, Clone, Default)]
pub struct DirectiveSet {
    pub timed: Option<Timed>,
    pub metered: Option<Metered>,
    pub exception_metered: Option<ExceptionMetered>,
}

impl DirectiveSet {
    pub fn is_empty(&self) -> bool {
        self.timed.is_none() && self.metered.is_none() && self.exception_metered.is_none()
    }
}
