//! Error types shared by the store, registry and advice layers.

use thiserror::Error;

/// Startup-ordering mistakes around the registry holder.
///
/// These are never expected at runtime; seeing one means the registry was
/// not installed before instrumented code ran, or was installed twice.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("metric registry was never set")]
    RegistryNotSet,

    #[error("metric registry can only be set once")]
    RegistryAlreadySet,
}

/// The kind of instrument bound to a registry name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstrumentKind {
    Timer,
    Meter,
}

impl std::fmt::Display for InstrumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InstrumentKind::Timer => f.write_str("timer"),
            InstrumentKind::Meter => f.write_str("meter"),
        }
    }
}

/// Errors raised by a registry while resolving an instrument.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("'{name}' is already registered as a {existing}, cannot use it as a {requested}")]
    KindMismatch {
        name: String,
        existing: InstrumentKind,
        requested: InstrumentKind,
    },
}

/// Anything that stops the advice before the wrapped call is allowed to run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdviceError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Failure to find the concrete implementation behind a trait-declared method.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("no method '{method}' registered for type '{target_type}'")]
    NotFound { target_type: String, method: String },

    #[error("lookup of method '{method}' denied: {reason}")]
    Denied { method: String, reason: String },
}
