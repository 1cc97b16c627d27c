use std::future::Future;

use async_trait::async_trait;

use crate::directives::{Method, MethodCatalog};
use crate::error::ResolveError;

/// An intercepted invocation that has not run yet.
///
/// Implemented by whatever mechanism detects calls to instrumented methods.
///
/// `Error` is whatever the call fails with; [`MetricAdvice::around`] accepts
/// it when it is an error type or a boxed `dyn Error`.
///
/// [`MetricAdvice::around`]: super::MetricAdvice::around
pub trait JoinPoint {
    type Output;
    type Error;

    /// The method the call is statically bound to.
    fn method(&self) -> &Method;

    /// The implementing type's own method, for calls bound to a trait method.
    fn target_method(&self) -> Result<Method, ResolveError>;

    /// Runs the real call.
    fn proceed(self) -> Result<Self::Output, Self::Error>;
}

/// An intercepted async invocation that has not run yet.
#[async_trait]
pub trait AsyncJoinPoint: Send {
    type Output: Send;
    type Error: Send;

    fn method(&self) -> &Method;

    fn target_method(&self) -> Result<Method, ResolveError>;

    async fn proceed(self) -> Result<Self::Output, Self::Error>;
}

/// The concrete type behind a trait-bound call, and where to look it up.
#[derive(Debug, Clone, Copy)]
struct Target<'a> {
    catalog: &'a MethodCatalog,
    type_name: &'a str,
}

impl Target<'_> {
    fn resolve(target: Option<&Self>, method: &Method) -> Result<Method, ResolveError> {
        match target {
            Some(target) => target.catalog.resolve(target.type_name, method.name()),
            None => Err(ResolveError::NotFound {
                target_type: "<unknown>".to_string(),
                method: method.name().to_string(),
            }),
        }
    }
}

/// A [`JoinPoint`] over a closure.
pub struct CallJoinPoint<'a, F> {
    method: Method,
    target: Option<Target<'a>>,
    call: F,
}

impl<'a, F> CallJoinPoint<'a, F> {
    pub fn new(method: Method, call: F) -> Self {
        CallJoinPoint {
            method,
            target: None,
            call,
        }
    }

    /// The call is dispatched to `type_name`, whose methods are in `catalog`.
    pub fn with_target(mut self, catalog: &'a MethodCatalog, type_name: &'a str) -> Self {
        self.target = Some(Target { catalog, type_name });
        self
    }
}

impl<'a, F, T, E> JoinPoint for CallJoinPoint<'a, F>
where
    F: FnOnce() -> Result<T, E>,
{
    type Output = T;
    type Error = E;

    fn method(&self) -> &Method {
        &self.method
    }

    fn target_method(&self) -> Result<Method, ResolveError> {
        Target::resolve(self.target.as_ref(), &self.method)
    }

    fn proceed(self) -> Result<T, E> {
        (self.call)()
    }
}

/// An [`AsyncJoinPoint`] over a future.
pub struct AsyncCallJoinPoint<'a, Fut> {
    method: Method,
    target: Option<Target<'a>>,
    future: Fut,
}

impl<'a, Fut> AsyncCallJoinPoint<'a, Fut> {
    pub fn new(method: Method, future: Fut) -> Self {
        AsyncCallJoinPoint {
            method,
            target: None,
            future,
        }
    }

    pub fn with_target(mut self, catalog: &'a MethodCatalog, type_name: &'a str) -> Self {
        self.target = Some(Target { catalog, type_name });
        self
    }
}

#[async_trait]
impl<'a, Fut, T, E> AsyncJoinPoint for AsyncCallJoinPoint<'a, Fut>
where
    Fut: Future<Output = Result<T, E>> + Send,
    T: Send + 'static,
    E: Send + 'static,
{
    type Output = T;
    type Error = E;

    fn method(&self) -> &Method {
        &self.method
    }

    fn target_method(&self) -> Result<Method, ResolveError> {
        Target::resolve(self.target.as_ref(), &self.method)
    }

    async fn proceed(self) -> Result<T, E> {
        self.future.await
    }
}
