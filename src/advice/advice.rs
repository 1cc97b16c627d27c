use std::sync::Arc;

use tracing::warn;

use super::instrumented::{ExceptionMeter, Instrumented};
use super::join_point::{AsyncJoinPoint, JoinPoint};
use crate::config::AdviceConfig;
use crate::directives::{AsFailure, Method, METERED_SUFFIX, TIMED_SUFFIX};
use crate::error::{AdviceError, ConfigError, ResolveError};
use crate::registry::{name, MetricRegistry};
use crate::store::RegistryStore;
use crate::utils::log_throttle::LogThrottle;

/// Around advice for any method carrying metric directives.
#[derive(Clone)]
pub struct MetricAdvice {
    registry: Arc<dyn MetricRegistry>,
    resolve_warnings: Arc<LogThrottle>,
}

impl MetricAdvice {
    pub fn new(registry: Arc<dyn MetricRegistry>) -> Self {
        MetricAdvice::with_config(registry, &AdviceConfig::default())
    }

    pub fn with_config(registry: Arc<dyn MetricRegistry>, config: &AdviceConfig) -> Self {
        MetricAdvice {
            registry,
            resolve_warnings: Arc::new(LogThrottle::new(config.resolve_warning_interval())),
        }
    }

    /// Builds the advice over the registry held by `store`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::RegistryNotSet`] if the store is still empty.
    pub fn from_store(store: &RegistryStore, config: &AdviceConfig) -> Result<Self, ConfigError> {
        Ok(MetricAdvice::with_config(store.get()?, config))
    }

    /// Builds the advice over the process-wide [`RegistryStore`].
    pub fn global(config: &AdviceConfig) -> Result<Self, ConfigError> {
        MetricAdvice::from_store(RegistryStore::global(), config)
    }

    pub fn registry(&self) -> &Arc<dyn MetricRegistry> {
        &self.registry
    }

    /// Resolves, creating them on first use, the instruments requested by
    /// `method`'s directives: its rate meter, then its exception meter, then
    /// its timer. Kinds without a directive are left out.
    pub fn instrument(&self, method: &Method) -> Result<Instrumented, AdviceError> {
        let directives = method.directives();

        let meter = match &directives.metered {
            Some(metered) => Some(self.registry.meter(&choose_name(
                metered.name.as_deref(),
                metered.absolute,
                method,
                &[METERED_SUFFIX],
            ))?),
            None => None,
        };

        let exception_meter = match &directives.exception_metered {
            Some(exception_metered) => {
                let meter = self.registry.meter(&choose_name(
                    exception_metered.name.as_deref(),
                    exception_metered.absolute,
                    method,
                    &[exception_metered.cause.simple_name()],
                ))?;
                Some(ExceptionMeter::new(meter, exception_metered.cause))
            }
            None => None,
        };

        let timer = match &directives.timed {
            Some(timed) => Some(self.registry.timer(&choose_name(
                timed.name.as_deref(),
                timed.absolute,
                method,
                &[TIMED_SUFFIX],
            ))?),
            None => None,
        };

        Ok(Instrumented::new(
            method.qualified_name(),
            meter,
            exception_meter,
            timer,
        ))
    }

    /// Runs an intercepted invocation inside its method's instruments.
    ///
    /// The outer `Result` fails only if instruments could not be resolved, in
    /// which case the invocation never ran. The inner `Result` is exactly what
    /// [`JoinPoint::proceed`] returned.
    ///
    /// All instruments are resolved before any is touched: the rate meter is
    /// only marked once the exception meter and timer resolved too, so a
    /// failed resolution leaves every count unchanged.
    pub fn around<J, M>(&self, join_point: J) -> Result<Result<J::Output, J::Error>, AdviceError>
    where
        J: JoinPoint,
        J::Error: AsFailure<M>,
    {
        let method = self.retrieve_method(join_point.method(), || join_point.target_method());
        let instrumented = self.instrument(&method)?;
        Ok(instrumented.call(|| join_point.proceed()))
    }

    /// Async form of [`MetricAdvice::around`].
    pub async fn around_async<J, M>(
        &self,
        join_point: J,
    ) -> Result<Result<J::Output, J::Error>, AdviceError>
    where
        J: AsyncJoinPoint,
        J::Error: AsFailure<M>,
    {
        let method = self.retrieve_method(join_point.method(), || join_point.target_method());
        let instrumented = self.instrument(&method)?;
        Ok(instrumented.call_async(join_point.proceed()).await)
    }

    /// Directives of a trait-declared method live on the implementing type's
    /// method, so look that up. If it cannot be found, carry on with the
    /// trait method's own directives.
    fn retrieve_method(
        &self,
        method: &Method,
        resolve: impl FnOnce() -> Result<Method, ResolveError>,
    ) -> Method {
        if !method.is_trait_declared() {
            return method.clone();
        }

        match resolve() {
            Ok(concrete) => concrete,
            Err(e) => {
                let method_name = method.qualified_name();
                if let Some(suppressed_count) = self.resolve_warnings.should_emit(&method_name) {
                    warn!(
                        event_name = "advice.resolve.failed",
                        event_domain = "advice",
                        method_name = method_name.as_str(),
                        suppressed_count,
                        error = %e,
                        "Could not retrieve method for metric interrogation"
                    );
                }
                method.clone()
            }
        }
    }
}

impl std::fmt::Debug for MetricAdvice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricAdvice").finish_non_exhaustive()
    }
}

/// Picks an instrument name.
///
/// - explicit and absolute: `explicit` verbatim;
/// - explicit: `declaring_type.explicit`;
/// - otherwise: `declaring_type.method.suffixes...`.
///
/// An empty explicit name counts as absent.
pub fn choose_name(
    explicit: Option<&str>,
    absolute: bool,
    method: &Method,
    suffixes: &[&str],
) -> String {
    match explicit.filter(|n| !n.is_empty()) {
        Some(explicit) if absolute => explicit.to_string(),
        Some(explicit) => name(method.declaring_type(), [explicit]),
        None => name(&method.qualified_name(), suffixes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directives::{ExceptionMetered, FailureKind, Metered, Timed};
    use crate::registry::InMemoryRegistry;

    fn method() -> Method {
        Method::new("shop.Inventory", "restock")
    }

    #[test]
    fn test_choose_name_absolute_wins_verbatim() {
        assert_eq!(
            choose_name(Some("all.timed"), true, &method(), &["timed"]),
            "all.timed"
        );
    }

    #[test]
    fn test_choose_name_relative_is_scoped_to_type() {
        assert_eq!(
            choose_name(Some("latency"), false, &method(), &["timed"]),
            "shop.Inventory.latency"
        );
    }

    #[test]
    fn test_choose_name_default_uses_method_and_suffix() {
        assert_eq!(
            choose_name(None, false, &method(), &["timed"]),
            "shop.Inventory.restock.timed"
        );
        assert_eq!(
            choose_name(Some(""), true, &method(), &["metered"]),
            "shop.Inventory.restock.metered"
        );
        assert_eq!(
            choose_name(None, false, &method(), &["a", "b"]),
            "shop.Inventory.restock.a.b"
        );
    }

    #[test]
    fn test_choose_name_is_deterministic() {
        let first = choose_name(None, false, &method(), &["timed"]);
        for _ in 0..10 {
            assert_eq!(choose_name(None, false, &method(), &["timed"]), first);
        }
    }

    #[test]
    fn test_from_empty_store_fails() {
        let store = RegistryStore::new();
        let err = MetricAdvice::from_store(&store, &AdviceConfig::default()).unwrap_err();
        assert_eq!(err, ConfigError::RegistryNotSet);
    }

    #[test]
    fn test_instrument_only_creates_declared_kinds() {
        let registry = Arc::new(InMemoryRegistry::new());
        let advice = MetricAdvice::new(registry.clone());
        let instrumented = advice
            .instrument(&method().metered(Metered::new()))
            .unwrap();

        assert!(instrumented.meter().is_some());
        assert!(instrumented.timer().is_none());
        assert!(instrumented.exception_meter().is_none());
        assert_eq!(registry.names(), vec!["shop.Inventory.restock.metered"]);
    }

    #[test]
    fn test_exception_meter_defaults_to_cause_simple_name() {
        let registry = Arc::new(InMemoryRegistry::new());
        let advice = MetricAdvice::new(registry.clone());
        advice
            .instrument(&method().exception_metered(
                ExceptionMetered::new().cause(FailureKind::of::<std::io::Error>()),
            ))
            .unwrap();

        assert_eq!(registry.names(), vec!["shop.Inventory.restock.Error"]);
    }

    #[test]
    fn test_name_clash_between_kinds_is_an_error() {
        let registry = Arc::new(InMemoryRegistry::new());
        let advice = MetricAdvice::new(registry);
        let clash = method()
            .metered(Metered::named("shared").absolute())
            .timed(Timed::named("shared").absolute());

        assert!(matches!(
            advice.instrument(&clash),
            Err(AdviceError::Registry(_))
        ));
    }
}
