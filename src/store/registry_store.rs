use std::sync::{Arc, OnceLock};

use tracing::{error, info};

use crate::error::ConfigError;
use crate::registry::MetricRegistry;

static GLOBAL: RegistryStore = RegistryStore::new();

/// Holds the metric registry used by the advice.
///
/// The registry can be set once and never replaced or removed. It must be set
/// before any instrumented call runs.
#[derive(Default)]
pub struct RegistryStore {
    registry: OnceLock<Arc<dyn MetricRegistry>>,
}

impl RegistryStore {
    pub const fn new() -> Self {
        RegistryStore {
            registry: OnceLock::new(),
        }
    }

    /// The process-wide store.
    pub fn global() -> &'static RegistryStore {
        &GLOBAL
    }

    /// Installs the registry. Fails if one was already installed, in which
    /// case the stored registry is left untouched.
    pub fn set(&self, registry: Arc<dyn MetricRegistry>) -> Result<(), ConfigError> {
        match self.registry.set(registry) {
            Ok(()) => {
                info!(
                    event_name = "store.registry.set",
                    event_domain = "store",
                    "Metric registry installed"
                );
                Ok(())
            }
            Err(_) => {
                error!(
                    event_name = "store.registry.set_twice",
                    event_domain = "store",
                    "Metric registry can only be set once"
                );
                Err(ConfigError::RegistryAlreadySet)
            }
        }
    }

    /// Returns the installed registry, or an error if `set` was never called.
    pub fn get(&self) -> Result<Arc<dyn MetricRegistry>, ConfigError> {
        self.registry
            .get()
            .cloned()
            .ok_or(ConfigError::RegistryNotSet)
    }

    pub fn is_set(&self) -> bool {
        self.registry.get().is_some()
    }
}

impl std::fmt::Debug for RegistryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryStore")
            .field("is_set", &self.is_set())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::InMemoryRegistry;
    use std::sync::Barrier;
    use std::thread;

    #[test]
    fn test_get_before_set_fails() {
        let store = RegistryStore::new();
        assert_eq!(store.get().err(), Some(ConfigError::RegistryNotSet));
        assert!(!store.is_set());
    }

    #[test]
    fn test_set_then_get_returns_same_registry() {
        let store = RegistryStore::new();
        let registry: Arc<dyn MetricRegistry> = Arc::new(InMemoryRegistry::new());
        store.set(registry.clone()).unwrap();

        let stored = store.get().unwrap();
        assert!(Arc::ptr_eq(&stored, &registry));
    }

    /// A second `set` fails and keeps the first registry in place.
    #[test]
    fn test_second_set_fails_without_replacing() {
        let store = RegistryStore::new();
        let first: Arc<dyn MetricRegistry> = Arc::new(InMemoryRegistry::new());
        let second: Arc<dyn MetricRegistry> = Arc::new(InMemoryRegistry::new());

        store.set(first.clone()).unwrap();
        assert_eq!(store.set(second), Err(ConfigError::RegistryAlreadySet));
        assert!(Arc::ptr_eq(&store.get().unwrap(), &first));
    }

    #[test]
    fn test_concurrent_set_has_one_winner() {
        let store = Arc::new(RegistryStore::new());
        let barrier = Arc::new(Barrier::new(8));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    store.set(Arc::new(InMemoryRegistry::new())).is_ok()
                })
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
        assert!(store.is_set());
    }
}
