use std::fmt;
use std::sync::atomic::AtomicU64;
use std::sync::{Arc, Mutex, PoisonError};

use metrics::{Counter, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit};
use metrics_util::registry::{Registry, Storage};
use tracing::{debug, warn};

use super::base::{MetricRegistry, RegistrySnapshot};
use crate::error::{InstrumentKind, RegistryError};
use crate::metrics::{Meter, Timer};

/// Backs `metrics` counters with [`Meter`]s and histograms with [`Timer`]s.
#[derive(Debug, Clone, Copy, Default)]
struct InstrumentStorage;

impl Storage<Key> for InstrumentStorage {
    type Counter = Arc<Meter>;
    // gauges are not an instrument kind here; the storage only exists to satisfy the registry
    type Gauge = Arc<AtomicU64>;
    type Histogram = Arc<Timer>;

    fn counter(&self, _: &Key) -> Self::Counter {
        Arc::new(Meter::new())
    }

    fn gauge(&self, _: &Key) -> Self::Gauge {
        Arc::new(AtomicU64::new(0))
    }

    fn histogram(&self, _: &Key) -> Self::Histogram {
        Arc::new(Timer::new())
    }
}

/// A process-local registry keeping every instrument in memory.
///
/// Instruments are stored in a `metrics-util` [`Registry`] keyed by name.
/// The registry also implements [`metrics::Recorder`], so `counter!` and
/// `histogram!` calls routed to it update the same meters and timers. Labels
/// on those keys are ignored.
pub struct InMemoryRegistry {
    instruments: Registry<Key, InstrumentStorage>,
    // held while creating, so the cross-kind check and the insert are one step
    creation: Mutex<()>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        InMemoryRegistry {
            instruments: Registry::new(InstrumentStorage),
            creation: Mutex::new(()),
        }
    }

    /// The kind already registered under `key`, if any.
    fn existing_kind(&self, key: &Key) -> Option<InstrumentKind> {
        if self.instruments.get_histogram(key).is_some() {
            Some(InstrumentKind::Timer)
        } else if self.instruments.get_counter(key).is_some() {
            Some(InstrumentKind::Meter)
        } else {
            None
        }
    }

    /// Runs `create` under the creation lock once `key` is known to be free
    /// or to hold `requested` already.
    fn create_checked<T>(
        &self,
        key: &Key,
        requested: InstrumentKind,
        create: impl FnOnce() -> T,
    ) -> Result<T, RegistryError> {
        let _creating = self.creation.lock().unwrap_or_else(PoisonError::into_inner);
        match self.existing_kind(key) {
            Some(existing) if existing != requested => Err(RegistryError::KindMismatch {
                name: key.name().to_string(),
                existing,
                requested,
            }),
            Some(_) => Ok(create()),
            None => {
                debug!(
                    event_name = "registry.instrument.created",
                    event_domain = "registry",
                    metric_name = key.name(),
                    metric_kind = %requested,
                    "Registered new instrument"
                );
                Ok(create())
            }
        }
    }
}

impl Default for InMemoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for InMemoryRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryRegistry")
            .field("names", &self.names())
            .finish()
    }
}

impl MetricRegistry for InMemoryRegistry {
    fn timer(&self, name: &str) -> Result<Arc<Timer>, RegistryError> {
        let key = Key::from_name(name.to_string());
        if let Some(timer) = self.instruments.get_histogram(&key) {
            return Ok(timer);
        }
        self.create_checked(&key, InstrumentKind::Timer, || {
            self.instruments
                .get_or_create_histogram(&key, |timer| timer.clone())
        })
    }

    fn meter(&self, name: &str) -> Result<Arc<Meter>, RegistryError> {
        let key = Key::from_name(name.to_string());
        if let Some(meter) = self.instruments.get_counter(&key) {
            return Ok(meter);
        }
        self.create_checked(&key, InstrumentKind::Meter, || {
            self.instruments
                .get_or_create_counter(&key, |meter| meter.clone())
        })
    }

    fn get_timer(&self, name: &str) -> Option<Arc<Timer>> {
        self.instruments
            .get_histogram(&Key::from_name(name.to_string()))
    }

    fn get_meter(&self, name: &str) -> Option<Arc<Meter>> {
        self.instruments
            .get_counter(&Key::from_name(name.to_string()))
    }

    fn remove(&self, name: &str) -> bool {
        let key = Key::from_name(name.to_string());
        self.instruments.delete_histogram(&key) || self.instruments.delete_counter(&key)
    }

    fn names(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.instruments
            .visit_histograms(|key, _| names.push(key.name().to_string()));
        self.instruments
            .visit_counters(|key, _| names.push(key.name().to_string()));
        names.sort();
        names
    }

    fn snapshot(&self) -> RegistrySnapshot {
        let mut snapshot = RegistrySnapshot::default();
        self.instruments.visit_histograms(|key, timer| {
            snapshot
                .timers
                .insert(key.name().to_string(), timer.snapshot());
        });
        self.instruments.visit_counters(|key, meter| {
            snapshot
                .meters
                .insert(key.name().to_string(), meter.snapshot());
        });
        snapshot
    }
}

impl Recorder for InMemoryRegistry {
    fn describe_counter(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

    fn describe_gauge(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

    fn describe_histogram(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

    fn register_counter(&self, key: &Key, _: &Metadata<'_>) -> Counter {
        match self.meter(key.name()) {
            Ok(meter) => meter.handle(),
            Err(e) => {
                warn!(
                    event_name = "registry.recorder.rejected",
                    event_domain = "registry",
                    metric_name = key.name(),
                    error = %e,
                    "Counter not recorded"
                );
                Counter::noop()
            }
        }
    }

    fn register_gauge(&self, _: &Key, _: &Metadata<'_>) -> Gauge {
        Gauge::noop()
    }

    fn register_histogram(&self, key: &Key, _: &Metadata<'_>) -> Histogram {
        match self.timer(key.name()) {
            Ok(timer) => timer.handle(),
            Err(e) => {
                warn!(
                    event_name = "registry.recorder.rejected",
                    event_domain = "registry",
                    metric_name = key.name(),
                    error = %e,
                    "Histogram not recorded"
                );
                Histogram::noop()
            }
        }
    }
}
