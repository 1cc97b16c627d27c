use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::error::RegistryError;
use crate::metrics::{Meter, MeterSnapshot, Timer, TimerSnapshot};

/// Every instrument in a registry, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RegistrySnapshot {
    pub timers: BTreeMap<String, TimerSnapshot>,
    pub meters: BTreeMap<String, MeterSnapshot>,
}

/// The MetricRegistry trait abstracts name-addressed instrument storage.
///
/// `timer` and `meter` are get-or-create: the first call for a name creates the
/// instrument, every later call returns the same instance. Implementations must
/// keep that true when several threads race on the first access to a name.
/// Names share one namespace, so a name holding a timer cannot be used for a
/// meter.
pub trait MetricRegistry: Send + Sync {
    fn timer(&self, name: &str) -> Result<Arc<Timer>, RegistryError>;
    fn meter(&self, name: &str) -> Result<Arc<Meter>, RegistryError>;

    /// Looks up a timer without creating it.
    fn get_timer(&self, name: &str) -> Option<Arc<Timer>>;
    /// Looks up a meter without creating it.
    fn get_meter(&self, name: &str) -> Option<Arc<Meter>>;

    /// Unregisters whatever is bound to `name`. Returns whether anything was removed.
    fn remove(&self, name: &str) -> bool;

    /// All registered names, sorted.
    fn names(&self) -> Vec<String>;

    fn snapshot(&self) -> RegistrySnapshot;
}

/// Joins name segments with `.`, skipping empty ones.
///
/// `name("com.acme.Service", ["create", "timed"])` gives
/// `"com.acme.Service.create.timed"`.
pub fn name<I, S>(base: &str, parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::from(base);
    for part in parts {
        let part = part.as_ref();
        if part.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push('.');
        }
        out.push_str(part);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_joins_with_dots() {
        assert_eq!(name("a.B", ["m", "timed"]), "a.B.m.timed");
    }

    #[test]
    fn test_name_skips_empty_segments() {
        assert_eq!(name("a.B", ["", "m", ""]), "a.B.m");
        assert_eq!(name("", ["m", "timed"]), "m.timed");
        assert_eq!(name("a.B", Vec::<String>::new()), "a.B");
    }
}
