use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Tuning for the metric advice.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct AdviceConfig {
    /// Minimum time between two warnings about the same method failing to
    /// resolve to its concrete implementation. Suppressed warnings are counted
    /// and reported with the next one.
    #[serde(default = "default_resolve_warning_interval_ms")]
    pub resolve_warning_interval_ms: u64,
}

fn default_resolve_warning_interval_ms() -> u64 {
    60_000
}

impl AdviceConfig {
    pub fn resolve_warning_interval(&self) -> Duration {
        Duration::from_millis(self.resolve_warning_interval_ms)
    }
}

impl Default for AdviceConfig {
    fn default() -> Self {
        AdviceConfig {
            resolve_warning_interval_ms: default_resolve_warning_interval_ms(),
        }
    }
}
