use std::path::Path;

use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

use super::advice::AdviceConfig;
use super::logging::LoggingConfig;

/// Prefix of environment variables overriding file settings, e.g.
/// `CALLMETRICS_LOGGING__LEVEL=debug`.
pub const ENV_PREFIX: &str = "CALLMETRICS_";

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1.0.0")]
    ConfigV1(ConfigV1),
}

/// Main config for v1.0.0.
#[derive(Deserialize, Serialize, Debug, Clone, Default, JsonSchema)]
pub struct ConfigV1 {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub advice: AdviceConfig,
    #[serde(default)]
    pub workload: WorkloadConfig,
}

/// The sample workload run by the `callmetrics` binary.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct WorkloadConfig {
    #[serde(default = "default_iterations")]
    pub iterations: u32,
}

fn default_iterations() -> u32 {
    10
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        WorkloadConfig {
            iterations: default_iterations(),
        }
    }
}

fn extract(figment: Figment) -> Result<ConfigV1, figment::Error> {
    match figment.extract::<Config>()? {
        Config::ConfigV1(c) => Ok(c),
    }
    // handle configuration migration between versions here when necessary
}

/// Load config from a YAML file, with `CALLMETRICS_` environment overrides.
pub fn load_config(path: impl AsRef<Path>) -> Result<ConfigV1, figment::Error> {
    extract(
        Figment::new()
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__")),
    )
}

/// Load config from an in-memory YAML document. No environment overrides.
pub fn load_config_str(yaml: &str) -> Result<ConfigV1, figment::Error> {
    extract(Figment::new().merge(Yaml::string(yaml)))
}

/// The JSON schema of the configuration, pretty printed.
pub fn config_schema() -> Result<String, serde_json::Error> {
    let schema = schema_for!(Config);
    serde_json::to_string_pretty(&schema)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = load_config_str("version: \"1.0.0\"\n").unwrap();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "console");
        assert_eq!(config.advice.resolve_warning_interval_ms, 60_000);
        assert_eq!(config.workload.iterations, 10);
    }

    #[test]
    fn test_unknown_version_is_rejected() {
        assert!(load_config_str("version: \"9.9.9\"\n").is_err());
    }

    #[test]
    fn test_schema_mentions_sections() {
        let schema = config_schema().unwrap();
        assert!(schema.contains("resolve_warning_interval_ms"));
        assert!(schema.contains("logging"));
    }
}
