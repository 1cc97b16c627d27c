pub mod base;
pub mod memory_registry;

// Re-export the primary registry items so code outside can do
// "use crate::registry::{MetricRegistry, InMemoryRegistry};"
pub use base::{name, MetricRegistry, RegistrySnapshot};
pub use memory_registry::InMemoryRegistry;
