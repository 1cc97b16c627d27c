pub mod registry_store;

// Re-export the primary store item so code outside can do
// "use crate::store::RegistryStore;"
pub use registry_store::RegistryStore;
