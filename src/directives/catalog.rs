use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use tracing::debug;

use super::method::Method;
use crate::error::ResolveError;

/// Concrete methods indexed by `(declaring type, method name)`.
///
/// Lets a join point for a trait-declared method find the implementing type's
/// own method, and with it that method's directives.
#[derive(Debug, Default)]
pub struct MethodCatalog {
    methods: RwLock<HashMap<(String, String), Method>>,
}

impl MethodCatalog {
    pub fn new() -> Self {
        MethodCatalog::default()
    }

    /// Adds `method`, returning the previous entry for the same type and name.
    pub fn register(&self, method: Method) -> Option<Method> {
        let key = (method.declaring_type().to_string(), method.name().to_string());
        debug!(
            event_name = "catalog.method.registered",
            event_domain = "catalog",
            declaring_type = key.0.as_str(),
            method_name = key.1.as_str(),
            "Registered method"
        );
        self.methods
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, method)
    }

    /// The method `method_name` as declared on `target_type`.
    pub fn resolve(&self, target_type: &str, method_name: &str) -> Result<Method, ResolveError> {
        self.methods
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(target_type.to_string(), method_name.to_string()))
            .cloned()
            .ok_or_else(|| ResolveError::NotFound {
                target_type: target_type.to_string(),
                method: method_name.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.methods
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directives::Timed;

    #[test]
    fn test_resolve_registered_method() {
        let catalog = MethodCatalog::new();
        catalog.register(Method::new("shop.SqlRepo", "find").timed(Timed::new()));

        let method = catalog.resolve("shop.SqlRepo", "find").unwrap();
        assert_eq!(method.qualified_name(), "shop.SqlRepo.find");
        assert!(method.directives().timed.is_some());
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_resolve_unknown_method_fails() {
        let catalog = MethodCatalog::new();
        catalog.register(Method::new("shop.SqlRepo", "find"));

        assert_eq!(
            catalog.resolve("shop.SqlRepo", "save").unwrap_err(),
            ResolveError::NotFound {
                target_type: "shop.SqlRepo".to_string(),
                method: "save".to_string(),
            }
        );
    }

    #[test]
    fn test_register_replaces_previous_entry() {
        let catalog = MethodCatalog::new();
        assert!(catalog.register(Method::new("a.B", "m")).is_none());
        assert!(catalog.register(Method::new("a.B", "m").timed(Timed::new())).is_some());
        assert_eq!(catalog.len(), 1);
    }
}
