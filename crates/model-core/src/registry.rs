//! Process-wide class registry.
//!
//! Nested entity declarations and validator configuration refer to classes
//! by name. The registry maps each name to a factory producing an empty
//! instance. Entries are insert-only for the lifetime of the process.

use crate::error::ModelError;
use crate::object::Object;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

/// Factory producing an empty instance of a class.
pub type Factory = Arc<dyn Fn() -> Box<dyn Object> + Send + Sync>;

static REGISTRY: OnceLock<RwLock<HashMap<String, Factory>>> = OnceLock::new();

fn registry() -> &'static RwLock<HashMap<String, Factory>> {
    REGISTRY.get_or_init(Default::default)
}

/// Register a factory under a class name.
pub fn register_factory<F>(class: impl Into<String>, factory: F) -> Result<(), ModelError>
where
    F: Fn() -> Box<dyn Object> + Send + Sync + 'static,
{
    let class = class.into();
    let mut classes = registry().write().unwrap_or_else(PoisonError::into_inner);

    if classes.contains_key(&class) {
        return Err(ModelError::DuplicateClass(class));
    }

    tracing::debug!("Registered class '{}'", class);
    classes.insert(class, Arc::new(factory));
    Ok(())
}

/// Register a Rust type under the class name its default instance reports.
pub fn register<T: Object + Default>() -> Result<(), ModelError> {
    let class = T::default().class_name().to_string();
    register_factory(class, || Box::new(T::default()))
}

/// Check whether a class name is registered.
pub fn is_registered(class: &str) -> bool {
    registry()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .contains_key(class)
}

/// Create an empty instance of a registered class.
pub fn instantiate(class: &str) -> Result<Box<dyn Object>, ModelError> {
    // Release the lock before running the factory; factories may instantiate.
    let factory = registry()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(class)
        .cloned()
        .ok_or_else(|| ModelError::UnknownClass(class.to_string()))?;

    Ok(factory())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::object_eq;
    use std::any::Any;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Marker;

    impl Object for Marker {
        fn class_name(&self) -> &str {
            "RegistryTests.Marker"
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn clone_object(&self) -> Box<dyn Object> {
            Box::new(self.clone())
        }

        fn eq_object(&self, other: &dyn Object) -> bool {
            object_eq(self, other)
        }
    }

    #[test]
    fn test_register_and_instantiate() {
        register::<Marker>().unwrap();
        assert!(is_registered("RegistryTests.Marker"));

        let object = instantiate("RegistryTests.Marker").unwrap();
        assert!(object.is_a("RegistryTests.Marker"));
        assert!(object.as_any().downcast_ref::<Marker>().is_some());

        assert_eq!(
            register::<Marker>(),
            Err(ModelError::DuplicateClass("RegistryTests.Marker".to_string()))
        );
    }

    #[test]
    fn test_unknown_class() {
        assert_eq!(
            instantiate("RegistryTests.Missing").unwrap_err(),
            ModelError::UnknownClass("RegistryTests.Missing".to_string())
        );
    }
}
