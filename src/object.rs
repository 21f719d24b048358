use alloc::{boxed::Box, string::String, sync::Arc, vec::Vec};
use core::{
    any::Any,
    fmt::{self, Debug, Formatter},
};
use indexmap::IndexMap;
use parking_lot::Mutex;

use crate::{reflection::Class, value::Value};

pub(crate) struct Object {
    class: Arc<Class>,
    properties: Mutex<IndexMap<String, Value>>,
    native: Mutex<Option<Box<dyn Any + Send + Sync>>>,
}

/// Shared handle to an instance of a catalog class.
///
/// A freshly allocated object has no properties; constructors populate it in place,
/// which is what lets a shared instance be registered before its constructor runs.
#[derive(Clone)]
pub struct ObjectRef(pub(crate) Arc<Object>);

impl ObjectRef {
    /// Allocates an object without running any constructor.
    #[inline]
    #[must_use]
    pub fn new(class: Arc<Class>) -> Self {
        Self(Arc::new(Object {
            class,
            properties: Mutex::new(IndexMap::new()),
            native: Mutex::new(None),
        }))
    }

    #[inline]
    #[must_use]
    pub fn class(&self) -> &Class {
        &self.0.class
    }

    #[inline]
    #[must_use]
    pub fn class_name(&self) -> &str {
        self.0.class.name()
    }

    /// Returns the property value, `Null` if it was never set.
    #[must_use]
    pub fn get(&self, property: &str) -> Value {
        self.0.properties.lock().get(property).cloned().unwrap_or_default()
    }

    #[inline]
    pub fn set(&self, property: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.properties.lock().insert(property.into(), value.into())
    }

    #[inline]
    #[must_use]
    pub fn has(&self, property: &str) -> bool {
        self.0.properties.lock().contains_key(property)
    }

    #[inline]
    pub fn unset(&self, property: &str) -> Option<Value> {
        self.0.properties.lock().shift_remove(property)
    }

    #[must_use]
    pub fn properties(&self) -> Vec<(String, Value)> {
        self.0
            .properties
            .lock()
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }

    /// Stores host data behind the object, replacing any previous one.
    #[inline]
    pub fn set_native<T: Any + Send + Sync>(&self, value: T) {
        *self.0.native.lock() = Some(Box::new(value));
    }

    /// Runs `f` over the host data if it was stored with the same type.
    #[must_use]
    pub fn with_native<T: Any + Send + Sync, R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let guard = self.0.native.lock();
        guard.as_ref().and_then(|native| native.downcast_ref::<T>()).map(f)
    }

    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Debug for ObjectRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("class", &self.class_name())
            .field("ptr", &Arc::as_ptr(&self.0))
            .finish()
    }
}
