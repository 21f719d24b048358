use alloc::{collections::BTreeMap, string::String};
use indexmap::IndexMap;

use crate::{instantiator::BoxedMaker, value::Value};

/// Key-value holder of shared instances, keyed by canonical rule name.
///
/// The container only needs these four operations, so any map-like backend can be plugged in
/// through [`crate::Container::with_store`].
pub trait Store: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;

    fn set(&mut self, key: String, value: Value) -> Option<Value>;

    fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    fn remove(&mut self, key: &str) -> Option<Value>;
}

/// Default in-memory [`Store`], keeps registration order.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    instances: IndexMap<String, Value>,
}

impl MemoryStore {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

impl Store for MemoryStore {
    #[inline]
    fn get(&self, key: &str) -> Option<Value> {
        self.instances.get(key).cloned()
    }

    #[inline]
    fn set(&mut self, key: String, value: Value) -> Option<Value> {
        self.instances.insert(key, value)
    }

    #[inline]
    fn has(&self, key: &str) -> bool {
        self.instances.contains_key(key)
    }

    #[inline]
    fn remove(&mut self, key: &str) -> Option<Value> {
        self.instances.shift_remove(key)
    }
}

/// Makers built so far, one per canonical rule key.
#[derive(Clone, Default)]
pub(crate) struct MakerCache {
    makers: BTreeMap<String, BoxedMaker>,
}

impl MakerCache {
    #[inline]
    #[must_use]
    pub(crate) fn get(&self, key: &str) -> Option<BoxedMaker> {
        self.makers.get(key).cloned()
    }

    /// Keeps the maker cached first, a maker built concurrently for the same key is dropped.
    pub(crate) fn get_or_insert(&mut self, key: String, maker: BoxedMaker) -> BoxedMaker {
        self.makers.entry(key).or_insert(maker).clone()
    }

    #[inline]
    #[must_use]
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.makers.len()
    }
}
