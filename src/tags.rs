use alloc::{string::String, vec::Vec};
use indexmap::IndexMap;

/// Tag name to canonical rule keys, in registration order.
#[derive(Clone, Debug, Default)]
pub(crate) struct TagIndex {
    buckets: IndexMap<String, Vec<String>>,
}

impl TagIndex {
    /// Appends `key` to the bucket of `tag` unless it is already there.
    pub(crate) fn add(&mut self, tag: &str, key: &str) {
        let bucket = self.buckets.entry(tag.into()).or_default();
        if !bucket.iter().any(|known| known == key) {
            bucket.push(key.into());
        }
    }

    /// Keys of every bucket, bucket after bucket, duplicates across buckets kept.
    #[must_use]
    pub(crate) fn keys<'a>(&self, tags: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        tags.into_iter()
            .filter_map(|tag| self.buckets.get(tag))
            .flatten()
            .cloned()
            .collect()
    }
}
