use alloc::{string::String, vec::Vec};

use crate::value::Value;

/// Caller supplied arguments: positional values, optionally keyed by parameter name.
///
/// The resolver consumes entries as it binds them, so an entry is used for one parameter at most.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Args {
    entries: Vec<(Option<String>, Value)>,
}

impl Args {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.entries.push((None, value.into()));
        self
    }

    /// Entry bound to the parameter with the same name before any positional matching.
    #[inline]
    #[must_use]
    pub fn named(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.push((Some(name.into()), value.into()));
        self
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub(crate) fn extend(&mut self, values: impl IntoIterator<Item = Value>) {
        self.entries.extend(values.into_iter().map(|value| (None, value)));
    }

    #[inline]
    pub(crate) fn position(&self, predicate: impl Fn(&Value) -> bool) -> Option<usize> {
        self.entries.iter().position(|(_, value)| predicate(value))
    }

    #[inline]
    pub(crate) fn take(&mut self, index: usize) -> Value {
        self.entries.remove(index).1
    }

    pub(crate) fn take_named(&mut self, name: &str) -> Option<Value> {
        let index = self.entries.iter().position(|(key, _)| key.as_deref() == Some(name))?;
        Some(self.take(index))
    }

    #[inline]
    pub(crate) fn shift(&mut self) -> Option<Value> {
        if self.entries.is_empty() {
            None
        } else {
            Some(self.take(0))
        }
    }

    #[inline]
    pub(crate) fn drain(&mut self) -> Vec<Value> {
        self.entries.drain(..).map(|(_, value)| value).collect()
    }
}

impl From<Vec<Value>> for Args {
    #[inline]
    fn from(values: Vec<Value>) -> Self {
        values.into_iter().collect()
    }
}

impl<const N: usize> From<[Value; N]> for Args {
    #[inline]
    fn from(values: [Value; N]) -> Self {
        values.into_iter().collect()
    }
}

impl From<()> for Args {
    #[inline]
    fn from((): ()) -> Self {
        Self::new()
    }
}

impl FromIterator<Value> for Args {
    fn from_iter<T: IntoIterator<Item = Value>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().map(|value| (None, value)).collect(),
        }
    }
}
