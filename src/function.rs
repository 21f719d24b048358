use alloc::{string::String, sync::Arc, vec::Vec};
use core::{
    fmt::{self, Debug, Formatter},
    ops::Index,
    slice,
};

use crate::{
    errors::InstantiateErrorKind,
    reflection::Signature,
    value::{Value, NULL},
};

/// Arguments produced by the parameter resolver, in signature order.
/// A variadic parameter contributes every remaining value, so there may be more values than params.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Params(pub(crate) Vec<Value>);

impl Params {
    #[inline]
    #[must_use]
    pub fn new(values: Vec<Value>) -> Self {
        Self(values)
    }

    /// Returns the value at `index`, `Null` past the end.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> &Value {
        self.0.get(index).unwrap_or(&NULL)
    }

    /// Values from `index` to the end, the usual way to read a variadic tail.
    #[inline]
    #[must_use]
    pub fn rest(&self, index: usize) -> &[Value] {
        self.0.get(index..).unwrap_or_default()
    }

    /// Returns the string at `index` or an [`InstantiateErrorKind::InvalidArgument`] naming `name`.
    pub fn str(&self, index: usize, name: &str) -> Result<&str, InstantiateErrorKind> {
        let value = self.get(index);
        value.as_str().ok_or_else(|| InstantiateErrorKind::InvalidArgument {
            name: name.into(),
            expected: "string",
            actual: value.type_name(),
        })
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> slice::Iter<'_, Value> {
        self.0.iter()
    }

    #[inline]
    #[must_use]
    pub fn into_inner(self) -> Vec<Value> {
        self.0
    }
}

impl Index<usize> for Params {
    type Output = Value;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        self.get(index)
    }
}

impl IntoIterator for Params {
    type Item = Value;
    type IntoIter = alloc::vec::IntoIter<Value>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

pub(crate) type FunctionBody = dyn Fn(Params) -> Result<Value, InstantiateErrorKind> + Send + Sync;

/// A callable value: a declared signature plus the body invoked with resolved arguments.
#[derive(Clone)]
pub struct Function {
    name: Arc<str>,
    signature: Arc<Signature>,
    body: Arc<FunctionBody>,
}

impl Function {
    #[inline]
    #[must_use]
    pub fn new<F>(signature: Signature, body: F) -> Self
    where
        F: Fn(Params) -> Result<Value, InstantiateErrorKind> + Send + Sync + 'static,
    {
        Self::named("{closure}", signature, body)
    }

    #[inline]
    #[must_use]
    pub fn named<F>(name: impl Into<String>, signature: Signature, body: F) -> Self
    where
        F: Fn(Params) -> Result<Value, InstantiateErrorKind> + Send + Sync + 'static,
    {
        let name: String = name.into();
        Self {
            name: name.into(),
            signature: Arc::new(signature),
            body: Arc::new(body),
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    #[inline]
    pub fn invoke(&self, params: Params) -> Result<Value, InstantiateErrorKind> {
        (self.body)(params)
    }

    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Function) -> bool {
        Arc::ptr_eq(&self.body, &other.body)
    }
}

impl PartialEq for Function {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Debug for Function {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}
