use alloc::{boxed::Box, string::String};

use super::instantiate::InstantiateErrorKind;
use crate::reflection::ClassKind;

#[derive(thiserror::Error, Debug)]
pub enum ResolveErrorKind {
    #[error("No rule defined for: \"{name}\"")]
    NoRule { name: String },
    #[error("Cannot instantiate {kind} {class}")]
    CannotInstantiate { class: String, kind: ClassKind },
    #[error("Unable to resolve required parameter ${param} of {target}")]
    UnresolvedDependency {
        param: String,
        target: String,
        source: Box<ResolveErrorKind>,
    },
    #[error("Invalid call expression: {expression}")]
    InvalidCallExpression { expression: String },
    #[error("Call to undefined method {class}::{method}")]
    UndefinedCall { class: String, method: String },
    #[error(transparent)]
    Instantiate(InstantiateErrorKind),
}

impl ResolveErrorKind {
    #[inline]
    #[must_use]
    pub fn is_cannot_instantiate(&self) -> bool {
        matches!(self, Self::CannotInstantiate { .. })
    }

    #[inline]
    #[must_use]
    pub fn is_no_rule(&self) -> bool {
        matches!(self, Self::NoRule { .. })
    }
}

/// Errors raised by constructor, method or factory bodies.
/// A body that failed because a nested container call failed surfaces the nested kind unchanged.
impl From<InstantiateErrorKind> for ResolveErrorKind {
    fn from(err: InstantiateErrorKind) -> Self {
        match err {
            InstantiateErrorKind::Resolve(err) => *err,
            err => Self::Instantiate(err),
        }
    }
}
