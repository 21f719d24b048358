#![no_std]

extern crate alloc;

pub(crate) mod args;
pub(crate) mod cache;
pub(crate) mod call;
pub(crate) mod config;
pub(crate) mod container;
pub(crate) mod dependency_resolver;
pub(crate) mod errors;
pub(crate) mod function;
pub(crate) mod instantiator;
pub(crate) mod object;
pub(crate) mod reflection;
pub(crate) mod registry;
pub(crate) mod rule;
pub(crate) mod service;
pub(crate) mod tags;
pub(crate) mod value;

#[cfg(feature = "std")]
pub mod holder;

pub use args::Args;
pub use cache::{MemoryStore, Store};
pub use call::{CallTarget, Callback};
pub use config::{Config, DEFAULT_SELF_ALIAS};
pub use container::Container;
pub use errors::{InstantiateErrorKind, ResolveErrorKind};
pub use function::{Function, Params};
pub use object::ObjectRef;
pub use reflection::{BuiltinType, Class, ClassCatalog, ClassKind, Constructor, Method, Param, Signature, TypeHint, INVOKE};
pub use rule::{rule_name, Alias, Factory, MethodCall, Rule, RuleDefinition};
pub use value::Value;

#[cfg(feature = "serde")]
pub use config::{AliasConfig, CallConfig, RuleConfig, RulesConfig, TagsConfig};
