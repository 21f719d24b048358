//! Explicit signature and class descriptors.
//!
//! Resolution is driven by these descriptors the same way a reflective runtime would drive it
//! by introspection: every function, constructor and method carries a [`Signature`], and every
//! constructible type is a [`Class`] registered in the container's [`ClassCatalog`].

use alloc::{
    string::{String, ToString as _},
    sync::Arc,
    vec::Vec,
};
use core::fmt::{self, Debug, Display, Formatter};
use indexmap::IndexMap;

use crate::{
    errors::InstantiateErrorKind,
    function::Params,
    object::ObjectRef,
    rule::rule_name,
    value::Value,
    Container,
};

/// Method name under which an invokable class registers its invoke handler.
pub const INVOKE: &str = "__invoke";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BuiltinType {
    Int,
    Float,
    String,
    Bool,
    Array,
    Iterable,
    Callable,
    Object,
    Mixed,
}

impl BuiltinType {
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Some(match name.to_ascii_lowercase().as_str() {
            "int" => Self::Int,
            "float" => Self::Float,
            "string" => Self::String,
            "bool" => Self::Bool,
            "array" => Self::Array,
            "iterable" => Self::Iterable,
            "callable" => Self::Callable,
            "object" => Self::Object,
            "mixed" => Self::Mixed,
            _ => return None,
        })
    }
}

/// One alternative of a declared parameter type.
/// An untyped parameter has no hints at all.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeHint {
    Builtin(BuiltinType),
    Class(String),
}

impl TypeHint {
    #[inline]
    #[must_use]
    pub fn class_name(&self) -> Option<&str> {
        match self {
            Self::Class(name) => Some(name),
            Self::Builtin(_) => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Param {
    name: String,
    types: Vec<TypeHint>,
    nullable: bool,
    variadic: bool,
    default: Option<Value>,
}

impl Param {
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            types: Vec::new(),
            nullable: false,
            variadic: false,
            default: None,
        }
    }

    /// Parameter receiving the container itself.
    #[inline]
    #[must_use]
    pub fn container(name: impl Into<String>) -> Self {
        Self::new(name).class(Container::CLASS)
    }

    /// Adds a class/interface alternative to the declared type.
    #[inline]
    #[must_use]
    pub fn class(mut self, name: impl Into<String>) -> Self {
        self.types.push(TypeHint::Class(name.into()));
        self
    }

    /// Adds a builtin alternative to the declared type.
    #[inline]
    #[must_use]
    pub fn builtin(mut self, builtin: BuiltinType) -> Self {
        self.types.push(TypeHint::Builtin(builtin));
        self
    }

    #[inline]
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    #[inline]
    #[must_use]
    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }

    #[inline]
    #[must_use]
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn types(&self) -> &[TypeHint] {
        &self.types
    }

    #[inline]
    #[must_use]
    pub fn is_variadic(&self) -> bool {
        self.variadic
    }

    #[inline]
    #[must_use]
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Untyped and `mixed` params accept null, as does any param whose default is null.
    #[must_use]
    pub fn allows_null(&self) -> bool {
        self.nullable
            || self.types.is_empty()
            || self.types.contains(&TypeHint::Builtin(BuiltinType::Mixed))
            || matches!(self.default, Some(Value::Null))
    }
}

#[derive(Clone, Debug, Default)]
pub struct Signature {
    params: Vec<Param>,
}

impl Signature {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    #[inline]
    #[must_use]
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl FromIterator<Param> for Signature {
    fn from_iter<T: IntoIterator<Item = Param>>(iter: T) -> Self {
        Self {
            params: iter.into_iter().collect(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClassKind {
    Concrete,
    Abstract,
    Interface,
}

impl Display for ClassKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Concrete => "class",
            Self::Abstract => "abstract class",
            Self::Interface => "interface",
        })
    }
}

pub(crate) type ConstructorBody = dyn Fn(&ObjectRef, Params) -> Result<(), InstantiateErrorKind> + Send + Sync;
pub(crate) type MethodBody = dyn Fn(&ObjectRef, Params) -> Result<Value, InstantiateErrorKind> + Send + Sync;
pub(crate) type StaticBody = dyn Fn(Params) -> Result<Value, InstantiateErrorKind> + Send + Sync;
pub(crate) type ContainerAwareHook = dyn Fn(&ObjectRef, &Container) + Send + Sync;

/// Populates an already allocated object.
#[derive(Clone)]
pub struct Constructor {
    signature: Arc<Signature>,
    body: Arc<ConstructorBody>,
}

impl Constructor {
    #[inline]
    #[must_use]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    #[inline]
    pub fn invoke(&self, object: &ObjectRef, params: Params) -> Result<(), InstantiateErrorKind> {
        (self.body)(object, params)
    }
}

#[derive(Clone)]
enum MethodKind {
    Instance(Arc<MethodBody>),
    Static(Arc<StaticBody>),
}

#[derive(Clone)]
pub struct Method {
    name: String,
    signature: Arc<Signature>,
    kind: MethodKind,
}

impl Method {
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
    #[must_use]
    pub fn is_static(&self) -> bool {
        matches!(self.kind, MethodKind::Static(_))
    }

    /// Invokes the method. Instance methods without a receiver return `None`.
    pub fn invoke(&self, receiver: Option<&ObjectRef>, params: Params) -> Option<Result<Value, InstantiateErrorKind>> {
        match (&self.kind, receiver) {
            (MethodKind::Static(body), _) => Some(body(params)),
            (MethodKind::Instance(body), Some(object)) => Some(body(object, params)),
            (MethodKind::Instance(_), None) => None,
        }
    }
}

/// Runtime description of a constructible (or abstract) type.
#[derive(Clone)]
pub struct Class {
    name: String,
    kind: ClassKind,
    parents: Vec<String>,
    constructor: Option<Constructor>,
    methods: IndexMap<String, Method>,
    container_aware: Option<Arc<ContainerAwareHook>>,
}

impl Class {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ClassKind::Concrete,
            parents: Vec::new(),
            constructor: None,
            methods: IndexMap::new(),
            container_aware: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn interface(name: impl Into<String>) -> Self {
        Self {
            kind: ClassKind::Interface,
            ..Self::new(name)
        }
    }

    #[inline]
    #[must_use]
    pub fn abstract_class(name: impl Into<String>) -> Self {
        Self {
            kind: ClassKind::Abstract,
            ..Self::new(name)
        }
    }

    /// Declares a superclass.
    #[inline]
    #[must_use]
    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.parents.push(parent.into());
        self
    }

    /// Declares an implemented interface.
    #[inline]
    #[must_use]
    pub fn implements(self, interface: impl Into<String>) -> Self {
        self.extends(interface)
    }

    #[must_use]
    pub fn constructor<F>(mut self, signature: Signature, body: F) -> Self
    where
        F: Fn(&ObjectRef, Params) -> Result<(), InstantiateErrorKind> + Send + Sync + 'static,
    {
        self.constructor = Some(Constructor {
            signature: Arc::new(signature),
            body: Arc::new(body),
        });
        self
    }

    /// Constructor storing every argument into a property named after its param.
    /// A variadic param receives the list of the remaining values.
    #[must_use]
    pub fn promote(self, signature: Signature) -> Self {
        let names: Vec<(String, bool)> = signature
            .params()
            .iter()
            .map(|param| (param.name().to_string(), param.is_variadic()))
            .collect();

        self.constructor(signature, move |object, params| {
            let mut values = params.into_iter();
            for (name, variadic) in &names {
                if *variadic {
                    object.set(name.clone(), Value::List(values.by_ref().collect()));
                } else {
                    object.set(name.clone(), values.next().unwrap_or_default());
                }
            }
            Ok(())
        })
    }

    #[must_use]
    pub fn method<F>(mut self, name: impl Into<String>, signature: Signature, body: F) -> Self
    where
        F: Fn(&ObjectRef, Params) -> Result<Value, InstantiateErrorKind> + Send + Sync + 'static,
    {
        let name = name.into();
        self.methods.insert(
            rule_name(&name),
            Method {
                name,
                signature: Arc::new(signature),
                kind: MethodKind::Instance(Arc::new(body)),
            },
        );
        self
    }

    #[must_use]
    pub fn static_method<F>(mut self, name: impl Into<String>, signature: Signature, body: F) -> Self
    where
        F: Fn(Params) -> Result<Value, InstantiateErrorKind> + Send + Sync + 'static,
    {
        let name = name.into();
        self.methods.insert(
            rule_name(&name),
            Method {
                name,
                signature: Arc::new(signature),
                kind: MethodKind::Static(Arc::new(body)),
            },
        );
        self
    }

    /// Makes instances invokable as call targets.
    #[inline]
    #[must_use]
    pub fn invokable<F>(self, signature: Signature, body: F) -> Self
    where
        F: Fn(&ObjectRef, Params) -> Result<Value, InstantiateErrorKind> + Send + Sync + 'static,
    {
        self.method(INVOKE, signature, body)
    }

    /// Hook receiving the container once an instance is constructed.
    #[inline]
    #[must_use]
    pub fn container_aware<F>(mut self, hook: F) -> Self
    where
        F: Fn(&ObjectRef, &Container) + Send + Sync + 'static,
    {
        self.container_aware = Some(Arc::new(hook));
        self
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> ClassKind {
        self.kind
    }

    #[inline]
    #[must_use]
    pub fn parents(&self) -> &[String] {
        &self.parents
    }

    #[inline]
    #[must_use]
    pub fn is_instantiable(&self) -> bool {
        self.kind == ClassKind::Concrete
    }

    /// Own invoke handler, parents are not consulted. See [`ClassCatalog::invoker_of`].
    #[inline]
    #[must_use]
    pub fn invoker(&self) -> Option<&Method> {
        self.methods.get(INVOKE)
    }
}

impl Debug for Class {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("parents", &self.parents)
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// Case-insensitive table of classes known to a container.
#[derive(Clone, Default)]
pub struct ClassCatalog {
    classes: IndexMap<String, Arc<Class>>,
}

impl ClassCatalog {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a class.
    pub fn define(&mut self, class: Class) -> Arc<Class> {
        let class = Arc::new(class);
        self.classes.insert(rule_name(class.name()), class.clone());
        class
    }

    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<Class>> {
        self.classes.get(&rule_name(name)).cloned()
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(&rule_name(name))
    }

    /// Whether `class` is `parent` or derives from it through any chain of parents.
    #[must_use]
    pub fn is_a(&self, class: &str, parent: &str) -> bool {
        rule_name(class) == rule_name(parent) || self.is_subclass_of(class, parent)
    }

    /// Strict variant of [`Self::is_a`]: a class is not its own subclass.
    #[must_use]
    pub fn is_subclass_of(&self, class: &str, parent: &str) -> bool {
        let target = rule_name(parent);
        let mut visited = Vec::new();
        let mut pending: Vec<String> = match self.get(class) {
            Some(class) => class.parents.iter().map(|name| rule_name(name)).collect(),
            None => return false,
        };

        while let Some(name) = pending.pop() {
            if name == target {
                return true;
            }
            if visited.contains(&name) {
                continue;
            }
            if let Some(class) = self.classes.get(&name) {
                pending.extend(class.parents.iter().map(|name| rule_name(name)));
            }
            visited.push(name);
        }
        false
    }

    /// Walks `class` then its ancestors, depth first in declaration order, until `f` finds something.
    fn find_in_ancestry<T>(&self, class: &Class, mut f: impl FnMut(&Class) -> Option<T>) -> Option<T> {
        if let Some(found) = f(class) {
            return Some(found);
        }
        let mut visited = Vec::new();
        let mut pending: Vec<String> = class.parents.iter().rev().map(|name| rule_name(name)).collect();
        while let Some(name) = pending.pop() {
            if visited.contains(&name) {
                continue;
            }
            if let Some(parent) = self.classes.get(&name) {
                if let Some(found) = f(parent) {
                    return Some(found);
                }
                pending.extend(parent.parents.iter().rev().map(|name| rule_name(name)));
            }
            visited.push(name);
        }
        None
    }

    #[must_use]
    pub fn constructor_of(&self, class: &Class) -> Option<Constructor> {
        self.find_in_ancestry(class, |class| class.constructor.clone())
    }

    #[must_use]
    pub fn method_of(&self, class: &Class, method: &str) -> Option<Method> {
        let key = rule_name(method);
        self.find_in_ancestry(class, |class| class.methods.get(&key).cloned())
    }

    /// Invoke handler of `class` or its nearest ancestor declaring one.
    #[inline]
    #[must_use]
    pub fn invoker_of(&self, class: &Class) -> Option<Method> {
        self.method_of(class, INVOKE)
    }

    #[must_use]
    pub(crate) fn container_hook_of(&self, class: &Class) -> Option<Arc<ContainerAwareHook>> {
        self.find_in_ancestry(class, |class| class.container_aware.clone())
    }
}
