use alloc::{
    string::{String, ToString as _},
    vec::Vec,
};
use indexmap::IndexMap;

use crate::{call::separator_position, function::Function, value::Value};

/// Canonical rule key: lower-cased, leading namespace separators removed.
#[inline]
#[must_use]
pub fn rule_name(name: &str) -> String {
    name.trim_start_matches('\\').to_lowercase()
}

/// Extra lookup name under which a rule's instance is registered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Alias {
    /// The concrete class name of the rule (or the instance).
    Class,
    Name(String),
}

impl From<&str> for Alias {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for Alias {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

/// Post-construction method invocation.
#[derive(Clone, Debug)]
pub struct MethodCall {
    method: String,
    args: Vec<Value>,
    chain: bool,
}

impl MethodCall {
    /// A leading `@` marks a chaining call: `"@format"` is `MethodCall::new("format").chain()`.
    #[must_use]
    pub fn new(method: impl Into<String>) -> Self {
        let method: String = method.into();
        match method.strip_prefix('@') {
            Some(stripped) => Self {
                method: stripped.to_string(),
                args: Vec::new(),
                chain: true,
            },
            None => Self {
                method,
                args: Vec::new(),
                chain: false,
            },
        }
    }

    #[inline]
    #[must_use]
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn args(mut self, values: impl IntoIterator<Item = Value>) -> Self {
        self.args.extend(values);
        self
    }

    /// The method's return value replaces the object for the following calls and as the result.
    #[inline]
    #[must_use]
    pub fn chain(mut self) -> Self {
        self.chain = true;
        self
    }

    #[inline]
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    #[inline]
    #[must_use]
    pub fn arguments(&self) -> &[Value] {
        &self.args
    }

    #[inline]
    #[must_use]
    pub fn is_chain(&self) -> bool {
        self.chain
    }
}

impl From<&str> for MethodCall {
    #[inline]
    fn from(method: &str) -> Self {
        Self::new(method)
    }
}

/// Factory producing a rule's value instead of a class instantiation.
#[derive(Clone, Debug)]
pub enum Factory {
    Function(Function),
    /// Call expression, `"Class:method"` or `"service@method"`
    Expression(String),
}

impl From<Function> for Factory {
    #[inline]
    fn from(function: Function) -> Self {
        Self::Function(function)
    }
}

/// Construction rule. Every field is optional so rules can be overlaid on each other;
/// rules returned by the container have `shared` and `inherit` filled from the defaults.
#[derive(Clone, Debug, Default)]
pub struct Rule {
    pub(crate) name: String,
    pub(crate) set: String,
    pub(crate) class: Option<String>,
    pub(crate) create: Option<Factory>,
    pub(crate) shared: Option<bool>,
    pub(crate) inherit: Option<bool>,
    pub(crate) params: Option<Vec<Value>>,
    pub(crate) substitutions: Option<IndexMap<String, Value>>,
    pub(crate) calls: Option<Vec<MethodCall>>,
    pub(crate) tags: Option<Vec<String>>,
    pub(crate) alias: Option<Alias>,
}

impl Rule {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rule carrying an explicit name, used when injecting instances.
    #[inline]
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::new().identified(name.into())
    }

    #[inline]
    #[must_use]
    pub(crate) fn identified(mut self, name: String) -> Self {
        self.set = rule_name(&name);
        self.name = name;
        self
    }

    #[inline]
    #[must_use]
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn create(mut self, factory: impl Into<Factory>) -> Self {
        self.create = Some(factory.into());
        self
    }

    /// Factory given as a call expression.
    #[inline]
    #[must_use]
    pub fn create_from(self, expression: impl Into<String>) -> Self {
        self.create(Factory::Expression(expression.into()))
    }

    #[inline]
    #[must_use]
    pub fn shared(mut self, shared: bool) -> Self {
        self.shared = Some(shared);
        self
    }

    #[inline]
    #[must_use]
    pub fn inherit(mut self, inherit: bool) -> Self {
        self.inherit = Some(inherit);
        self
    }

    #[inline]
    #[must_use]
    pub fn params(mut self, params: impl IntoIterator<Item = Value>) -> Self {
        self.params = Some(params.into_iter().collect());
        self
    }

    #[inline]
    #[must_use]
    pub fn substitute(mut self, class: impl Into<String>, value: impl Into<Value>) -> Self {
        self.substitutions
            .get_or_insert_with(IndexMap::new)
            .insert(class.into(), value.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn call(mut self, call: impl Into<MethodCall>) -> Self {
        self.calls.get_or_insert_with(Vec::new).push(call.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.get_or_insert_with(Vec::new).push(tag.into());
        self
    }

    /// Registers the instance under an additional name as well.
    #[inline]
    #[must_use]
    pub fn alias(mut self, alias: impl Into<Alias>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Registers the instance under its concrete class name as well.
    #[inline]
    #[must_use]
    pub fn alias_class(mut self) -> Self {
        self.alias = Some(Alias::Class);
        self
    }

    /// Requested identifier, case preserved.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Canonical key of the rule.
    #[inline]
    #[must_use]
    pub fn key(&self) -> &str {
        &self.set
    }

    #[inline]
    #[must_use]
    pub fn class_override(&self) -> Option<&str> {
        self.class.as_deref()
    }

    /// Class to instantiate, the rule name unless overridden.
    #[inline]
    #[must_use]
    pub fn class_name(&self) -> &str {
        self.class.as_deref().unwrap_or(&self.name)
    }

    #[inline]
    #[must_use]
    pub fn factory(&self) -> Option<&Factory> {
        self.create.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn is_shared(&self) -> bool {
        self.shared.unwrap_or(false)
    }

    #[inline]
    #[must_use]
    pub fn inherits(&self) -> bool {
        self.inherit.unwrap_or(true)
    }

    #[inline]
    #[must_use]
    pub fn param_values(&self) -> &[Value] {
        self.params.as_deref().unwrap_or_default()
    }

    /// Substitution for a class name, keys compared canonically.
    #[must_use]
    pub fn substitution(&self, class: &str) -> Option<&Value> {
        let key = rule_name(class);
        self.substitutions
            .as_ref()?
            .iter()
            .find(|(name, _)| rule_name(name) == key)
            .map(|(_, value)| value)
    }

    #[inline]
    #[must_use]
    pub fn calls(&self) -> &[MethodCall] {
        self.calls.as_deref().unwrap_or_default()
    }

    #[inline]
    #[must_use]
    pub fn tags(&self) -> &[String] {
        self.tags.as_deref().unwrap_or_default()
    }

    #[inline]
    #[must_use]
    pub fn alias_name(&self) -> Option<&Alias> {
        self.alias.as_ref()
    }

    /// Overlays `other` on top of `self`: set fields win, substitutions merge key by key,
    /// lists are replaced. Identity (`name`, key) is left untouched.
    pub fn merge(&mut self, other: &Rule) {
        fn overlay<T: Clone>(target: &mut Option<T>, value: &Option<T>) {
            if value.is_some() {
                target.clone_from(value);
            }
        }

        overlay(&mut self.class, &other.class);
        overlay(&mut self.create, &other.create);
        overlay(&mut self.shared, &other.shared);
        overlay(&mut self.inherit, &other.inherit);
        overlay(&mut self.params, &other.params);
        overlay(&mut self.calls, &other.calls);
        overlay(&mut self.tags, &other.tags);
        overlay(&mut self.alias, &other.alias);

        if let Some(substitutions) = &other.substitutions {
            let target = self.substitutions.get_or_insert_with(IndexMap::new);
            for (class, value) in substitutions {
                target.insert(class.clone(), value.clone());
            }
        }
    }

    /// Fills fields left unset from `defaults`.
    pub(crate) fn fill(&mut self, defaults: &Rule) {
        let mut filled = defaults.clone();
        filled.merge(self);
        filled.name = core::mem::take(&mut self.name);
        filled.set = core::mem::take(&mut self.set);
        *self = filled;
    }
}

/// Second argument of rule registration.
#[derive(Clone, Debug)]
pub enum RuleDefinition {
    Rule(Rule),
    Factory(Factory),
    Class(String),
}

impl From<Rule> for RuleDefinition {
    #[inline]
    fn from(rule: Rule) -> Self {
        Self::Rule(rule)
    }
}

impl From<Function> for RuleDefinition {
    #[inline]
    fn from(function: Function) -> Self {
        Self::Factory(Factory::Function(function))
    }
}

impl From<Factory> for RuleDefinition {
    #[inline]
    fn from(factory: Factory) -> Self {
        Self::Factory(factory)
    }
}

/// A string holding a call expression is a factory, any other string names a class.
impl From<String> for RuleDefinition {
    fn from(text: String) -> Self {
        if separator_position(&text).is_some() {
            Self::Factory(Factory::Expression(text))
        } else {
            Self::Class(text)
        }
    }
}

impl From<&str> for RuleDefinition {
    #[inline]
    fn from(text: &str) -> Self {
        text.to_string().into()
    }
}

impl From<RuleDefinition> for Rule {
    fn from(definition: RuleDefinition) -> Self {
        match definition {
            RuleDefinition::Rule(rule) => rule,
            RuleDefinition::Factory(factory) => Rule::new().create(factory),
            RuleDefinition::Class(class) => Rule::new().class(class),
        }
    }
}
