use alloc::{
    borrow::ToOwned,
    boxed::Box,
    string::{String, ToString as _},
    sync::Arc,
    vec::Vec,
};
use core::fmt::{self, Debug, Formatter};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, error, info_span};

use crate::{
    args::Args,
    cache::{MakerCache, MemoryStore, Store},
    config::Config,
    errors::ResolveErrorKind,
    instantiator::{build_maker, MakeRequest},
    reflection::{Class, ClassCatalog},
    registry::RuleRegistry,
    rule::{rule_name, Alias, Rule, RuleDefinition},
    service::Service as _,
    tags::TagIndex,
    value::Value,
};

pub(crate) struct ContainerInner {
    pub(crate) catalog: RwLock<ClassCatalog>,
    registry: RwLock<RuleRegistry>,
    store: Mutex<Box<dyn Store>>,
    makers: Mutex<MakerCache>,
    tags: Mutex<TagIndex>,
    self_alias: RwLock<String>,
}

/// Rule-driven container.
///
/// Cloning is cheap and every clone shares the same rules, classes and instances.
/// No internal lock is held while a constructor, method or factory body runs,
/// so bodies may call back into the container.
#[derive(Clone)]
pub struct Container {
    pub(crate) inner: Arc<ContainerInner>,
}

impl Container {
    /// Class name under which the container resolves itself.
    pub const CLASS: &'static str = "wirebox\\Container";

    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    #[inline]
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        Self::with_store(config, MemoryStore::new())
    }

    /// Creates a container keeping its shared instances in `store`.
    #[must_use]
    pub fn with_store(config: Config, store: impl Store + 'static) -> Self {
        Self {
            inner: Arc::new(ContainerInner {
                catalog: RwLock::new(ClassCatalog::new()),
                registry: RwLock::new(RuleRegistry::new(&config.defaults)),
                store: Mutex::new(Box::new(store)),
                makers: Mutex::new(MakerCache::default()),
                tags: Mutex::new(TagIndex::default()),
                self_alias: RwLock::new(config.self_alias),
            }),
        }
    }

    /// Adds or replaces a class in the catalog.
    pub fn define(&self, class: Class) -> Arc<Class> {
        debug!(class = class.name(), "Defined");
        self.inner.catalog.write().define(class)
    }

    #[inline]
    #[must_use]
    pub fn class(&self, name: &str) -> Option<Arc<Class>> {
        self.inner.catalog.read().get(name)
    }

    /// Whether `class` is `parent` or one of its descendants.
    #[inline]
    #[must_use]
    pub fn is_a(&self, class: &str, parent: &str) -> bool {
        self.inner.catalog.read().is_a(class, parent)
    }

    #[inline]
    #[must_use]
    pub fn self_alias(&self) -> String {
        self.inner.self_alias.read().clone()
    }

    pub fn set_self_alias(&self, alias: impl Into<String>) -> &Self {
        *self.inner.self_alias.write() = alias.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn defaults(&self) -> Rule {
        self.inner.registry.read().defaults().clone()
    }

    /// Merges `defaults` into the current defaults.
    /// Rules already registered keep the defaults they were registered with.
    pub fn set_defaults(&self, defaults: &Rule) -> &Self {
        self.inner.registry.write().merge_defaults(defaults);
        self
    }

    /// Effective rule for `name`, see [`Rule`] for the fields and [`Container::set_rule`] for the merge order.
    #[must_use]
    pub fn get_rule(&self, name: &str) -> Rule {
        let catalog = self.inner.catalog.read();
        self.inner.registry.read().get_rule(name, &catalog)
    }

    /// Registers a rule under `name`.
    ///
    /// A rule naming a `class` is first overlaid on the rule of that class (unless it doesn't inherit),
    /// the result is overlaid on the rule currently applying to `name`.
    /// A maker already built for `name` is kept.
    pub fn set_rule(&self, name: &str, definition: impl Into<RuleDefinition>) -> &Self {
        let mut rule: Rule = definition.into().into();

        if let Some(class) = rule.class_override() {
            if rule.inherit.unwrap_or_else(|| self.inner.registry.read().defaults().inherits()) {
                let mut base = self.get_rule(class);
                base.merge(&rule);
                rule = base;
            }
        }

        let mut stored = self.get_rule(name);
        if stored.key() != rule_name(name) {
            stored = stored.identified(name.into());
        }
        stored.merge(&rule);

        {
            let mut tags = self.inner.tags.lock();
            for tag in stored.tags() {
                tags.add(tag, stored.key());
            }
        }

        debug!(name, key = stored.key(), "Rule registered");
        self.inner.registry.write().insert(stored);
        self
    }

    /// Registers every rule in iteration order.
    pub fn register<N, D>(&self, rules: impl IntoIterator<Item = (N, D)>) -> &Self
    where
        N: AsRef<str>,
        D: Into<RuleDefinition>,
    {
        for (name, definition) in rules {
            self.set_rule(name.as_ref(), definition);
        }
        self
    }

    /// Redirects `name` to the rule or instance of `target`.
    pub fn set_alias(&self, name: &str, target: &str) -> &Self {
        self.inner.registry.write().set_alias(name, target);
        self
    }

    /// Canonical key `name` redirects to.
    #[must_use]
    pub fn alias(&self, name: &str) -> Option<String> {
        self.inner.registry.read().alias(name).map(str::to_owned)
    }

    /// Injects a pre-built instance.
    ///
    /// The instance is stored under the rule's name, or the instance's class name when the rule is unnamed,
    /// the rule's alias and tags are applied.
    pub fn instance(&self, value: impl Into<Value>, rule: &Rule) -> &Self {
        self.register_instance(value.into(), rule);
        self
    }

    pub(crate) fn register_instance(&self, value: Value, rule: &Rule) {
        let class_name = match &value {
            Value::Object(object) => object.class_name().to_string(),
            Value::Container(_) => Self::CLASS.into(),
            value => value.type_name().into(),
        };
        let key = if rule.key().is_empty() {
            rule_name(&class_name)
        } else {
            rule.key().to_string()
        };

        if let Some(alias) = rule.alias_name() {
            let alias = match alias {
                Alias::Name(alias) => alias.as_str(),
                Alias::Class => rule.class_override().unwrap_or(&class_name),
            };
            self.inner.registry.write().set_alias_key(rule_name(alias), &key);
        }
        {
            let mut tags = self.inner.tags.lock();
            for tag in rule.tags() {
                tags.add(tag, &key);
            }
        }

        debug!(key = key.as_str(), class = class_name.as_str(), "Instance registered");
        self.inner.store.lock().set(key, value);
    }

    /// Drops the shared instance stored for `name` (or its alias target).
    pub fn remove(&self, name: &str) -> Option<Value> {
        let key = self.instance_key(name)?;
        debug!(key = key.as_str(), "Instance removed");
        self.inner.store.lock().remove(&key)
    }

    /// Whether a shared instance is stored for `name` (or its alias target).
    #[inline]
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.instance_key(name).is_some()
    }

    fn instance_key(&self, name: &str) -> Option<String> {
        let key = rule_name(name);
        let store = self.inner.store.lock();
        if store.has(&key) {
            return Some(key);
        }
        let target = self.inner.registry.read().alias(&key).map(str::to_owned)?;
        store.has(&target).then_some(target)
    }

    fn is_self_reference(&self, name: &str) -> bool {
        rule_name(name) == rule_name(Self::CLASS) || *self.inner.self_alias.read() == name
    }

    /// Resolves `name` without arguments.
    ///
    /// # Errors
    /// See [`Container::make_with`]
    #[inline]
    pub fn make(&self, name: &str) -> Result<Value, ResolveErrorKind> {
        self.make_with(name, Args::new(), &[])
    }

    /// Alias of [`Container::make`].
    ///
    /// # Errors
    /// See [`Container::make_with`]
    #[inline]
    pub fn get(&self, name: &str) -> Result<Value, ResolveErrorKind> {
        self.make(name)
    }

    /// Resolves `name`: the container itself for its class name or self alias, a stored shared instance,
    /// otherwise the value built by the rule's maker from `args` and the `share` pool.
    ///
    /// # Errors
    /// - Returns [`ResolveErrorKind::NoRule`] if neither a factory nor a class is known for the rule
    /// - Returns [`ResolveErrorKind::CannotInstantiate`] if the rule's class is abstract or an interface
    /// - Returns [`ResolveErrorKind::UnresolvedDependency`] if a required class-typed param can't be resolved
    /// - Returns any error raised by a constructor, method or factory body
    pub fn make_with(&self, name: &str, args: impl Into<Args>, share: &[Value]) -> Result<Value, ResolveErrorKind> {
        self.resolve(name, args.into(), share).inspect_err(|err| {
            error!(name, "{}", err);
        })
    }

    /// Best-effort [`Container::make`]: `Null` when neither a rule nor a class can build `name` itself.
    ///
    /// # Errors
    /// Every error of [`Container::make_with`], except [`ResolveErrorKind::NoRule`] raised for `name` or its rule's class
    pub fn make_optional(&self, name: &str) -> Result<Value, ResolveErrorKind> {
        match self.resolve(name, Args::new(), &[]) {
            Err(ResolveErrorKind::NoRule { name: missing })
                if rule_name(&missing) == rule_name(name) || rule_name(&missing) == rule_name(self.get_rule(name).class_name()) =>
            {
                debug!(name, missing = missing.as_str(), "No rule, resolved to null");
                Ok(Value::Null)
            }
            result => result,
        }
    }

    pub(crate) fn resolve(&self, name: &str, args: Args, share: &[Value]) -> Result<Value, ResolveErrorKind> {
        let span = info_span!("make", name);
        let _guard = span.enter();

        if self.is_self_reference(name) {
            debug!("Self reference");
            return Ok(Value::Container(self.clone()));
        }

        if let Some(instance) = self.stored(name) {
            debug!("Found in store");
            return Ok(instance);
        }

        let rule = self.get_rule(name);
        if let Some(instance) = self.inner.store.lock().get(rule.key()) {
            debug!(key = rule.key(), "Found in store");
            return Ok(instance);
        }
        debug!(key = rule.key(), "Not found in store");

        let cached = self.inner.makers.lock().get(rule.key());
        let mut maker = match cached {
            Some(maker) => maker,
            None => {
                let key = rule.key().to_string();
                let maker = build_maker(self, rule)?;
                debug!(key = key.as_str(), "Maker cached");
                self.inner.makers.lock().get_or_insert(key, maker)
            }
        };

        maker.call(MakeRequest {
            container: self.clone(),
            args,
            share: share.to_vec(),
        })
    }

    fn stored(&self, name: &str) -> Option<Value> {
        let key = rule_name(name);
        if let Some(instance) = self.inner.store.lock().get(&key) {
            return Some(instance);
        }
        let target = self.inner.registry.read().alias(&key).map(str::to_owned)?;
        self.inner.store.lock().get(&target)
    }

    /// Instances of every rule tagged with each tag, tag by tag in registration order.
    /// A rule carrying several of the requested tags appears once per tag.
    ///
    /// # Errors
    /// Any error of [`Container::make`] for one of the tagged rules
    pub fn tagged<'a>(&self, tags: impl IntoIterator<Item = &'a str>) -> Result<Vec<Value>, ResolveErrorKind> {
        let keys = self.inner.tags.lock().keys(tags);
        keys.iter().map(|key| self.make(key)).collect()
    }

    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Container) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    #[cfg(test)]
    pub(crate) fn makers_len(&self) -> usize {
        self.inner.makers.lock().len()
    }
}

impl Default for Container {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for Container {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("ptr", &Arc::as_ptr(&self.inner))
            .field("self_alias", &*self.inner.self_alias.read())
            .finish_non_exhaustive()
    }
}
