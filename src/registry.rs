use alloc::string::String;
use indexmap::IndexMap;

use crate::{
    reflection::ClassCatalog,
    rule::{rule_name, Alias, Rule},
};

const WILDCARD: &str = "*";

/// Rules by canonical key, in registration order, plus the alias redirects.
#[derive(Clone, Debug)]
pub(crate) struct RuleRegistry {
    rules: IndexMap<String, Rule>,
    aliases: IndexMap<String, String>,
    defaults: Rule,
}

impl RuleRegistry {
    #[must_use]
    pub(crate) fn new(defaults: &Rule) -> Self {
        let mut base = Rule::new().inherit(true).shared(false);
        base.merge(defaults);

        Self {
            rules: IndexMap::new(),
            aliases: IndexMap::new(),
            defaults: base,
        }
    }

    #[inline]
    #[must_use]
    pub(crate) fn defaults(&self) -> &Rule {
        &self.defaults
    }

    #[inline]
    pub(crate) fn merge_defaults(&mut self, defaults: &Rule) {
        self.defaults.merge(defaults);
    }

    /// Effective rule for `name`, lookup order:
    /// the rule stored under the literal name, under the canonical name, under the alias target,
    /// the first inheritable rule of a parent class, the `*` rule, an empty rule.
    /// Rules found by inheritance or fallback take the requested identity.
    #[must_use]
    pub(crate) fn get_rule(&self, name: &str, catalog: &ClassCatalog) -> Rule {
        let key = rule_name(name);

        let mut rule = self
            .rules
            .get(name)
            .or_else(|| self.rules.get(&key))
            .or_else(|| self.aliases.get(&key).and_then(|target| self.rules.get(target)))
            .cloned()
            .or_else(|| {
                self.rules
                    .iter()
                    .find(|(parent, rule)| {
                        parent.as_str() != WILDCARD && rule.class.is_none() && rule.inherits() && catalog.is_subclass_of(name, parent)
                    })
                    .map(|(_, rule)| rule.clone().identified(name.into()))
            })
            .or_else(|| self.rules.get(WILDCARD).map(|rule| rule.clone().identified(name.into())))
            .unwrap_or_else(|| Rule::named(name));

        rule.fill(&self.defaults);
        rule
    }

    /// Stores an already merged rule under its canonical key and applies its alias.
    pub(crate) fn insert(&mut self, rule: Rule) {
        let key: String = rule.key().into();

        if let Some(alias) = rule.alias_name() {
            let alias = match alias {
                Alias::Name(alias) => alias.as_str(),
                Alias::Class => rule.class_name(),
            };
            self.set_alias_key(rule_name(alias), &key);
        }

        self.rules.insert(key, rule);
    }

    pub(crate) fn set_alias_key(&mut self, alias: String, key: &str) {
        if alias != key {
            self.aliases.insert(alias, key.into());
        }
    }

    /// Redirects `name` to `target`, following an alias `target` may already have.
    pub(crate) fn set_alias(&mut self, name: &str, target: &str) {
        let target = rule_name(target);
        let target = self.aliases.get(&target).cloned().unwrap_or(target);
        self.set_alias_key(rule_name(name), &target);
    }

    #[inline]
    #[must_use]
    pub(crate) fn alias(&self, name: &str) -> Option<&str> {
        self.aliases.get(&rule_name(name)).map(String::as_str)
    }
}
