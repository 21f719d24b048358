use alloc::string::String;

use crate::rule::Rule;

/// Name the container answers to besides its class name, unless changed.
pub const DEFAULT_SELF_ALIAS: &str = "di";

/// Container settings.
/// ## Fields
/// - `self_alias`:
///   Name resolving to the container itself, [`DEFAULT_SELF_ALIAS`] by default.
/// - `defaults`:
///   Rule every resolved rule is filled from. `inherit: true` and `shared: false` apply unless overridden here.
#[derive(Clone, Debug)]
pub struct Config {
    pub self_alias: String,
    pub defaults: Rule,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            self_alias: DEFAULT_SELF_ALIAS.into(),
            defaults: Rule::new(),
        }
    }
}

#[cfg(feature = "serde")]
pub use rules::{AliasConfig, CallConfig, RuleConfig, RulesConfig, TagsConfig};

#[cfg(feature = "serde")]
mod rules {
    use alloc::{string::String, vec, vec::Vec};
    use indexmap::IndexMap;
    use serde::Deserialize;

    use crate::{
        rule::{Alias, Factory, MethodCall, Rule},
        value::Value,
        Container,
    };

    /// Declarative rules by name, registered in document order.
    #[derive(Clone, Debug, Default, Deserialize)]
    #[serde(transparent)]
    pub struct RulesConfig {
        pub rules: IndexMap<String, RuleConfig>,
    }

    /// Serializable form of a [`Rule`]. A `create` string is a call expression.
    #[derive(Clone, Debug, Default, Deserialize)]
    #[serde(default, deny_unknown_fields)]
    pub struct RuleConfig {
        pub class: Option<String>,
        pub create: Option<String>,
        pub shared: Option<bool>,
        pub inherit: Option<bool>,
        pub params: Option<Vec<serde_json::Value>>,
        pub substitutions: Option<IndexMap<String, serde_json::Value>>,
        pub calls: Option<Vec<CallConfig>>,
        pub tags: Option<TagsConfig>,
        pub alias: Option<AliasConfig>,
    }

    /// `"method"`, `"@method"` for a chaining call, or the full form.
    #[derive(Clone, Debug, Deserialize)]
    #[serde(untagged)]
    pub enum CallConfig {
        Short(String),
        Full {
            method: String,
            #[serde(default)]
            args: Vec<serde_json::Value>,
            #[serde(default)]
            chain: bool,
        },
    }

    #[derive(Clone, Debug, Deserialize)]
    #[serde(untagged)]
    pub enum TagsConfig {
        One(String),
        Many(Vec<String>),
    }

    /// `true` aliases the class name, a string aliases that name, `false` means no alias.
    #[derive(Clone, Debug, Deserialize)]
    #[serde(untagged)]
    pub enum AliasConfig {
        Class(bool),
        Name(String),
    }

    impl From<CallConfig> for MethodCall {
        fn from(call: CallConfig) -> Self {
            match call {
                CallConfig::Short(method) => MethodCall::new(method),
                CallConfig::Full { method, args, chain } => {
                    let call = MethodCall::new(method).args(args.into_iter().map(Value::from));
                    if chain {
                        call.chain()
                    } else {
                        call
                    }
                }
            }
        }
    }

    impl From<RuleConfig> for Rule {
        fn from(config: RuleConfig) -> Self {
            let mut rule = Rule::new();
            rule.class = config.class;
            rule.create = config.create.map(Factory::Expression);
            rule.shared = config.shared;
            rule.inherit = config.inherit;
            rule.params = config.params.map(|params| params.into_iter().map(Value::from).collect());
            rule.substitutions = config
                .substitutions
                .map(|substitutions| substitutions.into_iter().map(|(class, value)| (class, value.into())).collect());
            rule.calls = config.calls.map(|calls| calls.into_iter().map(Into::into).collect());
            rule.tags = config.tags.map(|tags| match tags {
                TagsConfig::One(tag) => vec![tag],
                TagsConfig::Many(tags) => tags,
            });
            rule.alias = match config.alias {
                Some(AliasConfig::Class(true)) => Some(Alias::Class),
                Some(AliasConfig::Name(name)) => Some(Alias::Name(name)),
                Some(AliasConfig::Class(false)) | None => None,
            };
            rule
        }
    }

    impl Container {
        /// Registers declarative rules in document order.
        pub fn load(&self, config: RulesConfig) -> &Self {
            self.register(config.rules.into_iter().map(|(name, rule)| (name, Rule::from(rule))))
        }
    }

}
