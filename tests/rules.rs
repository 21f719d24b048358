mod common;

use wirebox::{Alias, Args, CallTarget, Rule, RulesConfig, Value};

#[test]
fn test_rule_lookup_is_case_insensitive() {
    let container = common::container();
    container.set_rule("Foo", Rule::new().class("D").shared(true).tag("foo"));

    for name in ["Foo", "foo", "\\Foo", "FOO"] {
        let rule = container.get_rule(name);
        assert_eq!(rule.key(), "foo");
        assert_eq!(rule.class_name(), "D");
        assert!(rule.is_shared());
    }
}

#[test]
fn test_rule_defaults() {
    let container = common::container();

    let rule = container.get_rule("Anything");
    assert_eq!(rule.name(), "Anything");
    assert_eq!(rule.key(), "anything");
    assert!(!rule.is_shared());
    assert!(rule.inherits());
    assert!(rule.param_values().is_empty());

    container.set_defaults(&Rule::new().shared(true));
    assert!(container.get_rule("Anything").is_shared());
    assert!(container.defaults().inherits());
}

#[test]
fn test_di_with_defaults() {
    let container = common::container();

    container.set_defaults(&Rule::new().shared(true));
    container.set_rule("datetime", Rule::new());

    let date = container.make("datetime").unwrap();
    assert_eq!(date.as_object().unwrap().class_name(), "DateTime");
    assert_eq!(date, container.make("DateTime").unwrap());
}

#[test]
fn test_di_inherit() {
    let container = common::container();
    container.set_rule("datetime", Rule::new().shared(true));
    container.set_rule("my_date", "DateTime");

    let date = container.make("datetime").unwrap();
    let my_date = container.make("my_date").unwrap();

    assert_eq!(my_date.as_object().unwrap().class_name(), "DateTime");
    assert_eq!(date, container.make("datetime").unwrap());
    assert_eq!(my_date, container.make("my_date").unwrap());
    assert_ne!(date, my_date);
}

#[test]
fn test_class_rule_without_inherit() {
    let container = common::container();
    container.set_rule("datetime", Rule::new().shared(true));
    container.set_rule("fresh_date", Rule::new().class("DateTime").inherit(false));

    assert!(!container.get_rule("fresh_date").is_shared());
    assert_ne!(container.make("fresh_date").unwrap(), container.make("fresh_date").unwrap());
}

#[test]
fn test_rule_merge_on_update() {
    let container = common::container();
    container.set_rule("my_obj", Rule::new().shared(true));

    let rule = container.get_rule("my_obj");
    assert!(rule.factory().is_some());
    assert!(rule.is_shared());
    assert_eq!(container.make("my_obj").unwrap(), container.make("my_obj").unwrap());
}

#[test]
fn test_wildcard_rule() {
    let container = common::container();
    container.set_rule("*", Rule::new().shared(true));

    assert_eq!(container.make("D").unwrap(), container.make("d").unwrap());
    assert!(container.has("d"));
    assert!(!container.has("*"));
}

#[test]
fn test_first_inherited_rule_wins() {
    let container = common::container();
    container.define(wirebox::Class::interface("Marker"));
    container.define(wirebox::Class::new("Marked").extends("D").implements("Marker"));
    container.register([
        ("Marker", Rule::new().params([Value::Int(1)])),
        ("D", Rule::new().params([Value::Int(2)])),
    ]);

    assert_eq!(container.get_rule("Marked").param_values(), &[Value::Int(1)]);
    assert_eq!(container.get_rule("Marked").name(), "Marked");
}

#[test]
fn test_rule_alias() {
    let container = common::container();
    container.set_rule("foo", Rule::new().class("MethodWithDefaultNull").alias_class().shared(true));

    let date = container.make("DateTime").unwrap();
    let date2 = container.make("datetime").unwrap();
    let foo = container.make("foo").unwrap();
    let foo2 = container.make("MethodWithDefaultNull").unwrap();

    assert_ne!(date, date2);
    assert_eq!(foo, foo2);
    assert_eq!(container.alias("methodwithdefaultnull").as_deref(), Some("foo"));
}

#[test]
fn test_named_alias_and_set_alias() {
    let container = common::container();
    container.set_rule("mailer", Rule::new().class("D").alias("postman").shared(true));
    container.set_alias("courier", "postman");

    let mailer = container.make("mailer").unwrap();

    assert_eq!(container.make("postman").unwrap(), mailer);
    assert_eq!(container.make("Courier").unwrap(), mailer);
    assert_eq!(container.get_rule("postman").key(), "mailer");
    assert_eq!(container.alias("courier").as_deref(), Some("mailer"));
    assert_eq!(container.get_rule("mailer").alias_name(), Some(&Alias::Name("postman".into())));
}

#[test]
fn test_tagged() {
    let container = common::container();
    container.set_defaults(&Rule::new().shared(true));
    container.set_rule("foo", Rule::new().tag("tag").class("stdClass"));
    container.set_rule("bar", Rule::new().tag("tag").tag("other").class("stdClass"));
    container.set_rule("baz", Rule::new().tag("tag").class("stdClass"));

    let foo = container.make("foo").unwrap();
    let bar = container.make("bar").unwrap();
    let baz = container.make("baz").unwrap();

    assert_eq!(container.tagged(["tag"]).unwrap(), [foo.clone(), bar.clone(), baz.clone()]);
    assert_eq!(container.tagged(["other", "tag"]).unwrap(), [bar.clone(), foo, bar, baz]);
    assert!(container.tagged(["missing"]).unwrap().is_empty());
}

#[test]
fn test_tagged_instances() {
    let container = common::container();
    let d = container.make("D").unwrap();
    container.instance(d.clone(), &Rule::named("first_d").tag("ds"));
    container.instance(d.clone(), &Rule::named("second_d").tag("ds"));

    assert_eq!(container.tagged(["ds"]).unwrap(), [d.clone(), d]);
}

#[test]
fn test_removed_instance_is_rebuilt() {
    let container = common::container();
    container.set_rule("D", Rule::new().shared(true));

    let d = container.make("D").unwrap();
    assert_eq!(container.remove("d"), Some(d.clone()));
    assert_eq!(container.remove("d"), None);

    let rebuilt = container.make("D").unwrap();
    assert_ne!(rebuilt, d);
    assert_eq!(rebuilt, container.make("D").unwrap());
}

#[test]
fn test_cached_maker_outlives_rule_update() {
    let container = common::container();
    container.set_rule("Shelf", Rule::new().params([Value::Int(1)]));

    let shelf = container.make("Shelf").unwrap();
    container.set_rule("Shelf", Rule::new().params([Value::Int(2)]));
    let updated = container.make("Shelf").unwrap();

    let books = |value: &Value| value.as_object().unwrap().get("books");
    assert_eq!(books(&shelf), books(&updated));
    assert_eq!(container.get_rule("Shelf").param_values(), &[Value::Int(2)]);
}

#[test]
fn test_load_rules() {
    let container = common::container();
    let config: RulesConfig = serde_json::from_str(
        r#"{
            "my_date": {"class": "DateTime"},
            "today": {"class": "DateTime", "shared": true, "calls": [{"method": "@format", "args": ["Y-m-d"]}]},
            "shared_f": {"class": "F", "shared": true, "alias": "the_f", "tags": ["fs"]}
        }"#,
    )
    .unwrap();
    container.load(config);

    let date = container.make("my_date").unwrap();
    let date2 = container.make("my_date").unwrap();
    let date3 = container.make_with("my_date", Args::new().arg("tomorrow"), &[]).unwrap();
    let format = |value: &Value| {
        let target = CallTarget::Method {
            receiver: value.clone(),
            method: "format".into(),
        };
        container.call(target, Args::new().arg("Y-m-d")).unwrap()
    };

    assert_ne!(date, date2);
    assert_eq!(format(&date), Value::from(common::today()));
    assert_eq!(format(&date3), Value::from(common::tomorrow()));

    assert_eq!(container.make("today").unwrap(), Value::from(common::today()));
    assert_eq!(container.make("the_f").unwrap(), container.make("shared_f").unwrap());
    assert_eq!(container.tagged(["fs"]).unwrap().len(), 1);
}
