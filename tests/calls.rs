mod common;

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use wirebox::{Args, BuiltinType, CallTarget, Callback, Function, Param, ResolveErrorKind, Rule, Signature, Value};

fn joined(values: &[Value]) -> String {
    values.iter().filter_map(Value::to_text).collect::<Vec<_>>().join(":")
}

#[test]
fn test_call_expression() {
    let container = common::container();
    container.set_rule("my_obj", Rule::new().shared(true));
    let my_obj = container.make("my_obj").unwrap();

    for expression in ["Box:foo", "Box::foo"] {
        assert_eq!(
            container.call_expression(expression).unwrap(),
            CallTarget::Static {
                class: "Box".into(),
                method: "foo".into(),
            }
        );
    }
    for expression in ["my_obj@foo", "my_obj@@foo"] {
        assert_eq!(
            container.call_expression(expression).unwrap(),
            CallTarget::Method {
                receiver: my_obj.clone(),
                method: "foo".into(),
            }
        );
    }

    let err = container.call_expression("foo").unwrap_err();
    assert!(matches!(&err, ResolveErrorKind::InvalidCallExpression { expression } if expression == "foo"));
    assert_eq!(err.to_string(), "Invalid call expression: foo");

    assert!(matches!(container.call_expression("D"), Err(ResolveErrorKind::InvalidCallExpression { .. })));
}

#[test]
fn test_call_expression_invokable() {
    let container = common::container();

    assert!(matches!(container.call_expression("Greeter"), Ok(CallTarget::Method { method, .. }) if method == wirebox::INVOKE));
    assert_eq!(container.call("Greeter", Args::new().arg("Ann")).unwrap(), Value::from("Hello, Ann"));
    assert_eq!(container.call("greeter", Args::new()).unwrap(), Value::from("Hello, world"));

    let greeter = container.make("Greeter").unwrap();
    greeter.as_object().unwrap().set("greeting", "Hi");
    assert_eq!(
        container.call(greeter.as_object().unwrap().clone(), Args::new().arg("Bob")).unwrap(),
        Value::from("Hi, Bob")
    );
}

#[test]
fn test_call() {
    let container = common::container();
    let format = "Y-m-d";

    assert_eq!(container.call("datetime@format", Args::new().arg(format)).unwrap(), Value::from(common::today()));
    assert_eq!(
        container.call_arguments("datetime@format", [Value::from(format)], &[]).unwrap(),
        Value::from(common::today())
    );
}

#[test]
fn test_call_named_arguments() {
    let container = common::container();
    let callback = Function::new(
        Signature::new()
            .param(Param::container("di"))
            .param(Param::new("foo").builtin(BuiltinType::String))
            .param(Param::new("bar").builtin(BuiltinType::Int))
            .param(Param::new("rest").variadic()),
        |params| {
            assert!(params[0].as_container().is_some());
            Ok(format!("{}-{}-{}", params[1].to_text().unwrap_or_default(), params[2].to_text().unwrap_or_default(), joined(params.rest(3))).into())
        },
    );
    let args = Args::new().arg(22).arg(23).named("bar", "1").named("foo", "foo");

    assert_eq!(container.call_arguments(callback, args, &[]).unwrap(), Value::from("foo-1-22:23"));
}

#[test]
fn test_param_resolution_order() {
    let container = common::container();
    let std_object = |property: &str, value: i64| {
        let object = common::std_object(&container).unwrap();
        object.set(property, value);
        Value::Object(object)
    };
    let callback = Function::new(
        Signature::new()
            .param(Param::container("di"))
            .param(Param::new("a").class("stdClass"))
            .param(Param::new("b").class("stdClass"))
            .param(Param::new("c").class("stdClass"))
            .param(Param::new("foo").builtin(BuiltinType::String))
            .param(Param::new("mixed"))
            .param(Param::new("tomorrow").class("DateTime"))
            .param(Param::new("numbers").builtin(BuiltinType::Int).variadic()),
        |params| {
            let property = |index: usize, name: &str| params[index].as_object().unwrap().get(name).to_text().unwrap_or_default();
            let tomorrow = params[6]
                .as_object()
                .unwrap()
                .class()
                .name()
                .to_owned();
            Ok(Value::List(vec![
                Value::from(if params[0].as_container().is_some() { "ok" } else { "nok" }),
                Value::from(property(1, "one")),
                Value::from(property(2, "two")),
                Value::from(property(3, "three")),
                params[4].clone(),
                params[5].clone(),
                Value::from(joined(params.rest(7))),
                Value::from(tomorrow),
            ]))
        },
    );
    let args = Args::from(vec![
        Value::from("foo"),
        Value::from("any"),
        Value::Int(11),
        Value::Int(12),
        Value::Int(13),
        std_object("one", 1),
        std_object("two", 2),
        std_object("three", 3),
    ]);
    let tomorrow = container.make_with("DateTime", Args::new().arg("tomorrow"), &[]).unwrap();

    let actual = container.call_arguments(callback, args, &[tomorrow]).unwrap();

    assert_eq!(joined(actual.as_list().unwrap()), "ok:1:2:3:foo:any:11:12:13:DateTime");
}

#[test]
fn test_chain() {
    let container = common::container();
    container.set_rule(
        "today",
        Rule::new()
            .shared(true)
            .class("DateTime")
            .call(wirebox::MethodCall::new("@format").arg(common::TODAY_FORMAT)),
    );
    container.set_rule("call", Rule::new().class("CallA").call("@getF").call("@callMe"));

    let today = Value::from(common::today());

    assert_eq!(container.make("today").unwrap(), today);
    assert_eq!(container.make("today").unwrap(), today);
    assert_eq!(container.make("call").unwrap(), Value::from("F get called"));
}

#[test]
fn test_shared_chain_runs_once() {
    let container = common::container();
    let stamps = Arc::new(AtomicUsize::new(0));
    container.define(wirebox::Class::new("Stamper").method("stamp", Signature::new(), {
        let stamps = stamps.clone();
        move |_, _| Ok(Value::Int(stamps.fetch_add(1, Ordering::SeqCst) as i64 + 1))
    }));
    container.set_rule("stamp", Rule::new().shared(true).class("Stamper").call("@stamp"));
    container.set_rule("fresh_stamp", Rule::new().class("Stamper").call("@stamp"));

    assert_eq!(container.make("stamp").unwrap(), Value::Int(1));
    assert_eq!(container.make("stamp").unwrap(), Value::Int(1));
    assert_eq!(stamps.load(Ordering::SeqCst), 1);

    assert_eq!(container.make("fresh_stamp").unwrap(), Value::Int(2));
    assert_eq!(container.make("fresh_stamp").unwrap(), Value::Int(3));
    assert_eq!(stamps.load(Ordering::SeqCst), 3);
}

#[test]
fn test_non_chaining_calls_keep_object() {
    let container = common::container();
    container.set_rule(
        "next_week",
        Rule::new().class("DateTime").call(wirebox::MethodCall::new("modify").arg("+7 days")),
    );

    let date = container.make("next_week").unwrap();

    assert_eq!(date.as_object().unwrap().class_name(), "DateTime");
}

#[test]
fn test_undefined_call() {
    let container = common::container();

    let err = container.call("F@missing", Args::new()).unwrap_err();
    assert!(matches!(&err, ResolveErrorKind::UndefinedCall { class, method } if class == "F" && method == "missing"));
    assert_eq!(err.to_string(), "Call to undefined method F::missing");

    // instance method called statically
    assert!(matches!(container.call("F:callMe", Args::new()), Err(ResolveErrorKind::UndefinedCall { .. })));
    assert!(matches!(container.call("Unknown:build", Args::new()), Err(ResolveErrorKind::UndefinedCall { .. })));

    let receiver = CallTarget::Method {
        receiver: Value::Int(1),
        method: "format".into(),
    };
    assert!(matches!(container.call(receiver, Args::new()), Err(ResolveErrorKind::UndefinedCall { class, .. }) if class == "int"));

    container.set_rule("broken_chain", Rule::new().class("F").call("@callMe").call("callMe"));
    assert!(matches!(container.make("broken_chain"), Err(ResolveErrorKind::UndefinedCall { class, .. }) if class == "string"));
}

#[test]
fn test_static_call_and_factory_expression() {
    let container = common::container();

    let built = container.call("Shelf::build", Args::new().arg("label")).unwrap();
    let built = built.as_list().unwrap();
    assert_eq!(built[0].as_object().unwrap().class_name(), "F");
    assert_eq!(built[1], Value::from("label"));

    container.set_rule("shelf_parts", "Shelf:build");
    let parts = container.make("shelf_parts").unwrap();
    assert_eq!(parts.as_list().unwrap()[1], Value::from("shelf"));

    container.set_rule("books", Rule::new().class("Shelf").params([Value::Int(1), Value::Int(2)]));
    container.set_rule("book_count", "books@count");
    assert_eq!(container.make("book_count").unwrap(), Value::Int(2));
}

#[test]
fn test_call_receives_self() {
    let container = common::container();
    let callback = Function::new(Signature::new().param(Param::container("di")), |params| Ok(params[0].clone()));

    let resolved = container.call(Callback::from(callback), Args::new()).unwrap();

    assert!(resolved.as_container().unwrap().ptr_eq(&container));
}

#[test]
fn test_inherited_invoke_handler() {
    let container = common::container();
    container.define(wirebox::Class::new("PoliteGreeter").extends("Greeter"));

    assert!(matches!(container.call_expression("PoliteGreeter"), Ok(CallTarget::Method { method, .. }) if method == wirebox::INVOKE));
    assert_eq!(container.call("PoliteGreeter", Args::new().arg("Ann")).unwrap(), Value::from("Hello, Ann"));

    let callback = Function::new(
        Signature::new().param(Param::new("greeter").builtin(BuiltinType::Callable)),
        |params| Ok(Value::from(params[0].as_object().map_or("", |object| object.class_name()))),
    );
    let greeter = container.make("PoliteGreeter").unwrap();
    let args = Args::new().arg("not callable").arg(greeter);
    assert_eq!(container.call(callback, args).unwrap(), Value::from("PoliteGreeter"));

    container.set_rule("Shelf", Rule::new().params([container.make("PoliteGreeter").unwrap()]));
    let shelf = container.make("Shelf").unwrap();
    assert_eq!(shelf.as_object().unwrap().get("books"), Value::List(vec![Value::from("Hello, world")]));
}
