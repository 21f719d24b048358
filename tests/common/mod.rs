#![allow(dead_code)]

use chrono::{Days, Local, NaiveDate, NaiveDateTime, NaiveTime};
use wirebox::{BuiltinType, Class, Container, Function, InstantiateErrorKind, ObjectRef, Param, Signature, Value};

pub const TODAY_FORMAT: &str = "Y-m-d";

/// Container with every fixture class defined and the `my_obj` factory registered.
pub fn container() -> Container {
    let container = Container::new();
    define_fixtures(&container);
    container.set_rule(
        "my_obj",
        Function::new(Signature::new().param(Param::container("di")), |params| {
            let container = params[0].as_container().cloned().ok_or_else(|| InstantiateErrorKind::InvalidArgument {
                name: "di".into(),
                expected: "container",
                actual: params[0].type_name(),
            })?;
            let object = std_object(&container)?;
            object.set("di", container);
            Ok(Value::Object(object))
        }),
    );
    container
}

pub fn std_object(container: &Container) -> Result<ObjectRef, InstantiateErrorKind> {
    let class = container
        .class("stdClass")
        .ok_or_else(|| anyhow::anyhow!("stdClass is not defined"))?;
    Ok(ObjectRef::new(class))
}

pub fn define_fixtures(container: &Container) {
    container.define(Class::new("stdClass"));

    container.define(Class::new("CyclicA").promote(Signature::new().param(Param::new("b").class("CyclicB"))));
    container.define(Class::new("CyclicB").promote(Signature::new().param(Param::new("a").class("CyclicA"))));

    container.define(Class::new("A").promote(Signature::new().param(Param::new("b").class("B"))));
    container.define(Class::new("B").promote(Signature::new().param(Param::new("c").class("C"))));
    container.define(Class::new("C").promote(
        Signature::new()
            .param(Param::new("d").class("D"))
            .param(Param::new("e").class("E")),
    ));
    container.define(Class::new("D"));
    container.define(Class::new("E").promote(Signature::new().param(Param::new("f").class("F"))));
    let f = container.define(Class::new("F").method("callMe", Signature::new(), |_, _| Ok("F get called".into())));
    container.define(Class::new("BExtended").extends("B"));

    container.define(
        Class::new("CallA")
            .constructor(Signature::new(), move |this, _| {
                this.set("f", ObjectRef::new(f.clone()));
                Ok(())
            })
            .method("getF", Signature::new(), |this, _| Ok(this.get("f"))),
    );

    container.define(Class::new("MethodWithDefaultNull").promote(
        Signature::new()
            .param(Param::new("a").class("A"))
            .param(Param::new("b").class("B").nullable().default(Value::Null)),
    ));

    container.define(Class::new("DependsDi").promote(Signature::new().param(Param::container("di"))));

    container.define(
        Class::new("Greeter").invokable(
            Signature::new().param(Param::new("name").builtin(BuiltinType::String).default("world")),
            |this, params| {
                let greeting = this.get("greeting").as_str().unwrap_or("Hello").to_owned();
                Ok(format!("{greeting}, {}", params.str(0, "name")?).into())
            },
        ),
    );

    container.define(
        Class::new("Shelf")
            .promote(Signature::new().param(Param::new("books").variadic()))
            .static_method(
                "build",
                Signature::new().param(Param::new("f").class("F")).param(Param::new("label").default("shelf")),
                |params| Ok(Value::List(params.into_inner())),
            )
            .method("count", Signature::new(), |this, _| {
                Ok(Value::Int(this.get("books").as_list().map_or(0, <[Value]>::len) as i64))
            }),
    );

    define_date_time(container);
}

/// `DateTime` backed by a chrono value, formats with the usual `Y-m-d H:i:s` letters.
pub fn define_date_time(container: &Container) {
    container.define(Class::interface("DateTimeInterface"));
    container.define(
        Class::new("DateTime")
            .implements("DateTimeInterface")
            .constructor(
                Signature::new().param(Param::new("datetime").builtin(BuiltinType::String).default("now")),
                |this, params| {
                    this.set_native(parse_date_time(params.str(0, "datetime")?)?);
                    Ok(())
                },
            )
            .method(
                "format",
                Signature::new().param(Param::new("format").builtin(BuiltinType::String)),
                |this, params| {
                    let format = translate_format(params.str(0, "format")?);
                    this.with_native(|value: &NaiveDateTime| value.format(&format).to_string().into())
                        .ok_or_else(|| anyhow::anyhow!("DateTime is not constructed").into())
                },
            )
            .method(
                "modify",
                Signature::new().param(Param::new("modifier").builtin(BuiltinType::String)),
                |this, params| {
                    let days = parse_days(params.str(0, "modifier")?)?;
                    let current = this
                        .with_native(|value: &NaiveDateTime| *value)
                        .ok_or_else(|| anyhow::anyhow!("DateTime is not constructed"))?;
                    this.set_native(shift_days(current, days)?);
                    Ok(Value::Object(this.clone()))
                },
            ),
    );
}

pub fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

pub fn tomorrow() -> String {
    (Local::now().date_naive() + Days::new(1)).format("%Y-%m-%d").to_string()
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

fn parse_date_time(text: &str) -> Result<NaiveDateTime, InstantiateErrorKind> {
    let now = Local::now().naive_local();
    Ok(match text {
        "now" | "" => now,
        "today" => midnight(now.date()),
        "tomorrow" => shift_days(midnight(now.date()), 1)?,
        "yesterday" => shift_days(midnight(now.date()), -1)?,
        text => match NaiveDate::parse_from_str(text, "%Y-%m-%d") {
            Ok(date) => midnight(date),
            Err(_) => shift_days(now, parse_days(text)?)?,
        },
    })
}

fn parse_days(modifier: &str) -> Result<i64, InstantiateErrorKind> {
    let count = modifier.trim().trim_end_matches('s').trim_end_matches("day").trim();
    count
        .parse::<i64>()
        .map_err(|_| anyhow::anyhow!("Unsupported date modifier: {modifier}").into())
}

fn shift_days(value: NaiveDateTime, days: i64) -> Result<NaiveDateTime, InstantiateErrorKind> {
    let shifted = if days >= 0 {
        value.checked_add_days(Days::new(days.unsigned_abs()))
    } else {
        value.checked_sub_days(Days::new(days.unsigned_abs()))
    };
    shifted.ok_or_else(|| anyhow::anyhow!("Date out of range").into())
}

fn translate_format(format: &str) -> String {
    let mut translated = String::with_capacity(format.len() * 2);
    for char in format.chars() {
        match char {
            'Y' => translated.push_str("%Y"),
            'm' => translated.push_str("%m"),
            'd' => translated.push_str("%d"),
            'H' => translated.push_str("%H"),
            'i' => translated.push_str("%M"),
            's' => translated.push_str("%S"),
            '%' => translated.push_str("%%"),
            char => translated.push(char),
        }
    }
    translated
}
