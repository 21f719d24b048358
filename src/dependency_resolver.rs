use alloc::{vec, vec::Vec};
use tracing::debug;

use crate::{
    args::Args,
    call::Callback,
    errors::ResolveErrorKind,
    function::Params,
    object::ObjectRef,
    reflection::{BuiltinType, Param, Signature, TypeHint},
    rule::{rule_name, Rule},
    value::Value,
    Container,
};

const CLOSURE_CLASS: &str = "Closure";

/// Whether `value` satisfies a class/interface declaration.
pub(crate) fn is_instance(container: &Container, value: &Value, class: &str) -> bool {
    match value {
        Value::Object(object) => container.inner.catalog.read().is_a(object.class_name(), class),
        Value::Container(_) => rule_name(class) == rule_name(Container::CLASS),
        Value::Function(_) => rule_name(class) == rule_name(CLOSURE_CLASS),
        _ => false,
    }
}

/// Whether `object` can be called, through its own invoke handler or an inherited one.
pub(crate) fn is_invokable(container: &Container, object: &ObjectRef) -> bool {
    container.inner.catalog.read().invoker_of(object.class()).is_some()
}

/// [`Value::matches`] with callable objects checked against the whole ancestry.
fn matches_builtin(container: &Container, value: &Value, builtin: BuiltinType) -> bool {
    match (value, builtin) {
        (Value::Object(object), BuiltinType::Callable) => is_invokable(container, object),
        (value, builtin) => value.matches(builtin),
    }
}

/// Expands a rule-provided value before it is bound:
/// lists and maps are expanded item by item, callables are invoked with the shared pool,
/// service references are resolved, and strings are either cast or, with `create_from_string`,
/// resolved as service names.
pub(crate) fn expand(container: &Container, value: Value, share: &[Value], create_from_string: bool) -> Result<Value, ResolveErrorKind> {
    match value {
        Value::List(values) => values
            .into_iter()
            .map(|value| expand(container, value, share, false))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        Value::Map(values) => values
            .into_iter()
            .map(|(key, value)| expand(container, value, share, false).map(|value| (key, value)))
            .collect::<Result<_, _>>()
            .map(Value::Map),
        Value::Function(function) => container.invoke_callback(Callback::Function(function), Args::new(), share),
        Value::Object(object) if is_invokable(container, &object) => {
            container.invoke_callback(Callback::Invokable(object), Args::new(), share)
        }
        Value::Str(name) if create_from_string => container.resolve(&name, Args::new(), share),
        Value::Str(text) => Ok(Value::cast(&text)),
        Value::Service(name) => container.resolve(&name, Args::new(), share),
        value => Ok(value),
    }
}

pub(crate) fn expand_all(container: &Container, values: &[Value], share: &[Value]) -> Result<Vec<Value>, ResolveErrorKind> {
    values
        .iter()
        .map(|value| expand(container, value.clone(), share, false))
        .collect()
}

/// Binds a signature to concrete arguments.
///
/// `args` is the positional/named pool (the rule's params are appended to it),
/// `share` the context pool propagated down through nested resolution.
/// `target` only names the callee in errors.
pub(crate) fn resolve_params(
    container: &Container,
    signature: &Signature,
    rule: Option<&Rule>,
    mut args: Args,
    share: &[Value],
    target: &str,
) -> Result<Params, ResolveErrorKind> {
    if let Some(rule) = rule {
        args.extend(expand_all(container, rule.param_values(), share)?);
    }

    let mut share = share.to_vec();
    let mut params = Vec::with_capacity(signature.params().len());
    for param in signature.params() {
        params.extend(resolve_param(container, param, rule, &mut args, &mut share, target)?);
    }

    Ok(Params(params))
}

fn resolve_param(
    container: &Container,
    param: &Param,
    rule: Option<&Rule>,
    args: &mut Args,
    share: &mut Vec<Value>,
    target: &str,
) -> Result<Vec<Value>, ResolveErrorKind> {
    let mut failure = None;

    if param.types().is_empty() {
        if let Some(values) = resolve_hint(container, param, None, rule, args, share, &mut failure)? {
            return Ok(values);
        }
    }
    for hint in param.types() {
        if let Some(values) = resolve_hint(container, param, Some(hint), rule, args, share, &mut failure)? {
            return Ok(values);
        }
    }

    match failure {
        Some(source) if !param.allows_null() => {
            let err = ResolveErrorKind::UnresolvedDependency {
                param: param.name().into(),
                target: target.into(),
                source: source.into(),
            };
            debug!("{}", err);
            Err(err)
        }
        _ => Ok(vec![Value::Null]),
    }
}

/// Tries one alternative of the declared type.
/// `Ok(None)` means this alternative couldn't be satisfied, the reason is left in `failure`.
#[allow(clippy::too_many_arguments)]
fn resolve_hint(
    container: &Container,
    param: &Param,
    hint: Option<&TypeHint>,
    rule: Option<&Rule>,
    args: &mut Args,
    share: &mut Vec<Value>,
    failure: &mut Option<ResolveErrorKind>,
) -> Result<Option<Vec<Value>>, ResolveErrorKind> {
    let class = hint.and_then(TypeHint::class_name);

    if let Some(class) = class {
        let accepts = |value: &Value| is_instance(container, value, class) || (value.is_null() && param.allows_null());

        if let Some(index) = args.position(accepts) {
            return Ok(Some(vec![args.take(index)]));
        }
        if let Some(index) = share.iter().position(accepts) {
            return Ok(Some(vec![share.remove(index)]));
        }
    }

    if param.is_variadic() {
        return Ok(Some(args.drain()));
    }

    if let Some(class) = class {
        let resolved = match rule.and_then(|rule| rule.substitution(class)) {
            Some(substitution) => expand(container, substitution.clone(), share, true),
            None if param.allows_null() => Ok(Value::Null),
            None => container.resolve(class, Args::new(), share),
        };

        return match resolved {
            Ok(value) => Ok(Some(vec![value])),
            Err(err) if err.is_cannot_instantiate() || err.is_no_rule() => {
                debug!(param = param.name(), class, "{}", err);
                *failure = Some(err);
                Ok(None)
            }
            Err(err) => Err(err),
        };
    }

    if let Some(value) = args.take_named(param.name()) {
        return Ok(Some(vec![value]));
    }

    if let Some(TypeHint::Builtin(builtin)) = hint {
        if let Some(index) = args.position(|value| matches_builtin(container, value, *builtin)) {
            return Ok(Some(vec![args.take(index)]));
        }
    }

    if let Some(value) = args.shift() {
        return Ok(Some(vec![expand(container, value, share, false)?]));
    }

    Ok(Some(vec![param.default_value().cloned().unwrap_or_default()]))
}
