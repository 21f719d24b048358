use alloc::{format, sync::Arc, vec::Vec};
use tracing::debug;

use crate::{
    args::Args,
    call::{CallTarget, Callback, Invocable},
    dependency_resolver::{expand_all, resolve_params},
    errors::ResolveErrorKind,
    object::ObjectRef,
    reflection::{Class, Constructor, ContainerAwareHook},
    rule::{Factory, Rule},
    service::{service_fn, BoxCloneService},
    value::Value,
    Container,
};

/// Input of a maker. The container travels with the request so cached makers never own it.
pub(crate) struct MakeRequest {
    pub(crate) container: Container,
    pub(crate) args: Args,
    pub(crate) share: Vec<Value>,
}

pub(crate) type BoxedMaker = BoxCloneService<MakeRequest, Value, ResolveErrorKind>;

/// Builds the maker for a resolved rule.
///
/// # Errors
/// - Returns [`ResolveErrorKind::NoRule`] if the rule has no factory and its class is not in the catalog
/// - Returns any error raised while resolving a factory's call expression
pub(crate) fn build_maker(container: &Container, rule: Rule) -> Result<BoxedMaker, ResolveErrorKind> {
    if let Some(factory) = rule.factory().cloned() {
        return factory_maker(container, factory, rule);
    }

    let (class, constructor, hook) = {
        let catalog = container.inner.catalog.read();
        let Some(class) = catalog.get(rule.class_name()) else {
            let err = ResolveErrorKind::NoRule {
                name: rule.class_name().into(),
            };
            debug!("{}", err);
            return Err(err);
        };
        let constructor = catalog.constructor_of(&class);
        let hook = catalog.container_hook_of(&class);
        (class, constructor, hook)
    };

    if !class.is_instantiable() {
        debug!(class = class.name(), kind = %class.kind(), "Built failing maker");
        return Ok(BoxCloneService::new(service_fn(move |_: MakeRequest| {
            Err::<Value, _>(ResolveErrorKind::CannotInstantiate {
                class: class.name().into(),
                kind: class.kind(),
            })
        })));
    }

    debug!(class = class.name(), shared = rule.is_shared(), "Built class maker");
    Ok(BoxCloneService::new(service_fn(move |request: MakeRequest| {
        instantiate(request, &class, constructor.as_ref(), hook.as_deref(), &rule)
    })))
}

fn instantiate(
    MakeRequest { container, args, share }: MakeRequest,
    class: &Arc<Class>,
    constructor: Option<&Constructor>,
    hook: Option<&ContainerAwareHook>,
    rule: &Rule,
) -> Result<Value, ResolveErrorKind> {
    let object = ObjectRef::new(class.clone());

    // Registered before the constructor params are resolved, cycles back to this rule find it
    if rule.is_shared() {
        container.register_instance(Value::Object(object.clone()), rule);
    }

    if let Some(constructor) = constructor {
        let params = resolve_params(&container, constructor.signature(), Some(rule), args, &share, class.name())?;
        constructor.invoke(&object, params)?;
    }
    if let Some(hook) = hook {
        hook(&object, &container);
    }

    let mut value = Value::Object(object);
    for call in rule.calls() {
        let receiver = value.clone();
        let target = format!("{}::{}", receiver.as_object().map_or(receiver.type_name(), ObjectRef::class_name), call.method());
        let invocable = container.invocable(Callback::Target(CallTarget::Method {
            receiver,
            method: call.method().into(),
        }))?;

        let args = Args::from(expand_all(&container, call.arguments(), &share)?);
        let params = resolve_params(&container, invocable.signature(), None, args, &share, &target)?;
        let returned = invocable.invoke(params)?;

        if call.is_chain() {
            if rule.is_shared() {
                container.register_instance(returned.clone(), rule);
            }
            value = returned;
        }
    }

    debug!(class = class.name(), "Instantiated");
    Ok(value)
}

fn factory_maker(container: &Container, factory: Factory, rule: Rule) -> Result<BoxedMaker, ResolveErrorKind> {
    let invocable = match factory {
        Factory::Function(function) => Invocable::Function(function),
        Factory::Expression(expression) => container.invocable(Callback::Expression(expression))?,
    };

    debug!(factory = invocable.name(), shared = rule.is_shared(), "Built factory maker");
    Ok(BoxCloneService::new(service_fn(move |MakeRequest { container, args, share }: MakeRequest| {
        let params = resolve_params(&container, invocable.signature(), Some(&rule), args, &share, rule.name())?;
        let value = invocable.invoke(params)?;

        if rule.is_shared() {
            container.register_instance(value.clone(), &rule);
        }
        Ok(value)
    })))
}
