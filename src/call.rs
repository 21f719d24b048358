use alloc::{
    string::{String, ToString as _},
    sync::Arc,
};
use tracing::{debug, error, info_span};

use crate::{
    args::Args,
    dependency_resolver::{is_invokable, resolve_params},
    errors::ResolveErrorKind,
    function::{Function, Params},
    object::ObjectRef,
    reflection::{Class, Method, Signature, INVOKE},
    value::Value,
    Container,
};

/// Position of the separator of a call expression: the first `@`, otherwise the first `:`.
#[must_use]
pub(crate) fn separator_position(expression: &str) -> Option<usize> {
    expression.find('@').or_else(|| expression.find(':'))
}

/// Anything `call` accepts.
#[derive(Clone, Debug)]
pub enum Callback {
    Function(Function),
    /// `"Class:method"`, `"service@method"` or the name of an invokable service
    Expression(String),
    Invokable(ObjectRef),
    Target(CallTarget),
}

impl From<Function> for Callback {
    #[inline]
    fn from(function: Function) -> Self {
        Self::Function(function)
    }
}

impl From<&str> for Callback {
    #[inline]
    fn from(expression: &str) -> Self {
        Self::Expression(expression.to_string())
    }
}

impl From<String> for Callback {
    #[inline]
    fn from(expression: String) -> Self {
        Self::Expression(expression)
    }
}

impl From<ObjectRef> for Callback {
    #[inline]
    fn from(object: ObjectRef) -> Self {
        Self::Invokable(object)
    }
}

impl From<CallTarget> for Callback {
    #[inline]
    fn from(target: CallTarget) -> Self {
        Self::Target(target)
    }
}

/// Call expression resolved to something invocable (or claiming to be).
#[derive(Clone, Debug, PartialEq)]
pub enum CallTarget {
    Function(Function),
    /// Method of an already resolved receiver
    Method { receiver: Value, method: String },
    /// Static method of a class, no instance involved
    Static { class: String, method: String },
}

/// Target checked against the catalog: the signature to resolve and how to run it.
#[derive(Clone)]
pub(crate) enum Invocable {
    Function(Function),
    /// `class` names the receiver's class, or the class a static method was looked up on
    Method {
        receiver: Option<ObjectRef>,
        class: String,
        method: Method,
    },
}

impl Invocable {
    #[inline]
    pub(crate) fn name(&self) -> &str {
        match self {
            Self::Function(function) => function.name(),
            Self::Method { method, .. } => method.name(),
        }
    }

    #[inline]
    pub(crate) fn signature(&self) -> &Signature {
        match self {
            Self::Function(function) => function.signature(),
            Self::Method { method, .. } => method.signature(),
        }
    }

    pub(crate) fn invoke(&self, params: Params) -> Result<Value, ResolveErrorKind> {
        let result = match self {
            Self::Function(function) => function.invoke(params),
            Self::Method { receiver, class, method } => match method.invoke(receiver.as_ref(), params) {
                Some(result) => result,
                None => return Err(undefined_call(class, method.name())),
            },
        };
        result.map_err(Into::into)
    }
}

impl Container {
    /// Calls `callback` with arguments resolved from its signature.
    ///
    /// # Errors
    /// See [`Container::call_arguments`]
    #[inline]
    pub fn call(&self, callback: impl Into<Callback>, args: impl Into<Args>) -> Result<Value, ResolveErrorKind> {
        self.call_arguments(callback, args, &[])
    }

    /// Calls `callback`, binding its params from `args` and the `share` pool the way constructor params are bound.
    ///
    /// # Errors
    /// - Returns [`ResolveErrorKind::InvalidCallExpression`] if an expression names nothing callable
    /// - Returns [`ResolveErrorKind::UndefinedCall`] if the target method doesn't exist or can't be called that way
    /// - Returns any error raised while resolving the params or by the callback itself
    pub fn call_arguments(&self, callback: impl Into<Callback>, args: impl Into<Args>, share: &[Value]) -> Result<Value, ResolveErrorKind> {
        self.invoke_callback(callback.into(), args.into(), share).inspect_err(|err| {
            error!("{}", err);
        })
    }

    pub(crate) fn invoke_callback(&self, callback: Callback, args: Args, share: &[Value]) -> Result<Value, ResolveErrorKind> {
        let invocable = self.invocable(callback)?;

        let span = info_span!("call", target = invocable.name());
        let _guard = span.enter();

        let params = resolve_params(self, invocable.signature(), None, args, share, invocable.name())?;
        let value = invocable.invoke(params)?;

        debug!("Called");
        Ok(value)
    }

    /// Splits a call expression into a call target.
    ///
    /// `"service@method"` resolves the service through [`Container::make`],
    /// `"Class:method"` (or `"Class::method"`) refers to the class without instantiating it.
    /// An expression without separator must name an invokable service.
    ///
    /// # Errors
    /// - Returns [`ResolveErrorKind::InvalidCallExpression`] if the expression has no separator and
    ///   doesn't resolve to an invokable service
    /// - Returns any error raised while resolving the receiver of an `@` expression
    pub fn call_expression(&self, expression: &str) -> Result<CallTarget, ResolveErrorKind> {
        let Some(position) = separator_position(expression) else {
            return match self.make(expression) {
                Ok(Value::Function(function)) => Ok(CallTarget::Function(function)),
                Ok(Value::Object(object)) if is_invokable(self, &object) => Ok(CallTarget::Method {
                    receiver: Value::Object(object),
                    method: INVOKE.into(),
                }),
                Ok(_) | Err(_) => {
                    let err = ResolveErrorKind::InvalidCallExpression {
                        expression: expression.into(),
                    };
                    debug!("{}", err);
                    Err(err)
                }
            };
        };

        let class = &expression[..position];
        let make = expression[position..].starts_with('@');
        let method = expression[position + 1..].trim_start_matches(['@', ':']).to_string();

        if make {
            Ok(CallTarget::Method {
                receiver: self.make(class)?,
                method,
            })
        } else {
            Ok(CallTarget::Static {
                class: class.into(),
                method,
            })
        }
    }

    pub(crate) fn invocable(&self, callback: Callback) -> Result<Invocable, ResolveErrorKind> {
        let target = match callback {
            Callback::Function(function) => return Ok(Invocable::Function(function)),
            Callback::Expression(expression) => self.call_expression(&expression)?,
            Callback::Invokable(object) => CallTarget::Method {
                receiver: Value::Object(object),
                method: INVOKE.into(),
            },
            Callback::Target(target) => target,
        };

        match target {
            CallTarget::Function(function) => Ok(Invocable::Function(function)),
            CallTarget::Method {
                receiver: Value::Object(object),
                method,
            } => match self.inner.catalog.read().method_of(object.class(), &method) {
                Some(found) => Ok(Invocable::Method {
                    class: object.class_name().into(),
                    receiver: Some(object),
                    method: found,
                }),
                None => Err(undefined_call(object.class_name(), &method)),
            },
            CallTarget::Method { receiver, method } => Err(undefined_call(receiver.type_name(), &method)),
            CallTarget::Static { class, method } => {
                let catalog = self.inner.catalog.read();
                let found = catalog
                    .get(&class)
                    .and_then(|found: Arc<Class>| catalog.method_of(&found, &method))
                    .filter(Method::is_static);
                match found {
                    Some(found) => Ok(Invocable::Method {
                        receiver: None,
                        class,
                        method: found,
                    }),
                    None => Err(undefined_call(&class, &method)),
                }
            }
        }
    }
}

fn undefined_call(class: &str, method: &str) -> ResolveErrorKind {
    let err = ResolveErrorKind::UndefinedCall {
        class: class.into(),
        method: method.into(),
    };
    debug!("{}", err);
    err
}
