use alloc::{
    string::{String, ToString as _},
    vec::Vec,
};
use core::fmt::{self, Debug, Formatter};
use indexmap::IndexMap;

use crate::{function::Function, object::ObjectRef, reflection::BuiltinType, Container};

/// Dynamically typed value flowing through rules, argument pools and bodies.
///
/// Objects, functions and containers are handles: cloning a value clones the handle,
/// and equality between two handles is identity.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Map(IndexMap<String, Value>),
    Object(ObjectRef),
    Function(Function),
    /// Reference to a service, resolved through the container when expanded
    Service(String),
    Container(Container),
}

pub(crate) static NULL: Value = Value::Null;

impl Value {
    #[inline]
    #[must_use]
    pub fn service(name: impl Into<String>) -> Self {
        Self::Service(name.into())
    }

    /// Casts a textual scalar the way rule parameters loaded from configuration are read:
    /// `true`, `false`, `null`, integers and floats become typed values, anything else stays a string.
    #[must_use]
    pub fn cast(text: &str) -> Self {
        let trimmed = text.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "true" => return Self::Bool(true),
            "false" => return Self::Bool(false),
            "null" => return Self::Null,
            _ => {}
        }
        if let Ok(int) = trimmed.parse::<i64>() {
            return Self::Int(int);
        }
        if let Ok(float) = trimmed.parse::<f64>() {
            if float.is_finite() {
                return Self::Float(float);
            }
        }
        Self::Str(text.to_string())
    }

    #[inline]
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) | Self::Service(_) => "string",
            Self::List(_) | Self::Map(_) => "array",
            Self::Object(_) | Self::Container(_) => "object",
            Self::Function(_) => "callable",
        }
    }

    /// Whether the runtime type of the value satisfies a builtin type declaration.
    /// `mixed` is never matched here, untyped and `mixed` params take values positionally.
    /// An object is callable here only through its own `__invoke`, [`crate::ClassCatalog::invoker_of`] also looks at parents.
    #[must_use]
    pub fn matches(&self, builtin: BuiltinType) -> bool {
        match builtin {
            BuiltinType::Int => matches!(self, Self::Int(_)),
            BuiltinType::Float => matches!(self, Self::Float(_)),
            BuiltinType::String => matches!(self, Self::Str(_)),
            BuiltinType::Bool => matches!(self, Self::Bool(_)),
            BuiltinType::Array => matches!(self, Self::List(_) | Self::Map(_)),
            BuiltinType::Iterable => matches!(self, Self::List(_) | Self::Map(_)),
            BuiltinType::Object => matches!(self, Self::Object(_) | Self::Function(_) | Self::Container(_)),
            BuiltinType::Callable => match self {
                Self::Function(_) => true,
                Self::Object(object) => object.class().invoker().is_some(),
                _ => false,
            },
            BuiltinType::Mixed => false,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(value) => Some(*value),
            Self::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(value) => Some(value),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(values) => Some(values),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Self::Function(function) => Some(function),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_container(&self) -> Option<&Container> {
        match self {
            Self::Container(container) => Some(container),
            _ => None,
        }
    }

    /// Renders scalars as text, `None` for arrays and handles.
    #[must_use]
    pub fn to_text(&self) -> Option<String> {
        match self {
            Self::Null => Some(String::new()),
            Self::Bool(value) => Some(if *value { "1".into() } else { String::new() }),
            Self::Int(value) => Some(value.to_string()),
            Self::Float(value) => Some(value.to_string()),
            Self::Str(value) => Some(value.clone()),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Str(a), Self::Str(b)) | (Self::Service(a), Self::Service(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a.ptr_eq(b),
            (Self::Function(a), Self::Function(b)) => a.ptr_eq(b),
            (Self::Container(a), Self::Container(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl Debug for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Bool(value) => f.debug_tuple("Bool").field(value).finish(),
            Self::Int(value) => f.debug_tuple("Int").field(value).finish(),
            Self::Float(value) => f.debug_tuple("Float").field(value).finish(),
            Self::Str(value) => f.debug_tuple("Str").field(value).finish(),
            Self::List(values) => f.debug_tuple("List").field(values).finish(),
            Self::Map(values) => f.debug_tuple("Map").field(values).finish(),
            Self::Object(object) => Debug::fmt(object, f),
            Self::Function(function) => Debug::fmt(function, f),
            Self::Service(name) => f.debug_tuple("Service").field(name).finish(),
            Self::Container(_) => f.write_str("Container"),
        }
    }
}

impl From<bool> for Value {
    #[inline]
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    #[inline]
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Value {
    #[inline]
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<f64> for Value {
    #[inline]
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    #[inline]
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for Value {
    #[inline]
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<Vec<Value>> for Value {
    #[inline]
    fn from(values: Vec<Value>) -> Self {
        Self::List(values)
    }
}

impl From<IndexMap<String, Value>> for Value {
    #[inline]
    fn from(values: IndexMap<String, Value>) -> Self {
        Self::Map(values)
    }
}

impl From<ObjectRef> for Value {
    #[inline]
    fn from(object: ObjectRef) -> Self {
        Self::Object(object)
    }
}

impl From<Function> for Value {
    #[inline]
    fn from(function: Function) -> Self {
        Self::Function(function)
    }
}

impl From<Container> for Value {
    #[inline]
    fn from(container: Container) -> Self {
        Self::Container(container)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    #[inline]
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

#[cfg(feature = "serde")]
impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value as Json;

        match value {
            Json::Null => Self::Null,
            Json::Bool(value) => Self::Bool(value),
            Json::Number(number) => number
                .as_i64()
                .map(Self::Int)
                .or_else(|| number.as_f64().map(Self::Float))
                .unwrap_or(Self::Null),
            Json::String(value) => Self::Str(value),
            Json::Array(values) => Self::List(values.into_iter().map(Into::into).collect()),
            Json::Object(values) => Self::Map(values.into_iter().map(|(key, value)| (key, value.into())).collect()),
        }
    }
}
