//! Host values and the host-side protocols dispatched through type slots.

use std::{rc::Rc, sync::Arc};

use crate::{
    attr::generic_getattr,
    error::{ExcType, RunResult},
    method::{BoundMethod, OverloadSet},
    proxy::ProxyObject,
    types::HostType,
};

/// A value in the host runtime.
///
/// Cloning shares reference-counted payloads; a proxy stays alive (and keeps its
/// remote object alive) as long as any clone of it exists.
#[derive(Debug, Clone)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Proxy(Rc<ProxyObject>),
    Type(Arc<HostType>),
    /// Unbound set of remote method overloads, as found on a type.
    OverloadSet(Arc<OverloadSet>),
    BoundMethod(Rc<BoundMethod>),
}

impl Value {
    /// Returns the host type name of the value, as used in error messages.
    #[must_use]
    pub fn type_name(&self) -> &str {
        match self {
            Self::None => "NoneType",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
            Self::Proxy(obj) => obj.type_name(),
            Self::Type(_) => "type",
            Self::OverloadSet(_) => "overloaded_method",
            Self::BoundMethod(_) => "method",
        }
    }

    pub fn repr(&self) -> RunResult<String> {
        Ok(match self {
            Self::None => "None".to_owned(),
            Self::Bool(true) => "True".to_owned(),
            Self::Bool(false) => "False".to_owned(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => format!("{f:?}"),
            Self::Str(s) => format!("'{s}'"),
            Self::Proxy(obj) => return obj.repr(),
            Self::Type(ty) => format!("<class '{}'>", ty.name()),
            Self::OverloadSet(set) => format!("<overloaded method '{}'>", set.name()),
            Self::BoundMethod(method) => format!(
                "<bound method '{}' of {}>",
                method.method().name(),
                method.instance().repr()?
            ),
        })
    }

    pub fn str(&self) -> RunResult<String> {
        match self {
            Self::Str(s) => Ok(s.clone()),
            Self::Proxy(obj) => obj.str(),
            _ => self.repr(),
        }
    }

    pub fn getattr(&self, name: &str) -> RunResult<Value> {
        match self {
            Self::Proxy(obj) => match obj.proxy_type().slots().getattro {
                Some(getattro) => getattro(obj, name),
                None => generic_getattr(obj, name),
            },
            Self::Type(ty) => ty.getattr(name),
            _ => Err(ExcType::attribute_error(self.type_name(), name)),
        }
    }

    /// Host `len()`.
    pub fn len(&self) -> RunResult<usize> {
        match self {
            Self::Proxy(obj) => match obj.proxy_type().slots().sequence {
                Some(sequence) => (sequence.length)(obj),
                None => Err(ExcType::type_error_no_len(self.type_name())),
            },
            Self::Str(s) => Ok(s.chars().count()),
            _ => Err(ExcType::type_error_no_len(self.type_name())),
        }
    }

    /// Host `value[index]`.
    pub fn get_item(&self, index: isize) -> RunResult<Value> {
        match self {
            Self::Proxy(obj) => match obj.proxy_type().slots().sequence {
                Some(sequence) => (sequence.item)(obj, index),
                None => Err(ExcType::type_error_not_sub(self.type_name())),
            },
            _ => Err(ExcType::type_error_not_sub(self.type_name())),
        }
    }

    /// Host `value[index] = item`.
    pub fn set_item(&self, index: isize, item: &Value) -> RunResult<()> {
        match self {
            Self::Proxy(obj) => match obj.proxy_type().slots().sequence {
                Some(sequence) => (sequence.ass_item)(obj, index, item),
                None => Err(ExcType::type_error_not_sub_assignment(self.type_name())),
            },
            _ => Err(ExcType::type_error_not_sub_assignment(self.type_name())),
        }
    }

    pub fn call(&self, args: &[Value]) -> RunResult<Value> {
        match self {
            Self::Type(ty) => ty.call(args),
            Self::OverloadSet(set) => set.call(args),
            Self::BoundMethod(method) => method.call(args),
            _ => Err(ExcType::type_error_not_callable(self.type_name())),
        }
    }

    /// Calls the named method: `value.name(*args)`.
    pub fn call_method(&self, name: &str, args: &[Value]) -> RunResult<Value> {
        self.getattr(name)?.call(args)
    }

    /// Returns the proxy behind this value, if it is one.
    #[must_use]
    pub fn as_proxy(&self) -> Option<&Rc<ProxyObject>> {
        match self {
            Self::Proxy(obj) => Some(obj),
            _ => None,
        }
    }
}

/// Identity for reference values, equality for plain data.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::None, Self::None) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Proxy(a), Self::Proxy(b)) => Rc::ptr_eq(a, b),
            (Self::Type(a), Self::Type(b)) => Arc::ptr_eq(a, b),
            (Self::OverloadSet(a), Self::OverloadSet(b)) => Arc::ptr_eq(a, b),
            (Self::BoundMethod(a), Self::BoundMethod(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<Rc<ProxyObject>> for Value {
    fn from(obj: Rc<ProxyObject>) -> Self {
        Self::Proxy(obj)
    }
}
