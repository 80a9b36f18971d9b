use std::rc::Rc;

use crate::{
    error::{ExcType, RunResult},
    method::BoundMethod,
    proxy::ProxyObject,
    types::TypeAttr,
    value::Value,
};

/// Attribute lookup slot of proxy types.
///
/// Overload sets found on the type are bound to this instance, so `x.m()` calls
/// `X.m(x)`. The binding is created per access and never stored: the overload
/// set is shared by every instance of the type.
pub(crate) fn proxy_getattro(obj: &Rc<ProxyObject>, name: &str) -> RunResult<Value> {
    match generic_getattr(obj, name)? {
        Value::OverloadSet(method) => Ok(Value::BoundMethod(Rc::new(BoundMethod::new(method, Rc::clone(obj))))),
        value => Ok(value),
    }
}

/// Generic attribute lookup: the instance's type dict, then its bases.
///
/// Proxies carry no per-instance attributes.
pub(crate) fn generic_getattr(obj: &ProxyObject, name: &str) -> RunResult<Value> {
    obj.proxy_type()
        .lookup(name)
        .map(TypeAttr::to_value)
        .ok_or_else(|| ExcType::attribute_error(obj.type_name(), name))
}
