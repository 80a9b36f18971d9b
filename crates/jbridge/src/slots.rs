use std::sync::Arc;

use crate::{
    array::ARRAY_SEQUENCE,
    attr::proxy_getattro,
    env,
    error::RunResult,
    proxy::{proxy_alloc, proxy_dealloc, proxy_init, proxy_repr, proxy_str},
    types::{HostType, TypeDescriptor, TypeKind, TypeSlots},
    value::Value,
};

/// Builds the host type object for a remote class and makes it ready.
///
/// Runs once per remote class, before the type is handed to host code. The base
/// type is the superclass's host type, mirroring the remote class hierarchy.
/// Only array types (those with a component type) get the sequence protocol.
pub fn install_slots(descriptor: TypeDescriptor) -> RunResult<Arc<HostType>> {
    let TypeDescriptor {
        name,
        class_ref,
        super_type,
        component_type,
        attrs,
    } = descriptor;

    let sequence = component_type.as_ref().map(|_| ARRAY_SEQUENCE);
    let slots = TypeSlots {
        alloc: Some(proxy_alloc),
        init: Some(proxy_init),
        dealloc: Some(proxy_dealloc),
        repr: Some(proxy_repr),
        str: Some(proxy_str),
        getattro: Some(proxy_getattro),
        sequence,
    };
    let kind = TypeKind::RemoteProxy {
        class_ref,
        component_type,
    };

    let ty = HostType::new(name, kind, super_type, attrs, slots).ready()?;
    if let Some(cx) = env::current() {
        cx.tracer().on_type_ready(ty.name(), ty.is_array());
    }
    Ok(ty)
}

/// Whether `value` is a remote-object proxy type.
#[must_use]
pub fn is_proxy_type(value: &Value) -> bool {
    matches!(value, Value::Type(ty) if ty.is_proxy_type())
}

/// Whether `value` is an instance of a remote-object proxy type.
#[must_use]
pub fn is_proxy_instance(value: &Value) -> bool {
    matches!(value, Value::Proxy(obj) if obj.proxy_type().is_proxy_type())
}
