//! Indexed-container protocol for proxies of remote array classes.
//!
//! Nothing is cached: the remote array's size and contents are not under host
//! control, so every call goes back to the remote runtime. Negative indices are
//! not wrapped around; like any index outside `[0, len)` they fail remotely.

use std::{rc::Rc, sync::Arc};

use crate::{
    env,
    error::{ExcType, RunError, RunResult},
    proxy::ProxyObject,
    types::{HostType, SequenceSlots},
    value::Value,
};

/// The sequence slots installed on array types.
pub(crate) const ARRAY_SEQUENCE: SequenceSlots = SequenceSlots {
    length: array_length,
    item: array_item,
    ass_item: array_ass_item,
};

fn array_length(obj: &ProxyObject) -> RunResult<usize> {
    let cx = env::require()?;
    let raw = obj.require_raw()?;
    let length = cx.env().array_length(raw);
    cx.check_exception("remote array length query")?;
    usize::try_from(length).map_err(|_| ExcType::runtime_error(format!("remote array reported length {length}")))
}

fn array_item(obj: &Rc<ProxyObject>, index: isize) -> RunResult<Value> {
    let cx = env::require()?;
    let component = component_type(obj)?;
    let raw = obj.require_raw()?;
    let index = remote_index(index)?;

    let element = cx.env().object_array_element(raw, index);
    cx.check_exception("remote array element access")?;

    let value = cx.bindings().converter().to_host(&cx, component, element);
    if let Some(element) = element {
        cx.env().delete_local_ref(element);
    }
    value
}

fn array_ass_item(obj: &Rc<ProxyObject>, index: isize, item: &Value) -> RunResult<()> {
    let cx = env::require()?;
    let component = component_type(obj)?;
    let raw = obj.require_raw()?;
    let index = remote_index(index)?;

    let element = match item {
        Value::None => None,
        other => cx.bindings().converter().to_remote(&cx, component, other)?,
    };
    cx.env().set_object_array_element(raw, index, element);
    cx.check_exception("remote array element store")
}

fn component_type(obj: &ProxyObject) -> RunResult<&Arc<HostType>> {
    obj.proxy_type()
        .component_type()
        .ok_or_else(|| RunError::internal("object is not an array"))
}

/// Remote array indices are 32-bit; anything wider cannot address an element.
fn remote_index(index: isize) -> RunResult<i32> {
    i32::try_from(index).map_err(|_| ExcType::runtime_error(format!("array index {index} out of range")))
}
