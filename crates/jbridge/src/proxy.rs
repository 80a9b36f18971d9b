//! Proxy objects: host instances that own one persistent reference to a remote object.
//!
//! The host reference count (`Rc`) drives the remote reference: when the last
//! host reference to a [`ProxyObject`] goes away, its [`GlobalRef`] is dropped
//! and the remote object becomes collectable again.

use std::{cell::RefCell, fmt, rc::Rc, sync::Arc};

use crate::{
    env::{self, Attachment},
    error::{ExcType, RunError, RunResult},
    global_ref::GlobalRef,
    remote::RawRef,
    types::{CONSTRUCTOR_ATTR, HostType, TypeAttr},
    value::Value,
};

/// Host instance of a remote-object proxy type.
///
/// The handle is `None` only between allocation and a successful initializer run.
pub struct ProxyObject {
    ty: Arc<HostType>,
    handle: RefCell<Option<GlobalRef>>,
}

impl ProxyObject {
    /// Wraps an existing remote object in a new proxy of type `ty`.
    ///
    /// Used when remote values flow back into the host. The persistent reference
    /// is acquired before the proxy exists, so a `MemoryError` leaves nothing behind.
    pub fn from_type(cx: &Attachment, ty: &Arc<HostType>, local: RawRef) -> RunResult<Rc<Self>> {
        if !ty.is_proxy_type() {
            return Err(ExcType::type_error(format!(
                "cannot wrap a remote object in non-proxy type '{}'",
                ty.name()
            )));
        }
        let global = GlobalRef::new(cx, local)?;
        Ok(Rc::new(Self {
            ty: Arc::clone(ty),
            handle: RefCell::new(Some(global)),
        }))
    }

    #[must_use]
    pub fn proxy_type(&self) -> &Arc<HostType> {
        &self.ty
    }

    #[must_use]
    pub fn type_name(&self) -> &str {
        self.ty.name()
    }

    /// Returns the raw persistent handle, `None` if not yet initialized.
    #[must_use]
    pub fn raw(&self) -> Option<RawRef> {
        self.handle.borrow().as_ref().map(GlobalRef::raw)
    }

    pub(crate) fn require_raw(&self) -> RunResult<RawRef> {
        self.raw()
            .ok_or_else(|| ExcType::runtime_error("remote object is not initialized"))
    }

    /// Host `repr()`: the type's repr slot.
    pub fn repr(&self) -> RunResult<String> {
        match self.ty.slots().repr {
            Some(repr) => repr(self),
            None => Ok(proxy_repr_string(self)),
        }
    }

    /// Host `str()`: the type's str slot, falling back to `repr()`.
    pub fn str(&self) -> RunResult<String> {
        match self.ty.slots().str {
            Some(str_slot) => str_slot(self),
            None => self.repr(),
        }
    }
}

impl Drop for ProxyObject {
    fn drop(&mut self) {
        let dealloc = self.ty.slots().dealloc;
        if let Some(dealloc) = dealloc {
            dealloc(self);
        }
    }
}

impl fmt::Debug for ProxyObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyObject")
            .field("type", &self.type_name())
            .field("handle", &self.raw())
            .finish()
    }
}

/// Allocation slot: an instance with no remote object behind it yet.
pub(crate) fn proxy_alloc(ty: &Arc<HostType>) -> Rc<ProxyObject> {
    Rc::new(ProxyObject {
        ty: Arc::clone(ty),
        handle: RefCell::new(None),
    })
}

/// Initializer slot, run when host code calls a proxy type.
///
/// May run more than once on the same instance; the previous remote object is
/// released before the new one is installed.
pub(crate) fn proxy_init(obj: &Rc<ProxyObject>, args: &[Value]) -> RunResult<()> {
    let cx = env::require()?;
    let ty = obj.proxy_type();

    let constructors = match ty.dict().get(CONSTRUCTOR_ATTR) {
        Some(TypeAttr::Method(constructors)) => constructors,
        Some(_) => {
            return Err(ExcType::runtime_error(format!(
                "invalid type attribute '{CONSTRUCTOR_ATTR}': expected an overload set"
            )));
        }
        None => {
            return Err(ExcType::runtime_error(format!(
                "no constructor found (missing type attribute '{CONSTRUCTOR_ATTR}')"
            )));
        }
    };

    let Some(class_ref) = ty.class_ref() else {
        return Err(RunError::internal("remote class reference is null"));
    };

    let constructor = cx.bindings().resolver().find_method(&cx, constructors, args)?;
    let frame = cx.bindings().marshaller().create_args(&cx, constructor, args)?;

    let local = cx.env().new_object(class_ref, constructor.id, &frame);
    drop(frame);
    let Some(local) = local else {
        cx.check_exception("remote constructor")?;
        return Err(ExcType::runtime_error("remote constructor returned null"));
    };

    let global = GlobalRef::new(&cx, local);
    cx.env().delete_local_ref(local);
    let global = global?;

    let mut handle = obj.handle.borrow_mut();
    drop(handle.take());
    *handle = Some(global);
    Ok(())
}

/// Deallocation slot.
///
/// Dropping the handle releases the remote object, or skips the release when the
/// thread is no longer attached to the remote runtime.
pub(crate) fn proxy_dealloc(obj: &mut ProxyObject) {
    let handle = obj.handle.get_mut().take();
    if let Some(cx) = env::current() {
        cx.tracer()
            .on_proxy_dealloc(obj.ty.name(), handle.as_ref().map(GlobalRef::raw));
    }
    drop(handle);
}

/// Repr slot: debug string with the dynamic type name and the raw handle.
pub(crate) fn proxy_repr(obj: &ProxyObject) -> RunResult<String> {
    Ok(proxy_repr_string(obj))
}

fn proxy_repr_string(obj: &ProxyObject) -> String {
    let handle = obj.raw().map_or(0, RawRef::get);
    format!("{}(objectRef={handle:#x})", obj.type_name())
}

/// Str slot: delegates to the remote object's own string conversion.
pub(crate) fn proxy_str(obj: &ProxyObject) -> RunResult<String> {
    let cx = env::require()?;
    let raw = obj.require_raw()?;
    let text = cx.env().object_to_string(raw);
    cx.check_exception("remote toString")?;
    Ok(text.unwrap_or_else(|| "null".to_owned()))
}
