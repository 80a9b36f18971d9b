//! In-memory remote runtime and collaborators shared by the integration tests.
//!
//! The fake runtime counts live persistent references and panics if any call
//! other than the exception queries is made while a remote exception is pending,
//! so tests fail loudly when the bridge forgets to clear one.

#![allow(dead_code)]

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    rc::Rc,
    sync::Arc,
};

use jbridge::{
    ArgMarshaller, Attachment, Bindings, CallFrame, ExcType, HostType, MethodDescriptor, MethodDispatcher, MethodId,
    OverloadResolver, OverloadSet, ProxyObject, RawRef, RemoteEnv, RemoteValue, RunError, RunResult, TypeAttr,
    TypeDescriptor, Value, ValueConverter, env,
};

pub const STRING_CLASS: &str = "java.lang.String";

#[derive(Debug, Clone)]
enum FakeObject {
    Class(String),
    Instance { class: String, text: Option<String> },
    Array(Vec<Option<u64>>),
}

#[derive(Debug, Default)]
pub struct FakeRuntime {
    next_handle: Cell<u64>,
    objects: RefCell<HashMap<u64, FakeObject>>,
    /// Persistent handle -> object handle.
    globals: RefCell<HashMap<u64, u64>>,
    released: RefCell<Vec<u64>>,
    pending: RefCell<Option<String>>,
    fail_global_refs: Cell<bool>,
    constructor_error: RefCell<Option<String>>,
    to_string_error: RefCell<Option<String>>,
    local_refs_deleted: Cell<usize>,
}

impl FakeRuntime {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            next_handle: Cell::new(0x10),
            ..Self::default()
        })
    }

    fn alloc(&self, object: FakeObject) -> RawRef {
        let handle = self.next_handle.get();
        self.next_handle.set(handle + 1);
        self.objects.borrow_mut().insert(handle, object);
        RawRef::new(handle).unwrap()
    }

    pub fn new_class(&self, name: &str) -> RawRef {
        self.alloc(FakeObject::Class(name.to_owned()))
    }

    pub fn new_string(&self, text: &str) -> RawRef {
        self.alloc(FakeObject::Instance {
            class: STRING_CLASS.to_owned(),
            text: Some(text.to_owned()),
        })
    }

    pub fn new_instance(&self, class: &str) -> RawRef {
        self.alloc(FakeObject::Instance {
            class: class.to_owned(),
            text: None,
        })
    }

    pub fn new_array(&self, elements: &[Option<RawRef>]) -> RawRef {
        self.alloc(FakeObject::Array(elements.iter().map(|e| e.map(RawRef::get)).collect()))
    }

    /// Number of persistent references not yet released.
    pub fn live_global_refs(&self) -> usize {
        self.globals.borrow().len()
    }

    pub fn released(&self) -> Vec<u64> {
        self.released.borrow().clone()
    }

    pub fn has_pending_exception(&self) -> bool {
        self.pending.borrow().is_some()
    }

    pub fn local_refs_deleted(&self) -> usize {
        self.local_refs_deleted.get()
    }

    /// Makes every following `new_global_ref` fail as if out of memory.
    pub fn fail_global_refs(&self, fail: bool) {
        self.fail_global_refs.set(fail);
    }

    /// Makes the next constructor call throw `exception`.
    pub fn throw_from_constructor(&self, exception: &str) {
        *self.constructor_error.borrow_mut() = Some(exception.to_owned());
    }

    pub fn throw_from_to_string(&self, exception: &str) {
        *self.to_string_error.borrow_mut() = Some(exception.to_owned());
    }

    /// Text of a remote string object, following persistent handles.
    pub fn text_of(&self, raw: RawRef) -> Option<String> {
        match self.objects.borrow().get(&self.resolve(raw)) {
            Some(FakeObject::Instance { text, .. }) => text.clone(),
            _ => None,
        }
    }

    pub fn class_of(&self, raw: RawRef) -> Option<String> {
        match self.objects.borrow().get(&self.resolve(raw)) {
            Some(FakeObject::Instance { class, .. }) => Some(class.clone()),
            Some(FakeObject::Array(_)) => Some("[Ljava.lang.Object;".to_owned()),
            Some(FakeObject::Class(_)) => Some("java.lang.Class".to_owned()),
            None => None,
        }
    }

    fn resolve(&self, raw: RawRef) -> u64 {
        let handle = raw.get();
        assert!(
            !self.released.borrow().contains(&handle),
            "use of released persistent reference {handle:#x}"
        );
        self.globals.borrow().get(&handle).copied().unwrap_or(handle)
    }

    fn assert_no_pending(&self, operation: &str) {
        if let Some(exception) = self.pending.borrow().as_ref() {
            panic!("{operation} called while remote exception is pending: {exception}");
        }
    }

    fn throw(&self, exception: String) {
        *self.pending.borrow_mut() = Some(exception);
    }
}

impl RemoteEnv for FakeRuntime {
    fn new_global_ref(&self, obj: RawRef) -> Option<RawRef> {
        self.assert_no_pending("new_global_ref");
        if self.fail_global_refs.get() {
            return None;
        }
        let target = self.resolve(obj);
        let handle = self.next_handle.get();
        self.next_handle.set(handle + 1);
        self.globals.borrow_mut().insert(handle, target);
        RawRef::new(handle)
    }

    fn delete_global_ref(&self, global: RawRef) {
        let removed = self.globals.borrow_mut().remove(&global.get());
        assert!(removed.is_some(), "double release of persistent reference {global:#x}");
        self.released.borrow_mut().push(global.get());
    }

    fn delete_local_ref(&self, _local: RawRef) {
        self.local_refs_deleted.set(self.local_refs_deleted.get() + 1);
    }

    fn new_object(&self, class: RawRef, _constructor: MethodId, args: &[RemoteValue]) -> Option<RawRef> {
        self.assert_no_pending("new_object");
        if let Some(exception) = self.constructor_error.borrow_mut().take() {
            self.throw(exception);
            return None;
        }
        let class = match self.objects.borrow().get(&self.resolve(class)) {
            Some(FakeObject::Class(name)) => name.clone(),
            other => panic!("new_object on non-class {other:?}"),
        };
        let text = match args.first() {
            Some(RemoteValue::Object(Some(arg))) => self.text_of(*arg),
            Some(RemoteValue::Int(i)) => Some(i.to_string()),
            _ => None,
        };
        Some(self.alloc(FakeObject::Instance { class, text }))
    }

    fn array_length(&self, array: RawRef) -> i32 {
        self.assert_no_pending("array_length");
        match self.objects.borrow().get(&self.resolve(array)) {
            Some(FakeObject::Array(elements)) => i32::try_from(elements.len()).unwrap(),
            _ => {
                self.throw("java.lang.IllegalArgumentException: Argument is not an array".to_owned());
                0
            }
        }
    }

    fn object_array_element(&self, array: RawRef, index: i32) -> Option<RawRef> {
        self.assert_no_pending("object_array_element");
        let element = match self.objects.borrow().get(&self.resolve(array)) {
            Some(FakeObject::Array(elements)) => match usize::try_from(index).ok().and_then(|i| elements.get(i)) {
                Some(element) => Ok(*element),
                None => Err(format!(
                    "java.lang.ArrayIndexOutOfBoundsException: Index {index} out of bounds for length {}",
                    elements.len()
                )),
            },
            _ => Err("java.lang.IllegalArgumentException: Argument is not an array".to_owned()),
        };
        match element {
            Ok(element) => element.and_then(RawRef::new),
            Err(exception) => {
                self.throw(exception);
                None
            }
        }
    }

    fn set_object_array_element(&self, array: RawRef, index: i32, value: Option<RawRef>) {
        self.assert_no_pending("set_object_array_element");
        let value = value.map(|v| self.resolve(v));
        let mut objects = self.objects.borrow_mut();
        let exception = match objects.get_mut(&self.resolve(array)) {
            Some(FakeObject::Array(elements)) => {
                let length = elements.len();
                match usize::try_from(index).ok().and_then(|i| elements.get_mut(i)) {
                    Some(slot) => {
                        *slot = value;
                        None
                    }
                    None => Some(format!(
                        "java.lang.ArrayIndexOutOfBoundsException: Index {index} out of bounds for length {length}"
                    )),
                }
            }
            _ => Some("java.lang.IllegalArgumentException: Argument is not an array".to_owned()),
        };
        drop(objects);
        if let Some(exception) = exception {
            self.throw(exception);
        }
    }

    fn object_to_string(&self, obj: RawRef) -> Option<String> {
        self.assert_no_pending("object_to_string");
        if let Some(exception) = self.to_string_error.borrow_mut().take() {
            self.throw(exception);
            return None;
        }
        let handle = self.resolve(obj);
        match self.objects.borrow().get(&handle) {
            Some(FakeObject::Instance { text: Some(text), .. }) => Some(text.clone()),
            Some(FakeObject::Instance { class, text: None }) => Some(format!("{class}@{handle:x}")),
            Some(FakeObject::Array(_)) => Some(format!("[Ljava.lang.Object;@{handle:x}")),
            Some(FakeObject::Class(name)) => Some(format!("class {name}")),
            None => None,
        }
    }

    fn exception_check(&self) -> bool {
        self.pending.borrow().is_some()
    }

    fn exception_describe(&self) -> Option<String> {
        self.pending.borrow().clone()
    }

    fn exception_clear(&self) {
        self.pending.borrow_mut().take();
    }
}

/// Collaborators for the fake runtime.
///
/// Overloads are selected by arity; strings marshal to remote strings, ints to
/// remote ints and proxies to their handles. Element conversion produces host
/// strings for `java.lang.String` and proxies for everything else.
#[derive(Debug)]
pub struct FakeBindings {
    runtime: Rc<FakeRuntime>,
    dispatched: RefCell<Vec<(String, Vec<Value>)>>,
}

impl FakeBindings {
    pub fn new(runtime: &Rc<FakeRuntime>) -> Rc<Self> {
        Rc::new(Self {
            runtime: Rc::clone(runtime),
            dispatched: RefCell::new(Vec::new()),
        })
    }

    /// Calls seen by the dispatcher: overload set name and full argument tuple.
    pub fn take_dispatched(&self) -> Vec<(String, Vec<Value>)> {
        self.dispatched.take()
    }
}

impl OverloadResolver for FakeBindings {
    fn find_method<'a>(
        &self,
        _cx: &Attachment,
        set: &'a OverloadSet,
        args: &[Value],
    ) -> RunResult<&'a MethodDescriptor> {
        set.overloads()
            .iter()
            .find(|method| method.arity() == args.len())
            .ok_or_else(|| {
                RunError::exception(
                    ExcType::TypeError,
                    format!("no matching overload of '{}' for {} argument(s)", set.name(), args.len()),
                )
            })
    }
}

impl ArgMarshaller for FakeBindings {
    fn create_args(&self, _cx: &Attachment, _method: &MethodDescriptor, args: &[Value]) -> RunResult<CallFrame> {
        args.iter()
            .map(|arg| match arg {
                Value::None => Ok(RemoteValue::Object(None)),
                Value::Int(i) => i32::try_from(*i)
                    .map(RemoteValue::Int)
                    .map_err(|_| RunError::conversion(ExcType::ValueError, "int out of range")),
                Value::Str(s) => Ok(RemoteValue::Object(Some(self.runtime.new_string(s)))),
                Value::Proxy(obj) => Ok(RemoteValue::Object(obj.raw())),
                other => Err(RunError::conversion(
                    ExcType::TypeError,
                    format!("cannot marshal '{}'", other.type_name()),
                )),
            })
            .collect()
    }
}

impl ValueConverter for FakeBindings {
    fn to_host(&self, cx: &Attachment, ty: &Arc<HostType>, raw: Option<RawRef>) -> RunResult<Value> {
        let Some(raw) = raw else {
            return Ok(Value::None);
        };
        if ty.name() == STRING_CLASS {
            Ok(Value::Str(self.runtime.text_of(raw).unwrap_or_default()))
        } else {
            Ok(Value::Proxy(ProxyObject::from_type(cx, ty, raw)?))
        }
    }

    fn to_remote(&self, _cx: &Attachment, ty: &Arc<HostType>, value: &Value) -> RunResult<Option<RawRef>> {
        match value {
            Value::Str(s) if ty.name() == STRING_CLASS => Ok(Some(self.runtime.new_string(s))),
            Value::Proxy(obj) => Ok(obj.raw()),
            other => Err(RunError::conversion(
                ExcType::TypeError,
                format!("cannot convert '{}' to '{}'", other.type_name(), ty.name()),
            )),
        }
    }
}

impl MethodDispatcher for FakeBindings {
    fn call(&self, _cx: &Attachment, set: &Arc<OverloadSet>, args: &[Value]) -> RunResult<Value> {
        self.dispatched
            .borrow_mut()
            .push((set.name().to_owned(), args.to_vec()));
        Ok(Value::Int(i64::try_from(args.len()).unwrap()))
    }
}

/// Fake runtime, its collaborators and the attachment guard of the current thread.
pub struct Harness {
    pub runtime: Rc<FakeRuntime>,
    pub bindings: Rc<FakeBindings>,
    pub guard: Option<env::AttachGuard>,
}

impl Harness {
    /// Creates a fake runtime and attaches the current thread to it.
    pub fn attached() -> Self {
        Self::attached_with(|attachment| attachment)
    }

    pub fn attached_with(configure: impl FnOnce(Attachment) -> Attachment) -> Self {
        let runtime = FakeRuntime::new();
        let bindings = FakeBindings::new(&runtime);
        let attachment = configure(Attachment::new(runtime.clone(), Bindings::from_shared(&bindings)));
        let guard = Some(env::attach(attachment));
        Self {
            runtime,
            bindings,
            guard,
        }
    }

    /// Detaches the current thread, as when the remote runtime shuts down.
    pub fn detach(&mut self) {
        self.guard.take();
    }

    pub fn cx(&self) -> Rc<Attachment> {
        env::require().unwrap()
    }

    /// `java.lang.Object` with a `toString()` method and a one-arg constructor.
    pub fn object_type(&self) -> Arc<HostType> {
        let class_ref = self.runtime.new_class("java.lang.Object");
        jbridge::install_slots(
            TypeDescriptor::new("java.lang.Object", Some(class_ref))
                .with_constructor(constructors("java.lang.Object", &[0]))
                .with_attr("toString", TypeAttr::Method(Arc::new(method("toString", 0)))),
        )
        .unwrap()
    }

    pub fn string_type(&self, object_type: &Arc<HostType>) -> Arc<HostType> {
        let class_ref = self.runtime.new_class(STRING_CLASS);
        jbridge::install_slots(
            TypeDescriptor::new(STRING_CLASS, Some(class_ref))
                .with_super_type(Arc::clone(object_type))
                .with_constructor(constructors(STRING_CLASS, &[0, 1])),
        )
        .unwrap()
    }

    pub fn array_type(&self, name: &str, component: &Arc<HostType>, object_type: &Arc<HostType>) -> Arc<HostType> {
        let class_ref = self.runtime.new_class(name);
        jbridge::install_slots(
            TypeDescriptor::new(name, Some(class_ref))
                .with_super_type(Arc::clone(object_type))
                .with_component_type(Arc::clone(component)),
        )
        .unwrap()
    }

    /// Wraps a new remote `String[]` holding `items` in a proxy.
    pub fn string_array(&self, items: &[&str]) -> Value {
        let object_type = self.object_type();
        let string_type = self.string_type(&object_type);
        let array_type = self.array_type("java.lang.String[]", &string_type, &object_type);
        let elements: Vec<_> = items.iter().map(|item| Some(self.runtime.new_string(item))).collect();
        let raw = self.runtime.new_array(&elements);
        Value::Proxy(ProxyObject::from_type(&self.cx(), &array_type, raw).unwrap())
    }
}

/// Constructor overload set with one overload per given arity.
pub fn constructors(class: &str, arities: &[usize]) -> OverloadSet {
    OverloadSet::new(
        "<init>",
        arities
            .iter()
            .zip(1u64..)
            .map(|(arity, id)| {
                MethodDescriptor::new(
                    format!("{class}.<init>"),
                    MethodId::new(id),
                    vec!["java.lang.Object".to_owned(); *arity],
                    false,
                )
            })
            .collect(),
    )
}

/// Instance method overload set with a single overload of the given arity.
pub fn method(name: &str, arity: usize) -> OverloadSet {
    OverloadSet::new(
        name,
        vec![MethodDescriptor::new(
            name,
            MethodId::new(100 + u64::try_from(arity).unwrap()),
            vec!["java.lang.Object".to_owned(); arity],
            false,
        )],
    )
}
