//! Host-side types: the records describing remote classes and the host type
//! objects built from them.
//!
//! A [`TypeDescriptor`] is what the type registry knows about a remote class.
//! [`crate::install_slots`] turns it into a ready [`HostType`], the host type
//! object that proxy instances point at. Host types are immutable once ready
//! and are shared (via `Arc`) by every instance and every thread.

use std::{fmt, rc::Rc, sync::Arc};

use indexmap::IndexMap;

use crate::{
    error::{ExcType, RunResult},
    method::OverloadSet,
    proxy::ProxyObject,
    remote::RawRef,
    value::Value,
};

/// Name of the type attribute holding the constructor overload set.
pub const CONSTRUCTOR_ATTR: &str = "__jinit__";

/// Everything the type registry supplies about one remote class.
#[derive(Debug, Clone, Default)]
pub struct TypeDescriptor {
    /// Fully qualified remote class name, e.g. `java.lang.String` or `java.lang.String[]`.
    pub name: String,
    /// Remote class identity; `None` only when registration went wrong.
    pub class_ref: Option<RawRef>,
    /// Host type of the remote superclass.
    pub super_type: Option<Arc<HostType>>,
    /// Element type; set iff this descriptor describes an array class.
    pub component_type: Option<Arc<HostType>>,
    /// Class-level attributes: method overload sets (including [`CONSTRUCTOR_ATTR`]),
    /// constants and nested types.
    pub attrs: IndexMap<String, TypeAttr>,
}

impl TypeDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>, class_ref: Option<RawRef>) -> Self {
        Self {
            name: name.into(),
            class_ref,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_super_type(mut self, super_type: Arc<HostType>) -> Self {
        self.super_type = Some(super_type);
        self
    }

    #[must_use]
    pub fn with_component_type(mut self, component_type: Arc<HostType>) -> Self {
        self.component_type = Some(component_type);
        self
    }

    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, attr: TypeAttr) -> Self {
        self.attrs.insert(name.into(), attr);
        self
    }

    /// Sets the constructor overload set.
    #[must_use]
    pub fn with_constructor(self, constructors: OverloadSet) -> Self {
        self.with_attr(CONSTRUCTOR_ATTR, TypeAttr::Method(Arc::new(constructors)))
    }
}

/// A class-level attribute stored in a host type's dict.
#[derive(Debug, Clone)]
pub enum TypeAttr {
    /// Set of remote method overloads sharing one name.
    Method(Arc<OverloadSet>),
    /// Class-level constant, e.g. a static final field.
    Constant(Constant),
    /// Nested type.
    Type(Arc<HostType>),
}

impl TypeAttr {
    /// Converts the attribute to a host value, without binding.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Method(set) => Value::OverloadSet(Arc::clone(set)),
            Self::Constant(constant) => constant.to_value(),
            Self::Type(ty) => Value::Type(Arc::clone(ty)),
        }
    }
}

/// Thread-safe constant value stored on a type.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Constant {
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::None => Value::None,
            Self::Bool(b) => Value::Bool(*b),
            Self::Int(i) => Value::Int(*i),
            Self::Float(f) => Value::Float(*f),
            Self::Str(s) => Value::Str(s.clone()),
        }
    }
}

/// Explicit marker distinguishing remote-object proxy types from other host types.
#[derive(Debug, Clone)]
pub enum TypeKind {
    /// A host-native type; instances are not remote-object proxies.
    Native,
    /// A type whose instances proxy remote objects of one remote class.
    RemoteProxy {
        class_ref: Option<RawRef>,
        component_type: Option<Arc<HostType>>,
    },
}

pub type AllocFn = fn(&Arc<HostType>) -> Rc<ProxyObject>;
pub type InitFn = fn(&Rc<ProxyObject>, &[Value]) -> RunResult<()>;
pub type DeallocFn = fn(&mut ProxyObject);
pub type ReprFn = fn(&ProxyObject) -> RunResult<String>;
pub type GetAttrFn = fn(&Rc<ProxyObject>, &str) -> RunResult<Value>;
pub type LengthFn = fn(&ProxyObject) -> RunResult<usize>;
pub type ItemFn = fn(&Rc<ProxyObject>, isize) -> RunResult<Value>;
pub type AssItemFn = fn(&Rc<ProxyObject>, isize, &Value) -> RunResult<()>;

/// The indexed-container protocol of a type.
#[derive(Debug, Clone, Copy)]
pub struct SequenceSlots {
    pub length: LengthFn,
    pub item: ItemFn,
    pub ass_item: AssItemFn,
}

/// Dynamic behavior of a host type. Unset slots are inherited from the base type
/// when the type is made ready.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeSlots {
    pub alloc: Option<AllocFn>,
    pub init: Option<InitFn>,
    pub dealloc: Option<DeallocFn>,
    pub repr: Option<ReprFn>,
    pub str: Option<ReprFn>,
    pub getattro: Option<GetAttrFn>,
    pub sequence: Option<SequenceSlots>,
}

impl TypeSlots {
    fn inherit_from(&mut self, base: &Self) {
        self.alloc = self.alloc.or(base.alloc);
        self.init = self.init.or(base.init);
        self.dealloc = self.dealloc.or(base.dealloc);
        self.repr = self.repr.or(base.repr);
        self.str = self.str.or(base.str);
        self.getattro = self.getattro.or(base.getattro);
    }
}

/// A host type object.
pub struct HostType {
    name: String,
    kind: TypeKind,
    base: Option<Arc<HostType>>,
    dict: IndexMap<String, TypeAttr>,
    slots: TypeSlots,
}

impl HostType {
    /// Creates a ready native (non-proxy) type.
    #[must_use]
    pub fn native(name: impl Into<String>, base: Option<Arc<Self>>) -> Arc<Self> {
        let mut ty = Self {
            name: name.into(),
            kind: TypeKind::Native,
            base,
            dict: IndexMap::new(),
            slots: TypeSlots::default(),
        };
        if let Some(base) = &ty.base {
            ty.slots.inherit_from(&base.slots);
        }
        Arc::new(ty)
    }

    pub(crate) fn new(
        name: String,
        kind: TypeKind,
        base: Option<Arc<Self>>,
        dict: IndexMap<String, TypeAttr>,
        slots: TypeSlots,
    ) -> Self {
        Self {
            name,
            kind,
            base,
            dict,
            slots,
        }
    }

    /// Finalizes the type: validates it against its base and inherits unset slots.
    ///
    /// Sequence slots are never inherited: only array types support indexing,
    /// and array types cannot be subclassed.
    pub(crate) fn ready(mut self) -> RunResult<Arc<Self>> {
        if self.name.is_empty() {
            return Err(ExcType::runtime_error("cannot ready a type with an empty name"));
        }
        if let Some(base) = &self.base {
            if base.is_array() {
                return Err(ExcType::runtime_error(format!(
                    "type '{}' cannot extend array type '{}'",
                    self.name, base.name
                )));
            }
            let base_slots = base.slots;
            self.slots.inherit_from(&base_slots);
        }
        Ok(Arc::new(self))
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    #[must_use]
    pub fn base(&self) -> Option<&Arc<Self>> {
        self.base.as_ref()
    }

    #[must_use]
    pub fn slots(&self) -> &TypeSlots {
        &self.slots
    }

    /// Returns the type's own attribute dict, excluding bases.
    #[must_use]
    pub fn dict(&self) -> &IndexMap<String, TypeAttr> {
        &self.dict
    }

    /// Whether this type proxies remote objects.
    #[must_use]
    pub fn is_proxy_type(&self) -> bool {
        matches!(self.kind, TypeKind::RemoteProxy { .. })
    }

    #[must_use]
    pub fn class_ref(&self) -> Option<RawRef> {
        match &self.kind {
            TypeKind::RemoteProxy { class_ref, .. } => *class_ref,
            TypeKind::Native => None,
        }
    }

    #[must_use]
    pub fn component_type(&self) -> Option<&Arc<Self>> {
        match &self.kind {
            TypeKind::RemoteProxy { component_type, .. } => component_type.as_ref(),
            TypeKind::Native => None,
        }
    }

    #[must_use]
    pub fn is_array(&self) -> bool {
        self.component_type().is_some()
    }

    /// Looks an attribute up in this type's dict, then in its bases.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&TypeAttr> {
        let mut ty = Some(self);
        while let Some(current) = ty {
            if let Some(attr) = current.dict.get(name) {
                return Some(attr);
            }
            ty = current.base.as_deref();
        }
        None
    }

    /// Whether `self` is `other` or derives from it.
    #[must_use]
    pub fn is_subtype_of(&self, other: &Self) -> bool {
        let mut ty = Some(self);
        while let Some(current) = ty {
            if std::ptr::eq(current, other) {
                return true;
            }
            ty = current.base.as_deref();
        }
        false
    }

    /// Calls the type object: allocates an instance and runs its initializer.
    pub fn call(self: &Arc<Self>, args: &[Value]) -> RunResult<Value> {
        let Some(alloc) = self.slots.alloc else {
            return Err(ExcType::type_error(format!("cannot create '{}' instances", self.name)));
        };
        let obj = alloc(self);
        if let Some(init) = self.slots.init {
            init(&obj, args)?;
        }
        Ok(Value::Proxy(obj))
    }

    /// Looks up an attribute on the type object itself; methods come back unbound.
    pub fn getattr(&self, name: &str) -> RunResult<Value> {
        self.lookup(name)
            .map(TypeAttr::to_value)
            .ok_or_else(|| ExcType::attribute_error_type(&self.name, name))
    }
}

impl fmt::Debug for HostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostType")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("base", &self.base.as_ref().map(|base| base.name()))
            .field("attrs", &self.dict.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
