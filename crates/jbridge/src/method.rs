use std::{fmt, rc::Rc, sync::Arc};

use crate::{
    env,
    error::RunResult,
    proxy::ProxyObject,
    remote::MethodId,
    value::Value,
};

/// One concrete remote method or constructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub name: String,
    pub id: MethodId,
    /// Remote parameter type names, in declaration order.
    pub params: Vec<String>,
    pub is_static: bool,
}

impl MethodDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>, id: MethodId, params: Vec<String>, is_static: bool) -> Self {
        Self {
            name: name.into(),
            id,
            params,
            is_static,
        }
    }

    #[must_use]
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

/// The overloads of a remote method (or the constructors of a class) sharing one name.
///
/// Stored once per type and shared by all instances; it carries no instance.
/// Instance calls go through a [`BoundMethod`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverloadSet {
    name: String,
    overloads: Vec<MethodDescriptor>,
}

impl OverloadSet {
    #[must_use]
    pub fn new(name: impl Into<String>, overloads: Vec<MethodDescriptor>) -> Self {
        Self {
            name: name.into(),
            overloads,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn overloads(&self) -> &[MethodDescriptor] {
        &self.overloads
    }

    /// Calls the overload set through the attached [`crate::MethodDispatcher`].
    ///
    /// For instance methods the instance must be the first argument.
    pub fn call(self: &Arc<Self>, args: &[Value]) -> RunResult<Value> {
        let cx = env::require()?;
        cx.bindings().dispatcher().call(&cx, self, args)
    }
}

/// An overload set bound to one proxy instance.
///
/// Created fresh on every attribute access; calling it supplies the instance as
/// the first dispatch argument: `x.m(a)` becomes `X.m(x, a)`.
pub struct BoundMethod {
    method: Arc<OverloadSet>,
    instance: Rc<ProxyObject>,
}

impl BoundMethod {
    #[must_use]
    pub fn new(method: Arc<OverloadSet>, instance: Rc<ProxyObject>) -> Self {
        Self { method, instance }
    }

    #[must_use]
    pub fn method(&self) -> &Arc<OverloadSet> {
        &self.method
    }

    #[must_use]
    pub fn instance(&self) -> &Rc<ProxyObject> {
        &self.instance
    }

    pub fn call(&self, args: &[Value]) -> RunResult<Value> {
        let mut full_args = Vec::with_capacity(args.len() + 1);
        full_args.push(Value::Proxy(Rc::clone(&self.instance)));
        full_args.extend_from_slice(args);
        self.method.call(&full_args)
    }
}

impl fmt::Debug for BoundMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundMethod")
            .field("method", &self.method.name())
            .field("instance", &self.instance.type_name())
            .finish()
    }
}
