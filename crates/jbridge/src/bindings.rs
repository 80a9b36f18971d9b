//! Collaborators the bridge delegates to.
//!
//! Picking an overload, marshalling arguments into a remote call frame,
//! converting values between the runtimes and invoking remote methods are all
//! owned by the embedding. The bridge only calls them at the right moments,
//! through the [`Bindings`] carried by the thread's attachment.

use std::{fmt, rc::Rc, sync::Arc};

use crate::{
    env::Attachment,
    error::RunResult,
    method::{MethodDescriptor, OverloadSet},
    remote::{CallFrame, RawRef},
    types::HostType,
    value::Value,
};

/// Selects one overload for an argument tuple.
pub trait OverloadResolver {
    /// Fails when no overload matches; the error is surfaced unchanged.
    fn find_method<'a>(
        &self,
        cx: &Attachment,
        set: &'a OverloadSet,
        args: &[Value],
    ) -> RunResult<&'a MethodDescriptor>;
}

/// Converts host arguments into a remote call frame for a selected overload.
pub trait ArgMarshaller {
    fn create_args(&self, cx: &Attachment, method: &MethodDescriptor, args: &[Value]) -> RunResult<CallFrame>;
}

/// Converts values between the two runtimes following a type's conversion rule.
///
/// Failures should be reported with [`crate::RunError::conversion`].
pub trait ValueConverter {
    /// Converts a raw remote reference (possibly null) into a host value of type `ty`.
    fn to_host(&self, cx: &Attachment, ty: &Arc<HostType>, raw: Option<RawRef>) -> RunResult<Value>;

    /// Converts a host value into a remote reference of type `ty`.
    fn to_remote(&self, cx: &Attachment, ty: &Arc<HostType>, value: &Value) -> RunResult<Option<RawRef>>;
}

/// Calls an overload set with a full argument tuple (instance first for instance methods).
pub trait MethodDispatcher {
    fn call(&self, cx: &Attachment, set: &Arc<OverloadSet>, args: &[Value]) -> RunResult<Value>;
}

/// The collaborators of one attachment.
#[derive(Clone)]
pub struct Bindings {
    resolver: Rc<dyn OverloadResolver>,
    marshaller: Rc<dyn ArgMarshaller>,
    converter: Rc<dyn ValueConverter>,
    dispatcher: Rc<dyn MethodDispatcher>,
}

impl Bindings {
    #[must_use]
    pub fn new(
        resolver: Rc<dyn OverloadResolver>,
        marshaller: Rc<dyn ArgMarshaller>,
        converter: Rc<dyn ValueConverter>,
        dispatcher: Rc<dyn MethodDispatcher>,
    ) -> Self {
        Self {
            resolver,
            marshaller,
            converter,
            dispatcher,
        }
    }

    /// Uses one value implementing every collaborator trait.
    #[must_use]
    pub fn from_shared<T>(shared: &Rc<T>) -> Self
    where
        T: OverloadResolver + ArgMarshaller + ValueConverter + MethodDispatcher + 'static,
    {
        Self::new(shared.clone(), shared.clone(), shared.clone(), shared.clone())
    }

    #[must_use]
    pub fn resolver(&self) -> &dyn OverloadResolver {
        &*self.resolver
    }

    #[must_use]
    pub fn marshaller(&self) -> &dyn ArgMarshaller {
        &*self.marshaller
    }

    #[must_use]
    pub fn converter(&self) -> &dyn ValueConverter {
        &*self.converter
    }

    #[must_use]
    pub fn dispatcher(&self) -> &dyn MethodDispatcher {
        &*self.dispatcher
    }
}

impl fmt::Debug for Bindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bindings").finish_non_exhaustive()
    }
}
