#![doc = include_str!("../../../README.md")]

mod array;
mod attr;
mod bindings;
pub mod config;
pub mod env;
mod error;
mod global_ref;
mod method;
mod proxy;
mod registry;
pub mod remote;
mod slots;
pub mod tracer;
mod types;
mod value;

pub use crate::{
    bindings::{ArgMarshaller, Bindings, MethodDispatcher, OverloadResolver, ValueConverter},
    config::BridgeConfig,
    env::{AttachGuard, Attachment},
    error::{ExcType, RunError, RunResult, SimpleException},
    global_ref::GlobalRef,
    method::{BoundMethod, MethodDescriptor, OverloadSet},
    proxy::ProxyObject,
    registry::TypeRegistry,
    remote::{CallFrame, MethodId, RawRef, RemoteEnv, RemoteValue},
    slots::{install_slots, is_proxy_instance, is_proxy_type},
    tracer::{BridgeTracer, NoopTracer, RecordingTracer, StderrTracer, TraceEvent},
    types::{CONSTRUCTOR_ATTR, Constant, HostType, SequenceSlots, TypeAttr, TypeDescriptor, TypeKind, TypeSlots},
    value::Value,
};
