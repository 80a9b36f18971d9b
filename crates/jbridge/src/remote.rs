//! Interface to the remote (managed, garbage-collected) runtime.
//!
//! The bridge never talks to the remote runtime directly: every operation goes
//! through a [`RemoteEnv`], the per-thread invocation environment handed out by
//! [`crate::env`]. Handles crossing the boundary are opaque [`RawRef`]s; a null
//! remote reference is represented as `None` wherever one can occur.

use std::{fmt, num::NonZeroU64};

use smallvec::SmallVec;

/// Opaque, non-null remote object reference.
///
/// Whether the handle is local or persistent is decided by the remote runtime;
/// persistent ownership is modelled by [`crate::GlobalRef`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct RawRef(NonZeroU64);

impl RawRef {
    /// Creates a reference from a raw handle value, returning `None` for the null handle.
    #[must_use]
    pub fn new(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Self)
    }

    /// Returns the raw handle value.
    #[must_use]
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::LowerHex for RawRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

/// Identifier of a remote method or constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct MethodId(u64);

impl MethodId {
    #[must_use]
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// A single argument slot of a remote call frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RemoteValue {
    Bool(bool),
    Byte(i8),
    Char(u16),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Object(Option<RawRef>),
}

/// Transient argument frame for a remote call.
///
/// Built by an [`crate::ArgMarshaller`] and released by the caller once the
/// remote call has returned.
pub type CallFrame = SmallVec<[RemoteValue; 8]>;

/// The remote runtime's invocation environment for the current thread.
///
/// Methods mirror the remote runtime's native interface. A remote-side failure
/// leaves a *pending exception* that must be observed with [`exception_check`]
/// and consumed with [`exception_clear`] before any further remote call is made;
/// implementations are entitled to misbehave otherwise.
///
/// [`exception_check`]: RemoteEnv::exception_check
/// [`exception_clear`]: RemoteEnv::exception_clear
pub trait RemoteEnv: fmt::Debug {
    /// Creates a persistent reference to `obj`. `None` means the remote runtime ran out of memory.
    fn new_global_ref(&self, obj: RawRef) -> Option<RawRef>;

    /// Releases a persistent reference created by [`RemoteEnv::new_global_ref`].
    fn delete_global_ref(&self, global: RawRef);

    /// Releases a local reference returned by a remote call.
    fn delete_local_ref(&self, _local: RawRef) {}

    /// Invokes `constructor` on `class` with the given frame.
    fn new_object(&self, class: RawRef, constructor: MethodId, args: &[RemoteValue]) -> Option<RawRef>;

    fn array_length(&self, array: RawRef) -> i32;

    fn object_array_element(&self, array: RawRef, index: i32) -> Option<RawRef>;

    fn set_object_array_element(&self, array: RawRef, index: i32, value: Option<RawRef>);

    /// Calls the remote object's own string conversion method.
    fn object_to_string(&self, obj: RawRef) -> Option<String>;

    fn exception_check(&self) -> bool;

    /// Describes the pending exception, if any, without clearing it.
    fn exception_describe(&self) -> Option<String>;

    fn exception_clear(&self);
}
