//! Bridge diagnostics.
//!
//! The [`BridgeTracer`] trait defines hook points at the events worth seeing
//! when debugging a bridge: persistent references being acquired and released,
//! proxy types becoming ready, proxies being deallocated, and remote exceptions
//! being consumed. Concrete implementations decide what to do with them:
//!
//! | Tracer | Purpose |
//! |--------|---------|
//! | [`NoopTracer`] | No-op (default) |
//! | [`StderrTracer`] | Human-readable log to stderr (debug mode) |
//! | [`RecordingTracer`] | Full event recording for tests or post-mortem |
//!
//! The tracer lives on the thread's [`Attachment`](crate::Attachment), so events
//! raised while no thread is attached are not observed.

use std::cell::RefCell;

use crate::remote::RawRef;

/// Trace event captured by [`RecordingTracer`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TraceEvent {
    /// A proxy type finished slot installation.
    TypeReady {
        name: String,
        /// Whether the sequence protocol was installed.
        is_array: bool,
    },
    GlobalRefAcquired { handle: u64 },
    GlobalRefReleased { handle: u64 },
    /// A proxy instance was deallocated; `handle` is `None` if it was never initialized.
    ProxyDealloc { type_name: String, handle: Option<u64> },
    /// A pending remote exception was consumed.
    RemoteException {
        operation: String,
        description: Option<String>,
    },
}

/// Trait for bridge tracing.
///
/// All methods have default no-op implementations; implementations only
/// override the hooks they care about.
pub trait BridgeTracer: std::fmt::Debug {
    #[inline(always)]
    fn on_type_ready(&self, _name: &str, _is_array: bool) {}

    #[inline(always)]
    fn on_global_ref_acquired(&self, _handle: RawRef) {}

    #[inline(always)]
    fn on_global_ref_released(&self, _handle: RawRef) {}

    /// Called when a proxy instance is deallocated, before its handle is released.
    #[inline(always)]
    fn on_proxy_dealloc(&self, _type_name: &str, _handle: Option<RawRef>) {}

    /// Called after a pending remote exception was described and cleared.
    ///
    /// # Arguments
    /// * `operation` - The remote operation that failed
    /// * `description` - The remote exception's description, if it was captured
    #[inline(always)]
    fn on_remote_exception(&self, _operation: &str, _description: Option<&str>) {}
}

// ============================================================================
// NoopTracer: default
// ============================================================================

/// A tracer that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTracer;

impl BridgeTracer for NoopTracer {}

// ============================================================================
// StderrTracer: human-readable log
// ============================================================================

/// Tracer that prints a human-readable log to stderr.
///
/// Output format:
/// ```text
/// [jbridge] type ready: java.lang.String[] (array)
/// [jbridge] +global 0x2a
/// [jbridge] dealloc java.lang.String[] objectRef=0x2a
/// [jbridge] -global 0x2a
/// [jbridge] remote exception in object array element access: java.lang.ArrayIndexOutOfBoundsException
/// ```
#[derive(Debug, Default)]
pub struct StderrTracer;

impl StderrTracer {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl BridgeTracer for StderrTracer {
    fn on_type_ready(&self, name: &str, is_array: bool) {
        if is_array {
            eprintln!("[jbridge] type ready: {name} (array)");
        } else {
            eprintln!("[jbridge] type ready: {name}");
        }
    }

    fn on_global_ref_acquired(&self, handle: RawRef) {
        eprintln!("[jbridge] +global {handle:#x}");
    }

    fn on_global_ref_released(&self, handle: RawRef) {
        eprintln!("[jbridge] -global {handle:#x}");
    }

    fn on_proxy_dealloc(&self, type_name: &str, handle: Option<RawRef>) {
        match handle {
            Some(handle) => eprintln!("[jbridge] dealloc {type_name} objectRef={handle:#x}"),
            None => eprintln!("[jbridge] dealloc {type_name} objectRef=0x0"),
        }
    }

    fn on_remote_exception(&self, operation: &str, description: Option<&str>) {
        let description = description.unwrap_or("<no description>");
        eprintln!("[jbridge] remote exception in {operation}: {description}");
    }
}

// ============================================================================
// RecordingTracer: full event recording
// ============================================================================

/// Tracer that records every event for later inspection.
#[derive(Debug, Default)]
pub struct RecordingTracer {
    events: RefCell<Vec<TraceEvent>>,
}

impl RecordingTracer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the events recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<TraceEvent> {
        self.events.borrow().clone()
    }

    /// Takes the recorded events, leaving the recording empty.
    pub fn take_events(&self) -> Vec<TraceEvent> {
        self.events.take()
    }

    /// Counts `(acquired, released)` persistent reference events.
    #[must_use]
    pub fn global_ref_balance(&self) -> (usize, usize) {
        self.events.borrow().iter().fold((0, 0), |(acquired, released), event| match event {
            TraceEvent::GlobalRefAcquired { .. } => (acquired + 1, released),
            TraceEvent::GlobalRefReleased { .. } => (acquired, released + 1),
            _ => (acquired, released),
        })
    }

    fn record(&self, event: TraceEvent) {
        self.events.borrow_mut().push(event);
    }
}

impl BridgeTracer for RecordingTracer {
    fn on_type_ready(&self, name: &str, is_array: bool) {
        self.record(TraceEvent::TypeReady {
            name: name.to_owned(),
            is_array,
        });
    }

    fn on_global_ref_acquired(&self, handle: RawRef) {
        self.record(TraceEvent::GlobalRefAcquired { handle: handle.get() });
    }

    fn on_global_ref_released(&self, handle: RawRef) {
        self.record(TraceEvent::GlobalRefReleased { handle: handle.get() });
    }

    fn on_proxy_dealloc(&self, type_name: &str, handle: Option<RawRef>) {
        self.record(TraceEvent::ProxyDealloc {
            type_name: type_name.to_owned(),
            handle: handle.map(RawRef::get),
        });
    }

    fn on_remote_exception(&self, operation: &str, description: Option<&str>) {
        self.record(TraceEvent::RemoteException {
            operation: operation.to_owned(),
            description: description.map(str::to_owned),
        });
    }
}
