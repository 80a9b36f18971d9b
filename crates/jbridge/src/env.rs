//! Per-thread attachment to the remote runtime.
//!
//! Every bridge operation that touches the remote runtime first looks up the
//! current thread's [`Attachment`]. Threads are never attached implicitly: an
//! operation on an unattached thread fails immediately with a `RuntimeError`.
//!
//! ```ignore
//! let _guard = env::attach(Attachment::new(remote_env, bindings));
//! let value = array_type.call(&[])?;
//! // dropping the guard detaches the thread again
//! ```

use std::{cell::RefCell, fmt, rc::Rc};

use crate::{
    bindings::Bindings,
    config::BridgeConfig,
    error::{ExcType, RunResult},
    remote::RemoteEnv,
    tracer::{BridgeTracer, NoopTracer, StderrTracer},
};

thread_local! {
    static ATTACHED: RefCell<Option<Rc<Attachment>>> = const { RefCell::new(None) };
}

/// Everything an attached thread needs to perform remote operations.
pub struct Attachment {
    env: Rc<dyn RemoteEnv>,
    bindings: Bindings,
    tracer: Rc<dyn BridgeTracer>,
    config: BridgeConfig,
}

impl Attachment {
    /// Creates an attachment with the default configuration and no tracing.
    #[must_use]
    pub fn new(env: Rc<dyn RemoteEnv>, bindings: Bindings) -> Self {
        Self {
            env,
            bindings,
            tracer: Rc::new(NoopTracer),
            config: BridgeConfig::default(),
        }
    }

    /// Replaces the configuration.
    ///
    /// With `debug` enabled the attachment logs to stderr, unless a tracer is
    /// installed afterwards with [`Attachment::with_tracer`].
    #[must_use]
    pub fn with_config(mut self, config: BridgeConfig) -> Self {
        if config.debug {
            self.tracer = Rc::new(StderrTracer::new());
        }
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_tracer(mut self, tracer: Rc<dyn BridgeTracer>) -> Self {
        self.tracer = tracer;
        self
    }

    #[must_use]
    pub fn env(&self) -> &dyn RemoteEnv {
        &*self.env
    }

    #[must_use]
    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    #[must_use]
    pub fn tracer(&self) -> &dyn BridgeTracer {
        &*self.tracer
    }

    #[must_use]
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Consumes a pending remote exception, if any, and reports it as a `RuntimeError`.
    ///
    /// Must be called after every remote call that can fail on the remote side:
    /// a pending exception left in place corrupts every later call on this thread.
    pub(crate) fn check_exception(&self, operation: &str) -> RunResult<()> {
        if !self.env.exception_check() {
            return Ok(());
        }
        let description = if self.config.describe_remote_exceptions {
            self.env.exception_describe()
        } else {
            None
        };
        self.env.exception_clear();
        self.tracer.on_remote_exception(operation, description.as_deref());
        Err(match description {
            Some(description) => ExcType::runtime_error(format!("{operation} failed: {description}")),
            None => ExcType::runtime_error(format!("{operation} failed")),
        })
    }
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("env", &self.env)
            .field("tracer", &self.tracer)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Keeps the current thread attached; restores the previous attachment on drop.
#[must_use = "the thread is detached as soon as the guard is dropped"]
#[derive(Debug)]
pub struct AttachGuard {
    previous: Option<Rc<Attachment>>,
}

impl Drop for AttachGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        // dropped outside the borrow, the attachment may own values with their own Drop
        let _detached = ATTACHED.try_with(|slot| slot.replace(previous));
    }
}

/// Attaches the current thread, nesting over any existing attachment.
pub fn attach(attachment: Attachment) -> AttachGuard {
    let attachment = Rc::new(attachment);
    let previous = ATTACHED.with(|slot| slot.replace(Some(attachment)));
    AttachGuard { previous }
}

/// Returns the current thread's attachment, if any.
///
/// A thread in the middle of tearing down its thread-locals counts as unattached.
#[must_use]
pub fn current() -> Option<Rc<Attachment>> {
    ATTACHED
        .try_with(|slot| slot.try_borrow().ok().and_then(|attached| attached.clone()))
        .ok()
        .flatten()
}

/// Returns the current thread's attachment or fails with `RuntimeError`.
pub fn require() -> RunResult<Rc<Attachment>> {
    current().ok_or_else(|| ExcType::runtime_error("no remote runtime environment attached to the current thread"))
}

#[must_use]
pub fn is_attached() -> bool {
    current().is_some()
}
