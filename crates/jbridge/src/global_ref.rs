use crate::{
    env::{self, Attachment},
    error::{ExcType, RunResult},
    remote::RawRef,
};

/// Owned persistent reference to a remote object.
///
/// Acquiring one keeps the remote object reachable for the remote collector;
/// dropping it releases the reference through the current thread's attachment.
/// If the thread is no longer attached (e.g. the remote runtime has been torn
/// down) the release is skipped: no further ownership accounting is possible.
///
/// Not `Clone`: exactly one owner releases each reference.
#[derive(Debug, PartialEq, Eq)]
pub struct GlobalRef {
    raw: RawRef,
}

impl GlobalRef {
    /// Promotes `local` to a persistent reference.
    ///
    /// Fails with `MemoryError` if the remote runtime cannot create the reference.
    pub fn new(cx: &Attachment, local: RawRef) -> RunResult<Self> {
        let raw = cx.env().new_global_ref(local).ok_or_else(ExcType::no_memory)?;
        cx.tracer().on_global_ref_acquired(raw);
        Ok(Self { raw })
    }

    #[must_use]
    pub fn raw(&self) -> RawRef {
        self.raw
    }
}

impl Drop for GlobalRef {
    fn drop(&mut self) {
        if let Some(cx) = env::current() {
            cx.env().delete_global_ref(self.raw);
            cx.tracer().on_global_ref_released(self.raw);
        }
    }
}
