use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use ahash::AHashMap;

use crate::{
    error::{ExcType, RunResult},
    remote::RawRef,
    slots::install_slots,
    types::{HostType, TypeDescriptor},
};

/// Process-wide registry of proxy types, keyed by remote class identity.
///
/// Types are installed once, the first time their class is registered, and
/// never removed. Lookups may happen from any thread.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: RwLock<AHashMap<RawRef, Arc<HostType>>>,
}

static GLOBAL_REGISTRY: OnceLock<TypeRegistry> = OnceLock::new();

impl TypeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the process-wide registry, creating it on first use.
    pub fn global() -> &'static Self {
        GLOBAL_REGISTRY.get_or_init(Self::new)
    }

    /// Installs the type for `descriptor`'s class, or returns the already installed one.
    ///
    /// Fails with `RuntimeError` if the descriptor has no class identity or the
    /// type cannot be made ready.
    pub fn register(&self, descriptor: TypeDescriptor) -> RunResult<Arc<HostType>> {
        let Some(class_ref) = descriptor.class_ref else {
            return Err(ExcType::runtime_error(format!(
                "cannot register type '{}' without a remote class reference",
                descriptor.name
            )));
        };
        if let Some(existing) = self.get(class_ref) {
            return Ok(existing);
        }

        let ty = install_slots(descriptor)?;
        let mut types = self.types.write().unwrap_or_else(PoisonError::into_inner);
        // another thread may have registered the class while this one installed it
        Ok(Arc::clone(types.entry(class_ref).or_insert(ty)))
    }

    #[must_use]
    pub fn get(&self, class_ref: RawRef) -> Option<Arc<HostType>> {
        let types = self.types.read().unwrap_or_else(PoisonError::into_inner);
        types.get(&class_ref).cloned()
    }

    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Option<Arc<HostType>> {
        let types = self.types.read().unwrap_or_else(PoisonError::into_inner);
        types.values().find(|ty| ty.name() == name).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.types.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
