//! Deferred lookups that resolve against the process-wide registry on conversion.

use std::sync::Arc;

use crate::{instance, Key, Registry};

/// Deferred lookup against the process-wide registry.
///
/// An `Inject` carries only an optional key. Nothing is resolved until it is converted, so it can
/// be created before the object it stands for is registered.
///
/// ```
/// use dependency_pool::{instance, Inject};
/// use std::sync::Arc;
///
/// struct Clock;
///
/// let pending = Inject::new();
/// instance().add(Clock);
///
/// let clock: Option<Arc<Clock>> = pending.into();
/// assert!(clock.is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inject {
    key: Option<Key>,
}

impl Inject {
    /// Resolves by the default key of the requested type.
    pub const fn new() -> Self {
        Self { key: None }
    }

    /// Resolves by an explicit key.
    pub fn with_key(key: impl Into<Key>) -> Self {
        Self {
            key: Some(key.into()),
        }
    }

    pub fn key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    pub fn resolve<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.resolve_in(&instance())
    }

    pub fn resolve_in<T: Send + Sync + 'static>(&self, registry: &Registry) -> Option<Arc<T>> {
        match &self.key {
            Some(key) => registry.get_with_key(key.clone()),
            None => registry.get(),
        }
    }
}

impl<T: Send + Sync + 'static> From<Inject> for Option<Arc<T>> {
    fn from(inject: Inject) -> Self {
        inject.resolve()
    }
}
