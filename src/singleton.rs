//! The process-wide registry.
//!
//! Prefer passing a [`Registry`] explicitly. The process-wide instance exists for call sites
//! that cannot be handed one, and for the [`dep!`](crate::dep) family of macros.

use std::sync::{Arc, LazyLock, RwLock};

use tracing::debug;

use crate::Registry;

/// Created on first access.
static INSTANCE: LazyLock<RwLock<Arc<Registry>>> =
    LazyLock::new(|| RwLock::new(Arc::new(Registry::new())));

/// Returns the process-wide registry, creating it on first use.
///
/// # Examples
///
/// ```
/// use dependency_pool::instance;
///
/// instance().add_with_key(8080u16, "doc.port");
/// assert_eq!(instance().get_with_key::<u16>("doc.port").as_deref(), Some(&8080));
/// ```
pub fn instance() -> Arc<Registry> {
    Arc::clone(&INSTANCE.read().unwrap_or_else(|p| p.into_inner()))
}

/// Replaces the process-wide registry and returns the previous one.
///
/// With `dispose_old`, the previous registry is cleared before it is returned: every object,
/// factory and subscription it still holds is dropped. Without it, the previous registry is left
/// untouched and stays usable through the returned handle and any handle obtained earlier.
///
/// Installing the registry that is already live never clears it.
pub fn set_instance(registry: impl Into<Arc<Registry>>, dispose_old: bool) -> Arc<Registry> {
    let registry = registry.into();
    let (previous, reinstalled) = {
        let mut live = INSTANCE.write().unwrap_or_else(|p| p.into_inner());
        let reinstalled = Arc::ptr_eq(&*live, &registry);
        (std::mem::replace(&mut *live, registry), reinstalled)
    };

    debug!(dispose_old, reinstalled, "process-wide registry replaced");
    if dispose_old && !reinstalled {
        previous.clear();
    }
    previous
}

/// Swaps in a fresh, empty registry and disposes of the old one.
pub fn reset_instance() {
    set_instance(Registry::new(), true);
}
