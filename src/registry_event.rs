use crate::Key;

/// Events emitted by a registry during operations.
///
/// These events are passed to the tracing callback set via
/// [`Registry::set_trace_callback`](crate::Registry::set_trace_callback).
///
/// # Examples
///
/// ```rust
/// use dependency_pool::{Key, RegistryEvent};
///
/// let event = RegistryEvent::Add { key: Key::new("cache"), replaced: false };
/// assert_eq!(event.to_string(), "add { key: cache, replaced: false }");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryEvent {
    /// An object was stored under a key.
    Add {
        key: Key,
        /// Whether an earlier occupant was displaced.
        replaced: bool,
    },

    /// An object was requested.
    Get { key: Key, found: bool },

    /// An existence check was performed.
    Contains { key: Key, found: bool },

    /// An entry was detached from the registry.
    Remove {
        key: Key,
        /// `false` when ownership was handed back to the caller.
        released: bool,
    },

    /// A factory was invoked.
    Create { key: Key },

    /// Subscribers of a key were notified.
    Notify { key: Key, delivered: usize },

    /// The registry was cleared.
    Clear {},
}

impl std::fmt::Display for RegistryEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryEvent::Add { key, replaced } => {
                write!(f, "add {{ key: {key}, replaced: {replaced} }}")
            }
            RegistryEvent::Get { key, found } => {
                write!(f, "get {{ key: {key}, found: {found} }}")
            }
            RegistryEvent::Contains { key, found } => {
                write!(f, "contains {{ key: {key}, found: {found} }}")
            }
            RegistryEvent::Remove { key, released } => {
                write!(f, "remove {{ key: {key}, released: {released} }}")
            }
            RegistryEvent::Create { key } => write!(f, "create {{ key: {key} }}"),
            RegistryEvent::Notify { key, delivered } => {
                write!(f, "notify {{ key: {key}, delivered: {delivered} }}")
            }
            RegistryEvent::Clear {} => write!(f, "clear {{}}"),
        }
    }
}
