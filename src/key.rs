//! Registry keys.
//!
//! Every entry, factory and subscription is indexed by a [`Key`]. The default key of a type is
//! its compile-time type name; explicit keys are used verbatim and are the only way to keep more
//! than one instance of the same type in a registry.

use std::borrow::Cow;
use std::fmt;

/// Immutable string identity of a registry slot.
///
/// Keys compare by content and are case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(Cow<'static, str>);

impl Key {
    /// Default key for `T`, derived from [`std::any::type_name`].
    pub fn of<T: ?Sized + 'static>() -> Self {
        Key(Cow::Borrowed(std::any::type_name::<T>()))
    }

    /// Explicit key, used as given.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Key(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for Key {
    fn from(name: &'static str) -> Self {
        Key(Cow::Borrowed(name))
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key(Cow::Owned(name))
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
