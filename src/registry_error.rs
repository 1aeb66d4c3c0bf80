use thiserror::Error;

use crate::Key;

/// Failures reported by the typed lookup and construction APIs.
///
/// Plain lookups (`get`, `remove`, `contains`) never produce these; they signal absence with
/// `None` or `false`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Key not found in registry: {key}")]
    NotFound { key: Key },

    #[error("Type mismatch in registry for key {key}: expected {expected}")]
    TypeMismatch { key: Key, expected: &'static str },

    #[error("No factory registered for key: {key}")]
    MissingFactory { key: Key },

    #[error("Factory for key {key} was not registered with dependencies {dependencies}")]
    FactorySignature {
        key: Key,
        dependencies: &'static str,
    },
}
