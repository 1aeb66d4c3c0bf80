//! Dependency lists for the construction engine.
//!
//! A dependency list is a tuple of types, e.g. `(Logger, Database)`. Resolving it against a
//! registry yields the matching tuple of `Option<Arc<_>>`, with `None` for every type that is not
//! registered.

use std::sync::Arc;

use crate::Registry;

/// A tuple of types that can be resolved through [`Registry::get`].
///
/// Implemented for tuples of up to eight types, including `()`.
pub trait Dependencies: 'static {
    /// The tuple handed to a factory.
    type Resolved;

    fn resolve(registry: &Registry) -> Self::Resolved;
}

/// Stored recipe for `T`, taking the resolved dependency tuple of `D`.
pub(crate) struct Creator<T, D: Dependencies>(
    pub(crate) Box<dyn Fn(D::Resolved) -> T + Send + Sync>,
);

macro_rules! dependency_tuple ({ $($dep:ident)* } => {
    #[allow(clippy::unused_unit)]
    impl<$($dep: Send + Sync + 'static,)*> Dependencies for ($($dep,)*) {
        type Resolved = ($(Option<Arc<$dep>>,)*);

        #[inline]
        fn resolve(_registry: &Registry) -> Self::Resolved {
            ($(_registry.get::<$dep>(),)*)
        }
    }
});

dependency_tuple! {}
dependency_tuple! { A }
dependency_tuple! { A B }
dependency_tuple! { A B C }
dependency_tuple! { A B C D }
dependency_tuple! { A B C D E }
dependency_tuple! { A B C D E F }
dependency_tuple! { A B C D E F G }
dependency_tuple! { A B C D E F G H }
