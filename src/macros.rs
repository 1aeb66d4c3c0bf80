//! Shorthand for the process-wide registry.
//!
//! Each macro forwards to [`instance()`](crate::instance). Code that can take a
//! [`Registry`](crate::Registry) argument should do so instead.

/// The process-wide registry.
///
/// ```rust
/// use dependency_pool::dep;
///
/// dep!().add_with_key(true, "doc.flag");
/// assert!(dep!().contains_key("doc.flag"));
/// ```
#[macro_export]
macro_rules! dep {
    () => {
        $crate::instance()
    };
}

/// Builds a type with its registered factory, injecting the listed dependency types.
///
/// `di_new!(Service, Logger, Db)` expands to
/// `instance().create::<Service, (Logger, Db)>()`.
///
/// ```rust
/// use dependency_pool::{dep, di_new};
/// use std::sync::Arc;
///
/// struct Greeting(String);
/// struct Greeter { greeting: Option<Arc<Greeting>> }
///
/// dep!().register_creator_with::<Greeter, (Greeting,), _>(|(greeting,)| Greeter { greeting });
/// dep!().add(Greeting("hi".into()));
///
/// let greeter = di_new!(Greeter, Greeting).unwrap();
/// assert_eq!(greeter.greeting.unwrap().0, "hi");
/// ```
#[macro_export]
macro_rules! di_new {
    ($ty:ty) => {
        $crate::instance().create::<$ty, ()>()
    };
    ($ty:ty, $($dep:ty),+ $(,)?) => {
        $crate::instance().create::<$ty, ($($dep,)+)>()
    };
}

/// Looks up a type in the process-wide registry, by default key or by explicit key.
#[macro_export]
macro_rules! di_get {
    ($ty:ty) => {
        $crate::instance().get::<$ty>()
    };
    ($ty:ty, $key:expr) => {
        $crate::instance().get_with_key::<$ty>($key)
    };
}

/// Registers `Default::default()` of a type in the process-wide registry.
#[macro_export]
macro_rules! di_add {
    ($ty:ty) => {
        $crate::instance().add_default::<$ty>()
    };
}

#[cfg(test)]
mod tests {
    use crate::{reset_instance, RegistryError};
    use serial_test::serial;
    use std::sync::Arc;

    #[derive(Default)]
    struct Logger;

    struct Service {
        logger: Option<Arc<Logger>>,
    }

    #[test]
    #[serial]
    fn test_di_add_and_get() {
        reset_instance();
        let added = di_add!(Logger);
        let fetched = di_get!(Logger).unwrap();
        assert!(Arc::ptr_eq(&added, &fetched));
        assert!(dep!().contains::<Logger>());
    }

    #[test]
    #[serial]
    fn test_di_get_with_key() {
        reset_instance();
        dep!().add_with_key(5u8, "five");
        assert_eq!(di_get!(u8, "five").as_deref(), Some(&5));
        assert!(di_get!(u8).is_none());
    }

    #[test]
    #[serial]
    fn test_di_new_injects_dependencies() {
        reset_instance();
        dep!().register_creator_with::<Service, (Logger,), _>(|(logger,)| Service { logger });
        let logger = di_add!(Logger);

        let service = di_new!(Service, Logger).unwrap();
        assert!(Arc::ptr_eq(&service.logger.unwrap(), &logger));
        assert!(!dep!().contains::<Service>());
    }

    #[test]
    #[serial]
    fn test_di_new_without_dependencies() {
        reset_instance();
        assert!(matches!(
            di_new!(Logger),
            Err(RegistryError::MissingFactory { .. })
        ));

        dep!().register_default_creator::<Logger>();
        assert!(di_new!(Logger).is_ok());
    }
}
