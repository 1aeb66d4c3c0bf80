//! # Dependency Pool
//!
//! A service registry for storing, constructing and observing shared objects.
//!
//! Objects are registered under a [`Key`]: by default the type name of the object, or an explicit
//! string when more than one instance of a type is needed. Other code looks them up by type or key,
//! builds new objects with registered factories that get their dependencies resolved from the
//! registry, and subscribes to add/remove notifications, all without holding references to each
//! other.
//!
//! ## Quick Start
//!
//! ```rust
//! use dependency_pool::Registry;
//! use std::sync::Arc;
//!
//! struct Logger;
//! struct Service {
//!     logger: Option<Arc<Logger>>,
//! }
//!
//! let registry = Registry::new();
//!
//! // Subscribe before anything is registered
//! let _subscription = registry.subscribe::<Logger, _>(|logger| {
//!     println!("logger available: {}", logger.is_some());
//! });
//!
//! // Register an object and a factory
//! registry.add(Logger);
//! registry.register_creator_with::<Service, (Logger,), _>(|(logger,)| Service { logger });
//!
//! // Build a service with its dependencies injected
//! let service = registry.create::<Service, (Logger,)>().unwrap();
//! assert!(Arc::ptr_eq(
//!     service.logger.as_ref().unwrap(),
//!     &registry.get::<Logger>().unwrap()
//! ));
//! ```
//!
//! ## Main Types and Functions
//!
//! - [`Registry`] - keyed store, construction engine and notification hub
//! - [`Key`] - slot identity, derived from a type or given explicitly
//! - [`Subscription`] - guard that ends a subscription when dropped
//! - [`Inject`] - deferred lookup against the process-wide registry
//! - [`instance`] / [`set_instance`] - the process-wide registry
//! - [`dep!`], [`di_new!`], [`di_get!`], [`di_add!`] - shorthand for the process-wide registry
//!
//! The registry is meant to be driven from a single logical owner. It is `Send + Sync` so that it
//! can live in a static, but it makes no ordering promises between concurrent callers.

mod construct;
mod inject;
mod key;
mod macros;
mod notify;
mod registry;
mod registry_error;
mod registry_event;
mod singleton;

pub use construct::Dependencies;
pub use inject::Inject;
pub use key::Key;
pub use notify::{AnyRef, Subscription, SubscriptionId};
pub use registry::{Registry, TraceCallback};
pub use registry_error::RegistryError;
pub use registry_event::RegistryEvent;
pub use singleton::{instance, reset_instance, set_instance};
