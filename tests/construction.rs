//! Integration tests for factories and dependency injection through `create`.

use dependency_pool::{Key, Registry, RegistryError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct Logger;

struct Database {
    url: String,
}

struct Service {
    logger: Option<Arc<Logger>>,
    database: Option<Arc<Database>>,
}

#[test]
fn test_create_injects_registered_dependencies() {
    let registry = Registry::new();
    registry.register_creator_with::<Service, (Logger, Database), _>(|(logger, database)| {
        Service { logger, database }
    });
    registry.add(Logger);
    registry.add(Database {
        url: "sqlite::memory:".to_string(),
    });

    let service = registry.create::<Service, (Logger, Database)>().unwrap();

    let logger = registry.get::<Logger>().unwrap();
    let database = registry.get::<Database>().unwrap();
    assert!(Arc::ptr_eq(service.logger.as_ref().unwrap(), &logger));
    assert!(Arc::ptr_eq(service.database.as_ref().unwrap(), &database));
    assert_eq!(service.database.unwrap().url, "sqlite::memory:");
}

#[test]
fn test_create_passes_none_for_unregistered_dependency() {
    let registry = Registry::new();
    registry.register_creator_with::<Service, (Logger, Database), _>(|(logger, database)| {
        Service { logger, database }
    });
    registry.add(Logger);

    let service = registry.create::<Service, (Logger, Database)>().unwrap();
    assert!(service.logger.is_some());
    assert!(service.database.is_none());
}

#[test]
fn test_created_object_is_not_registered() {
    let registry = Registry::new();
    registry.register_creator(|| Logger);

    let _logger = registry.create::<Logger, ()>().unwrap();
    assert!(!registry.contains::<Logger>());
}

#[test]
fn test_each_create_builds_new_object() {
    let registry = Registry::new();
    let counter = Arc::new(AtomicUsize::new(0));

    let counter_clone = counter.clone();
    registry.register_creator(move || counter_clone.fetch_add(1, Ordering::SeqCst));

    assert_eq!(registry.create::<usize, ()>().unwrap(), 0);
    assert_eq!(registry.create::<usize, ()>().unwrap(), 1);
    assert_eq!(counter.load(Ordering::SeqCst), 2);
}

#[test]
fn test_factory_result_is_returned() {
    let registry = Registry::new();
    registry.register_creator(|| Database {
        url: "from-factory".to_string(),
    });

    let database = registry.create::<Database, ()>().unwrap();
    assert_eq!(database.url, "from-factory");
}

#[test]
fn test_missing_factory_is_an_error() {
    let registry = Registry::new();
    registry.add(Logger);

    let result = registry.create::<Service, (Logger,)>();
    assert_eq!(
        result.err(),
        Some(RegistryError::MissingFactory {
            key: Key::of::<Service>()
        })
    );
}

#[test]
fn test_wrong_dependency_list_is_an_error() {
    let registry = Registry::new();
    registry.register_creator_with::<Service, (Logger,), _>(|(logger,)| Service {
        logger,
        database: None,
    });

    let result = registry.create::<Service, (Logger, Database)>();
    assert!(matches!(
        result,
        Err(RegistryError::FactorySignature { ref key, .. }) if *key == Key::of::<Service>()
    ));
}

#[test]
fn test_register_creator_overwrites() {
    let registry = Registry::new();
    registry.register_creator(|| 1u32);
    registry.register_creator(|| 2u32);
    assert_eq!(registry.create::<u32, ()>().unwrap(), 2);
}

#[test]
fn test_default_creator_and_removal() {
    let registry = Registry::new();
    registry.register_default_creator::<Vec<String>>();
    assert!(registry.has_creator::<Vec<String>>());
    assert!(registry.create::<Vec<String>, ()>().unwrap().is_empty());

    assert!(registry.remove_creator::<Vec<String>>());
    assert!(!registry.remove_creator::<Vec<String>>());
    assert!(registry.create::<Vec<String>, ()>().is_err());
}

#[test]
fn test_factory_is_independent_of_entry() {
    let registry = Registry::new();
    registry.register_creator(|| Database {
        url: "fresh".to_string(),
    });
    registry.add(Database {
        url: "registered".to_string(),
    });

    assert_eq!(registry.create::<Database, ()>().unwrap().url, "fresh");
    assert_eq!(registry.get::<Database>().unwrap().url, "registered");

    registry.remove::<Database>();
    assert!(registry.has_creator::<Database>());
}

#[test]
fn test_factory_may_use_registry() {
    let registry = Arc::new(Registry::new());
    let weak = Arc::downgrade(&registry);

    registry.register_creator(move || {
        let url = weak
            .upgrade()
            .and_then(|r| r.get_with_key::<String>("db.url"))
            .map(|url| url.to_string())
            .unwrap_or_default();
        Database { url }
    });
    registry.add_with_key("postgres://db".to_string(), "db.url");

    assert_eq!(registry.create::<Database, ()>().unwrap().url, "postgres://db");
}
