//! Basic usage example for dependency-pool.
//!
//! Demonstrates:
//! - Registering objects under their default key and under explicit keys
//! - Retrieving values with `get()` (returns `Option<Arc<T>>`)
//! - Registering a factory and building an object with `create()`
//! - Removing objects with `remove()` and `take()`
//!
//! Run with: `cargo run --example basic_usage`

use dependency_pool::Registry;
use std::sync::Arc;

#[derive(Debug)]
struct AppConfig {
    name: String,
    version: u32,
}

#[derive(Debug)]
struct Database {
    url: String,
}

struct ReportService {
    config: Option<Arc<AppConfig>>,
    database: Option<Arc<Database>>,
}

impl ReportService {
    fn describe(&self) -> String {
        match (&self.config, &self.database) {
            (Some(config), Some(db)) => {
                format!("{} v{} reporting from {}", config.name, config.version, db.url)
            }
            _ => "missing dependencies".to_string(),
        }
    }
}

fn main() {
    println!("=== dependency-pool: Basic Usage ===\n");

    let registry = Registry::new();

    // -------------------------------------------------------------------------
    // 1. Register objects under their default key
    // -------------------------------------------------------------------------
    println!("1. Registering objects...");

    registry.add(AppConfig {
        name: "MyApp".to_string(),
        version: 1,
    });
    registry.add(Database {
        url: "postgresql://localhost/main".to_string(),
    });

    println!("   Registered: AppConfig, Database");

    // -------------------------------------------------------------------------
    // 2. Register a second Database under an explicit key
    // -------------------------------------------------------------------------
    println!("\n2. Registering a second Database under \"replica\"...");

    registry.add_with_key(
        Database {
            url: "postgresql://replica/main".to_string(),
        },
        "replica",
    );

    for key in registry.keys() {
        println!("   key: {}", key);
    }

    // -------------------------------------------------------------------------
    // 3. Retrieve values
    // -------------------------------------------------------------------------
    println!("\n3. Retrieving values with get()...");

    let primary: Arc<Database> = registry.get().unwrap();
    let replica: Arc<Database> = registry.get_with_key("replica").unwrap();
    println!("   primary: {}", primary.url);
    println!("   replica: {}", replica.url);
    println!("   Vec<u8> registered? {}", registry.get::<Vec<u8>>().is_some());

    // -------------------------------------------------------------------------
    // 4. Build an object with a factory
    // -------------------------------------------------------------------------
    println!("\n4. Building ReportService with create()...");

    registry.register_creator_with::<ReportService, (AppConfig, Database), _>(
        |(config, database)| ReportService { config, database },
    );

    match registry.create::<ReportService, (AppConfig, Database)>() {
        Ok(service) => println!("   {}", service.describe()),
        Err(e) => println!("   Error: {}", e),
    }
    println!(
        "   ReportService registered? {} (created objects are not registered)",
        registry.contains::<ReportService>()
    );

    // -------------------------------------------------------------------------
    // 5. Remove and take
    // -------------------------------------------------------------------------
    println!("\n5. Removing objects...");

    println!("   remove::<AppConfig>() = {}", registry.remove::<AppConfig>());
    println!("   remove::<AppConfig>() = {}", registry.remove::<AppConfig>());

    let taken = registry.take_with_key::<Database>("replica").unwrap();
    println!(
        "   took {:?}, strong count {}",
        taken.url,
        Arc::strong_count(&taken)
    );

    // -------------------------------------------------------------------------
    // Summary
    // -------------------------------------------------------------------------
    println!("\n=== Example Complete ===");
    println!("The registry now contains {} object(s).", registry.len());
}
