//! Notification example for dependency-pool.
//!
//! Demonstrates:
//! - Subscriber-bound notifications that end when the subscriber is dropped
//! - Guard-based subscriptions that end when the guard is dropped
//! - Contract-based registration with `Arc<dyn Trait>`
//!
//! Run with: `cargo run --example notifications`

use dependency_pool::{Key, Registry};
use std::sync::Arc;

/// Contract for a logging service.
trait Logger: Send + Sync {
    fn log(&self, message: &str);
}

struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn log(&self, message: &str) {
        println!("   [CONSOLE] {}", message);
    }
}

type SharedLogger = Arc<dyn Logger>;

/// A component that wants to know when a logger becomes available.
struct Dashboard {
    name: &'static str,
}

impl Dashboard {
    fn on_logger(&self, logger: Option<Arc<SharedLogger>>) {
        match logger {
            Some(logger) => logger.log(&format!("{} got a logger", self.name)),
            None => println!("   [{}] logger removed", self.name),
        }
    }
}

fn main() {
    println!("=== dependency-pool: Notifications ===\n");

    let registry = Registry::new();

    // -------------------------------------------------------------------------
    // 1. Subscribe
    // -------------------------------------------------------------------------
    println!("1. Subscribing...");

    let dashboard = Arc::new(Dashboard { name: "dashboard" });
    registry.register_object_notify(&dashboard, Dashboard::on_logger);

    let guard = registry.subscribe::<SharedLogger, _>(|logger| {
        println!("   [guard] logger present: {}", logger.is_some());
    });

    println!(
        "   Subscribers: {}",
        registry.subscriber_count(Key::of::<SharedLogger>())
    );

    // -------------------------------------------------------------------------
    // 2. Add, 3. remove
    // -------------------------------------------------------------------------
    println!("\n2. Adding a logger...");
    let logger: SharedLogger = Arc::new(ConsoleLogger);
    registry.add(logger);

    println!("\n3. Removing the logger...");
    registry.remove::<SharedLogger>();

    // -------------------------------------------------------------------------
    // 4. Drop subscribers
    // -------------------------------------------------------------------------
    println!("\n4. Dropping the dashboard and the guard...");
    drop(dashboard);
    drop(guard);

    registry.add::<SharedLogger>(Arc::new(ConsoleLogger));
    println!("   Added again; nobody was notified.");

    println!("\n=== Example Complete ===");
}
