//! Singleton replacement example for dependency-pool.
//!
//! Demonstrates:
//! - The process-wide registry behind `instance()` and `dep!()`
//! - Swapping it out with `set_instance()`, with and without disposing the old one
//! - Handles obtained earlier remain valid after replacement
//!
//! Run with: `cargo run --example singleton_replacement`

use dependency_pool::{dep, di_get, instance, set_instance, Registry};
use std::sync::Arc;

#[derive(Debug)]
struct AppSettings {
    api_endpoint: String,
    version: u32,
}

fn main() {
    println!("=== dependency-pool: Singleton Replacement ===\n");

    // -------------------------------------------------------------------------
    // 1. Register into the process-wide registry
    // -------------------------------------------------------------------------
    println!("1. Registering initial settings...");

    dep!().add(AppSettings {
        api_endpoint: "https://api.v1.example.com".to_string(),
        version: 1,
    });

    let held_reference: Arc<AppSettings> = di_get!(AppSettings).unwrap();
    println!("   Initial: v{} -> {}", held_reference.version, held_reference.api_endpoint);

    // -------------------------------------------------------------------------
    // 2. Replace the registry, keeping the old one
    // -------------------------------------------------------------------------
    println!("\n2. Swapping in a fresh registry (old one kept)...");

    let previous = set_instance(Registry::new(), false);
    println!(
        "   Old registry still has AppSettings? {}",
        previous.contains::<AppSettings>()
    );
    println!(
        "   New registry has AppSettings? {}",
        instance().contains::<AppSettings>()
    );

    // -------------------------------------------------------------------------
    // 3. Populate the new registry
    // -------------------------------------------------------------------------
    println!("\n3. Registering v2 settings in the new registry...");

    dep!().add(AppSettings {
        api_endpoint: "https://api.v2.example.com".to_string(),
        version: 2,
    });
    let current: Arc<AppSettings> = di_get!(AppSettings).unwrap();
    println!("   Current: v{} -> {}", current.version, current.api_endpoint);

    // -------------------------------------------------------------------------
    // 4. Replace again, disposing the old registry
    // -------------------------------------------------------------------------
    println!("\n4. Swapping in a fresh registry (old one disposed)...");

    let disposed = set_instance(Registry::new(), true);
    println!("   Disposed registry is empty? {}", disposed.is_empty());
    println!(
        "   Handle obtained earlier still usable: v{}",
        current.version
    );
    println!(
        "   Handle from the first registry still usable: v{}",
        held_reference.version
    );

    // -------------------------------------------------------------------------
    // Summary
    // -------------------------------------------------------------------------
    println!("\n=== Example Complete ===");
    println!("Key takeaways:");
    println!("  - set_instance() swaps the process-wide registry atomically");
    println!("  - dispose_old = true drops everything the old registry still holds");
    println!("  - Arc<T> handles given out earlier stay valid either way");
}
