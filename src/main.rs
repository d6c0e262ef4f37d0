//! Storage Cache demo
//!
//! Populates the global cache with a handful of field records, reads one
//! back, and lists every key in dotted-numeric order.

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storage_cache::models::compare_dotted;
use storage_cache::registry::{self, TeardownGuard};
use storage_cache::StorageItem;

fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storage_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let _teardown = TeardownGuard::new();
    let cache = registry::instance().context("Failed to initialize storage cache")?;
    info!("Cache ready with {} shards", cache.shard_count());

    let fields = [
        ("3.1", StorageItem::new(1, "A packager name", "F0F0")),
        ("3.2", StorageItem::new(2, "A packager name", "F0F0")),
        ("3.3", StorageItem::new(3, "A packager name", "F0F0")),
        ("4", StorageItem::new(4, "A packager name", "F0F0F0F0F0F0")),
        ("5", StorageItem::new(5, "A packager name", "F0F1F0F0")),
        ("48.61.3", StorageItem::new(3, "A packager name", "F0F1F0F0")),
    ];
    for (key, item) in fields {
        cache.put(key.to_string(), item);
    }

    let out = cache.get("3.1").context("Field 3.1 missing from cache")?;
    println!("{}:{}    {}", out.fldno, out.descriptor, out.value);

    let mut keys = cache.keys();
    keys.sort_by(|a, b| compare_dotted(a, b));
    for key in &keys {
        println!("[Key] {}", key);
    }

    info!("Cache stats: {}", serde_json::to_string(&cache.stats())?);
    Ok(())
}
