//! Integration Tests for the Cache
//!
//! Exercises the public API end to end, including concurrent callers and
//! the background curator running on the real clock.

use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

use storage_cache::models::compare_dotted;
use storage_cache::{
    Cache, CacheConfig, CacheError, Clock, ManualClock, StorageItem, SystemClock, WriteMode,
};

// == Helper Functions ==

fn item(fldno: i32, value: &str) -> StorageItem {
    StorageItem::new(fldno, "A packager name", value)
}

fn fast_curator_config() -> CacheConfig {
    CacheConfig::default()
        .with_shard_count(32)
        .with_curator_interval(Duration::from_millis(50))
}

// == Scenario Tests ==

#[test]
fn test_field_keys_scenario() {
    let cache: Cache<String, StorageItem> = Cache::new(CacheConfig::default()).unwrap();

    let fields = [
        ("3.1", item(1, "F0F0")),
        ("3.2", item(2, "F0F0")),
        ("3.3", item(3, "F0F0")),
        ("4", item(4, "F0F0F0F0F0F0")),
        ("5", item(5, "F0F1F0F0")),
        ("48.61.3", item(3, "F0F1F0F0")),
    ];
    for (key, value) in fields.clone() {
        assert_eq!(cache.set(key.to_string(), value, None, WriteMode::WriteAlways), 1);
    }

    let keys: HashSet<String> = cache.keys().into_iter().collect();
    let expected: HashSet<String> = fields.iter().map(|(k, _)| k.to_string()).collect();
    assert_eq!(keys, expected);

    assert_eq!(cache.get("3.1").as_deref(), Some(&item(1, "F0F0")));

    assert_eq!(cache.del("4"), 1);
    assert!(cache.get("4").is_none());
    assert_eq!(cache.size(), 5);

    let mut sorted = cache.keys();
    sorted.sort_by(|a, b| compare_dotted(a, b));
    assert_eq!(sorted, vec!["3.1", "3.2", "3.3", "5", "48.61.3"]);
}

#[test]
fn test_round_trip_ten_thousand_keys() {
    let cache: Cache<u64, String> = Cache::new(CacheConfig::default()).unwrap();

    for i in 0..10_000u64 {
        cache.put(i, format!("value-{}", i));
    }
    assert_eq!(cache.size(), 10_000);

    let mut used_shards = HashSet::new();
    for i in 0..10_000u64 {
        assert_eq!(cache.get_cloned(&i), Some(format!("value-{}", i)));
        used_shards.insert(cache.route(&i));
    }
    assert_eq!(used_shards.len(), cache.shard_count(), "Keys should reach every shard");
}

#[test]
fn test_past_expiration_on_real_clock() {
    let cache: Cache<String, String> = Cache::new(CacheConfig::default()).unwrap();
    let now = SystemClock.now();

    cache.set("k".to_string(), "v".to_string(), Some(now - 1), WriteMode::WriteAlways);
    assert!(cache.get("k").is_none());
    assert_eq!(cache.size(), 0);

    cache.set("k".to_string(), "v".to_string(), None, WriteMode::WriteAlways);
    thread::sleep(Duration::from_millis(1100));
    assert_eq!(cache.get_cloned("k"), Some("v".to_string()));
}

#[test]
fn test_zero_shards_fail_fast() {
    let err = Cache::<String, String>::new(CacheConfig::default().with_shard_count(0)).unwrap_err();
    assert_eq!(err, CacheError::MisconfiguredShardCount);
}

// == Curator Tests ==

#[test]
fn test_curator_converges_without_reads() {
    let cache: Cache<String, u32> = Cache::new(fast_curator_config()).unwrap();
    let past = SystemClock.now() - 1;

    for i in 0..500 {
        cache.set(format!("stale-{}", i), i, Some(past), WriteMode::WriteAlways);
    }
    assert_eq!(cache.size(), 500);

    let deadline = Instant::now() + Duration::from_secs(5);
    while cache.size() > 0 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(25));
    }

    assert_eq!(cache.size(), 0);
    let stats = cache.stats();
    assert_eq!(stats.curated_expirations, 500);
    assert_eq!(stats.hits + stats.misses, 0);
}

#[test]
fn test_curator_keeps_live_entries() {
    let clock = Arc::new(ManualClock::new(10_000));
    let cache: Cache<String, u32> = Cache::with_clock(fast_curator_config(), clock.clone()).unwrap();

    cache.set("short".to_string(), 1, Some(10_005), WriteMode::WriteAlways);
    cache.set("long".to_string(), 2, Some(20_000), WriteMode::WriteAlways);
    cache.put("forever".to_string(), 3);

    clock.advance(Duration::from_secs(10));
    thread::sleep(Duration::from_millis(300));

    let mut keys = cache.keys();
    keys.sort();
    assert_eq!(keys, vec!["forever".to_string(), "long".to_string()]);
}

#[test]
fn test_drop_joins_curator_promptly() {
    let cache: Cache<String, String> = Cache::new(CacheConfig::default()).unwrap();
    assert!(cache.curator_running());

    // Default interval is 30s; drop must interrupt the sleep
    let started = Instant::now();
    drop(cache);
    assert!(started.elapsed() < Duration::from_secs(5));
}

// == Concurrency Tests ==

#[test]
fn test_concurrent_disjoint_writers() {
    let cache: Arc<Cache<String, usize>> = Arc::new(Cache::new(CacheConfig::default()).unwrap());
    let threads = 8;
    let per_thread = 2_000;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let cache = Arc::clone(&cache);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for i in 0..per_thread {
                    let key = format!("key-{}-{}", t, i);
                    assert_eq!(cache.put(key.clone(), i), 1);
                    assert_eq!(cache.get_cloned(&key), Some(i));
                }
                for i in (0..per_thread).step_by(2) {
                    assert_eq!(cache.del(&format!("key-{}-{}", t, i)), 1);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(cache.size(), threads * per_thread / 2);
    assert_eq!(cache.keys().len(), threads * per_thread / 2);
}

#[test]
fn test_concurrent_write_only_if_not_set_has_one_winner() {
    let cache: Arc<Cache<String, usize>> = Arc::new(Cache::new(CacheConfig::default()).unwrap());
    let threads = 16;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let cache = Arc::clone(&cache);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                cache.set("contended".to_string(), t, None, WriteMode::WriteOnlyIfNotSet)
            })
        })
        .collect();

    let written: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(written, 1);
    assert!(cache.get("contended").is_some());
}

#[test]
fn test_concurrent_updates_are_serialized() {
    let cache: Arc<Cache<String, u64>> = Arc::new(Cache::new(CacheConfig::default()).unwrap());
    cache.put("counter".to_string(), 0);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for _ in 0..1_000 {
                    cache.update("counter", |n| *n += 1).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(cache.get_cloned("counter"), Some(8_000));
}
