//! Basic cachepool usage over a small in-memory backend.
//!
//! Run with: cargo run --example basic

use std::collections::HashMap;

use async_trait::async_trait;
use cachepool::{
    CacheItemPool, Capabilities, Storage, StorageOptions, StorageResult,
};
use parking_lot::Mutex;
use serde_json::{json, Value};

/// Minimal in-memory backend. TTLs are accepted and ignored, which is all a
/// walkthrough needs; a real backend would expire entries.
struct MemoryStorage {
    data: Mutex<HashMap<String, Value>>,
    ttl: Mutex<u64>,
}

impl MemoryStorage {
    fn new() -> Self {
        Self {
            data: Mutex::new(HashMap::new()),
            ttl: Mutex::new(0),
        }
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    fn capabilities(&self) -> Capabilities {
        Capabilities {
            static_ttl: true,
            min_ttl: 1,
            flushable: true,
        }
    }

    fn options(&self) -> StorageOptions {
        StorageOptions {
            ttl: *self.ttl.lock(),
            namespace: String::new(),
        }
    }

    fn set_ttl(&self, ttl_secs: u64) {
        *self.ttl.lock() = ttl_secs;
    }

    async fn get_items(&self, keys: &[String]) -> StorageResult<HashMap<String, Value>> {
        let data = self.data.lock();
        Ok(keys
            .iter()
            .filter_map(|key| data.get(key).map(|value| (key.clone(), value.clone())))
            .collect())
    }

    async fn has_item(&self, key: &str) -> StorageResult<bool> {
        Ok(self.data.lock().contains_key(key))
    }

    async fn set_item(&self, key: &str, value: &Value) -> StorageResult<bool> {
        println!("  [backend] write {key} with ttl={}s", *self.ttl.lock());
        self.data.lock().insert(key.to_string(), value.clone());
        Ok(true)
    }

    async fn remove_items(&self, keys: &[String]) -> StorageResult<()> {
        let mut data = self.data.lock();
        for key in keys {
            data.remove(key);
        }
        Ok(())
    }

    async fn flush(&self) -> StorageResult<bool> {
        self.data.lock().clear();
        Ok(true)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("cachepool=debug")
        .init();

    let mut pool = CacheItemPool::new(MemoryStorage::new())?;

    // Miss, populate, write through with a per-item expiration
    let mut item = pool.get_item("user.1").await?;
    println!("user.1 hit before save: {}", item.is_hit());
    item.set(json!({"name": "Ada"})).expires_after_secs(3600)?;
    println!("saved: {}", pool.save(&item).await?);

    let read = pool.get_item("user.1").await?;
    println!("user.1 after save: hit={} value={:?}", read.is_hit(), read.get());

    // Deferred writes: staged locally, committed in one pass
    for id in ["user.2", "user.3"] {
        let mut item = pool.get_item(id).await?;
        item.set(json!({"id": id}));
        pool.save_deferred(item)?;
    }
    println!("user.2 visible before commit: {}", pool.has_item("user.2").await?);
    println!("commit drained the buffer: {}", pool.commit().await?);

    // Clearing drops everything
    pool.clear().await?;
    println!("user.1 after clear: {}", pool.has_item("user.1").await?);

    pool.close().await?;
    Ok(())
}
