//! Deferred-write cache item pool over a pluggable storage backend

use std::collections::HashMap;

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{soft, CacheError, Result, StorageError};
use crate::item::CacheItem;
use crate::key::{validate_key, validate_keys};
use crate::storage::Storage;

/// Item pool adapting a [`Storage`] backend to a get/save/defer/commit
/// contract.
///
/// Reads consult the deferred buffer before the backend and always yield one
/// item per requested key. Writes either go straight through (`save`, with a
/// scoped TTL override when the item carries an expiration) or are staged in
/// the buffer (`save_deferred`) and materialized by `commit`.
///
/// Backend validation errors propagate as
/// [`CacheError::InvalidArgument`]; any other backend fault degrades to a
/// `false` result or a miss item. Call [`close`](CacheItemPool::close) when
/// done with a pool so outstanding deferred items get one final commit.
pub struct CacheItemPool<S: Storage> {
    storage: S,
    deferred: HashMap<String, CacheItem>,
}

/// Restores the backend TTL when dropped, covering every exit path of the
/// save call it guards, unwinds included.
struct TtlRestore<'a, S: Storage> {
    storage: &'a S,
    original: u64,
}

impl<S: Storage> Drop for TtlRestore<'_, S> {
    fn drop(&mut self) {
        self.storage.set_ttl(self.original);
    }
}

impl<S: Storage> CacheItemPool<S> {
    /// Wrap a backend, negotiating required capabilities eagerly.
    ///
    /// The backend must be flushable and must honor a static per-write TTL
    /// with a minimum TTL above zero; anything less fails with
    /// [`CacheError::Configuration`] here rather than on first use.
    pub fn new(storage: S) -> Result<Self> {
        let capabilities = storage.capabilities();
        if !capabilities.flushable {
            return Err(CacheError::Configuration(
                "backend cannot flush its contents".into(),
            ));
        }
        if !capabilities.static_ttl || capabilities.min_ttl == 0 {
            return Err(CacheError::Configuration(
                "backend does not honor a static per-write TTL".into(),
            ));
        }

        let options = storage.options();
        info!(
            ttl = options.ttl,
            namespace = %options.namespace,
            "cache item pool ready"
        );

        Ok(Self {
            storage,
            deferred: HashMap::new(),
        })
    }

    /// Fetch one item; a key with no live entry yields a miss item.
    pub async fn get_item(&self, key: &str) -> Result<CacheItem> {
        let mut items = self.get_items(&[key]).await?;
        Ok(items
            .pop()
            .unwrap_or_else(|| CacheItem::new(key, None, false)))
    }

    /// Fetch a batch of items, one per requested key in request order
    /// (duplicates collapsed to their first occurrence).
    ///
    /// Deferred items are returned as-is; the rest are looked up from the
    /// backend in a single call. Keys the backend does not return come back
    /// as misses, as does the whole remainder when the backend fails at
    /// runtime.
    pub async fn get_items(&self, keys: &[&str]) -> Result<Vec<CacheItem>> {
        validate_keys(keys)?;
        debug!(count = keys.len(), "get items");

        let mut ordered: Vec<&str> = Vec::with_capacity(keys.len());
        for key in keys {
            if !ordered.contains(key) {
                ordered.push(*key);
            }
        }

        let remaining: Vec<String> = ordered
            .iter()
            .filter(|key| !self.deferred.contains_key(**key))
            .map(|key| (*key).to_string())
            .collect();

        let mut fetched = if remaining.is_empty() {
            HashMap::new()
        } else {
            soft(self.storage.get_items(&remaining).await, HashMap::new())?
        };

        let items = ordered
            .into_iter()
            .map(|key| {
                if let Some(item) = self.deferred.get(key) {
                    item.clone()
                } else if let Some(value) = fetched.remove(key) {
                    CacheItem::new(key, Some(value), true)
                } else {
                    CacheItem::new(key, None, false)
                }
            })
            .collect();

        Ok(items)
    }

    /// Whether a live entry exists for `key`, in the deferred buffer or the
    /// backend.
    pub async fn has_item(&self, key: &str) -> Result<bool> {
        validate_key(key)?;

        if self.deferred.contains_key(key) {
            return Ok(true);
        }
        soft(self.storage.has_item(key).await, false)
    }

    /// Drop the deferred buffer, then clear the backend.
    ///
    /// With namespace-clear support and a non-empty configured namespace
    /// only that namespace is cleared; otherwise the backend is flushed
    /// wholesale. Every backend failure here (validation included) yields
    /// `false`, and the buffer drop is not reverted.
    pub async fn clear(&mut self) -> Result<bool> {
        if !self.deferred.is_empty() {
            debug!(dropped = self.deferred.len(), "dropping deferred items");
        }
        self.deferred.clear();

        let namespace = self.storage.options().namespace;
        let result = if self.storage.supports_clear_by_namespace() && !namespace.is_empty() {
            self.storage.clear_by_namespace(&namespace).await
        } else {
            self.storage.flush().await
        };

        match result {
            Ok(cleared) => Ok(cleared),
            Err(err) => {
                warn!(error = %err, "clear failed after buffer drop");
                Ok(false)
            }
        }
    }

    /// Delete one key. See [`delete_items`](CacheItemPool::delete_items).
    pub async fn delete_item(&mut self, key: &str) -> Result<bool> {
        self.delete_items(&[key]).await
    }

    /// Delete a batch of keys from the deferred buffer and the backend.
    ///
    /// Buffer removal always takes effect; a backend runtime failure then
    /// yields `false`, so deletion is not atomic across the two.
    pub async fn delete_items(&mut self, keys: &[&str]) -> Result<bool> {
        validate_keys(keys)?;
        debug!(count = keys.len(), "delete items");

        for key in keys {
            self.deferred.remove(*key);
        }

        let keys: Vec<String> = keys.iter().map(|key| (*key).to_string()).collect();
        soft(self.storage.remove_items(&keys).await.map(|()| true), false)
    }

    /// Write one item straight through to the backend.
    ///
    /// When the item carries an absolute expiration, the backend's default
    /// TTL is overridden with `max(0, expiration - now)` whole seconds for
    /// the duration of this single write and restored before returning, on
    /// success and failure alike. The override mutates the backend's shared
    /// options, so it is not reentrant across pools sharing one handle.
    ///
    /// Returns `Ok(true)` iff the backend write itself reported success.
    pub async fn save(&self, item: &CacheItem) -> Result<bool> {
        validate_key(item.key())?;

        let _restore = TtlRestore {
            storage: &self.storage,
            original: self.storage.options().ttl,
        };

        if let Some(expiration) = item.expiration() {
            let ttl = (expiration - Utc::now()).num_seconds().max(0) as u64;
            debug!(key = item.key(), ttl, "overriding backend ttl for save");
            self.storage.set_ttl(ttl);
        }

        let value = item.get().cloned().unwrap_or(Value::Null);
        match self.storage.set_item(item.key(), &value).await {
            Ok(saved) => Ok(saved),
            Err(StorageError::Validation(msg)) => Err(CacheError::InvalidArgument(msg)),
            Err(StorageError::Runtime(msg)) => {
                warn!(key = item.key(), error = %msg, "save absorbed a storage fault");
                Ok(false)
            }
        }
    }

    /// Stage an item in the deferred buffer, overwriting any prior staged
    /// value for its key. No backend I/O happens until
    /// [`commit`](CacheItemPool::commit).
    pub fn save_deferred(&mut self, mut item: CacheItem) -> Result<bool> {
        validate_key(item.key())?;

        // staged items are authoritative future values
        item.set_is_hit(true);
        debug!(key = item.key(), "deferring save");
        self.deferred.insert(item.key().to_string(), item);

        Ok(true)
    }

    /// Save every buffered item, retaining the ones that fail.
    ///
    /// Returns `Ok(true)` iff the buffer is empty afterward, which makes the
    /// call idempotent and safely retryable. A propagated validation error
    /// leaves the failing item and the unprocessed remainder buffered.
    pub async fn commit(&mut self) -> Result<bool> {
        let staged: Vec<(String, CacheItem)> = self.deferred.drain().collect();
        debug!(count = staged.len(), "committing deferred items");

        let mut retained = HashMap::new();
        let mut staged = staged.into_iter();
        while let Some((key, item)) = staged.next() {
            match self.save(&item).await {
                Ok(true) => {}
                Ok(false) => {
                    warn!(key = %key, "deferred item failed to save, retained");
                    retained.insert(key, item);
                }
                Err(err) => {
                    retained.insert(key, item);
                    retained.extend(staged);
                    self.deferred = retained;
                    return Err(err);
                }
            }
        }

        self.deferred = retained;
        Ok(self.deferred.is_empty())
    }

    /// Tear the pool down, giving outstanding deferred items one final
    /// commit.
    ///
    /// Items that still fail to save are logged and discarded. Returns
    /// `Ok(true)` iff nothing was left behind.
    pub async fn close(mut self) -> Result<bool> {
        let committed = self.commit().await?;
        if !committed {
            warn!(
                count = self.deferred.len(),
                "discarding deferred items that failed to commit on close"
            );
            self.deferred.clear();
        }
        Ok(committed)
    }
}

impl<S: Storage> Drop for CacheItemPool<S> {
    fn drop(&mut self) {
        if !self.deferred.is_empty() {
            warn!(
                count = self.deferred.len(),
                "cache item pool dropped with uncommitted deferred items; call close()"
            );
        }
    }
}
