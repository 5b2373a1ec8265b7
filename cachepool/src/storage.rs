//! Storage backend contract consumed by the pool

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{StorageError, StorageResult};

/// Feature set a backend reports when a pool is constructed over it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capabilities {
    /// Writes honor a fixed TTL taken from the options at write time.
    pub static_ttl: bool,
    /// Smallest TTL the backend can represent, in seconds. Zero means the
    /// TTL setting is not actually honored.
    pub min_ttl: u64,
    /// The backend can drop its entire contents on demand.
    pub flushable: bool,
}

/// Mutable runtime options of a backend handle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageOptions {
    /// Default TTL in seconds applied to writes; zero means "no expiry".
    pub ttl: u64,
    /// Key namespace this handle operates in; empty means unnamespaced.
    pub namespace: String,
}

/// Key/value backend adapted by a [`CacheItemPool`](crate::pool::CacheItemPool).
///
/// [`options`](Storage::options) and [`set_ttl`](Storage::set_ttl) read and
/// mutate one shared options record. The pool temporarily overrides the TTL
/// around single-item saves and restores it before returning, so the swap is
/// not reentrant: use one pool per backend handle, or serialize saves when a
/// handle is shared.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Feature set of this backend.
    fn capabilities(&self) -> Capabilities;

    /// Current runtime options.
    fn options(&self) -> StorageOptions;

    /// Paired setter for the TTL field of [`options`](Storage::options).
    fn set_ttl(&self, ttl_secs: u64);

    /// Batch lookup. Keys with no stored value are simply omitted from the
    /// result.
    async fn get_items(&self, keys: &[String]) -> StorageResult<HashMap<String, Value>>;

    /// Whether a live entry exists under `key`.
    async fn has_item(&self, key: &str) -> StorageResult<bool>;

    /// Write one entry under the options' current TTL. `Ok(false)` means the
    /// backend declined the write without failing.
    async fn set_item(&self, key: &str, value: &Value) -> StorageResult<bool>;

    /// Remove the given keys. Keys that were already absent are not an
    /// error.
    async fn remove_items(&self, keys: &[String]) -> StorageResult<()>;

    /// Drop everything this handle can see.
    async fn flush(&self) -> StorageResult<bool>;

    /// Whether [`clear_by_namespace`](Storage::clear_by_namespace) is
    /// available.
    fn supports_clear_by_namespace(&self) -> bool {
        false
    }

    /// Remove every entry under `namespace` only.
    async fn clear_by_namespace(&self, namespace: &str) -> StorageResult<bool> {
        let _ = namespace;
        Err(StorageError::Runtime(
            "clear by namespace is not supported by this backend".into(),
        ))
    }
}
