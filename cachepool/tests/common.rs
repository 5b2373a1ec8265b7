//! Shared mock backend for pool tests

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use cachepool::{
    Capabilities, Storage, StorageError, StorageErrorHook, StorageOptions, StorageResult,
};
use parking_lot::Mutex;
use serde_json::Value;

/// How an injected failure should present itself.
#[derive(Clone, Copy, Debug, PartialEq)]
#[allow(dead_code)] // variants used across different test modules
pub enum FailKind {
    Validation,
    Runtime,
}

impl FailKind {
    fn to_error(self, what: &str) -> StorageError {
        match self {
            FailKind::Validation => StorageError::Validation(format!("{what} rejected")),
            FailKind::Runtime => StorageError::Runtime(format!("{what} unavailable")),
        }
    }
}

/// Per-operation call counts plus the full history of `set_ttl` values.
#[derive(Clone, Default)]
pub struct CallLog {
    pub get_items: usize,
    pub has_item: usize,
    pub set_item: usize,
    pub remove_items: usize,
    pub flush: usize,
    pub clear_by_namespace: usize,
    pub ttl_sets: Vec<u64>,
}

#[derive(Default)]
struct MockState {
    data: HashMap<String, Value>,
    ttl: u64,
    namespace: String,
    capabilities: Option<Capabilities>,
    namespace_clear: bool,
    fail_reads: Option<FailKind>,
    fail_writes: Option<FailKind>,
    fail_write_keys: HashSet<String>,
    fail_removes: Option<FailKind>,
    fail_flush: Option<FailKind>,
    fail_namespace_clear: Option<FailKind>,
    calls: CallLog,
}

/// Clonable in-memory backend with failure injection and a call log.
///
/// Clones share state, so a test can keep a handle after moving the mock
/// into a pool.
#[derive(Clone, Default)]
pub struct MockStorage {
    state: Arc<Mutex<MockState>>,
    hook: Option<StorageErrorHook>,
}

#[allow(dead_code)] // helpers used across different test modules
impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(self, ttl: u64) -> Self {
        self.state.lock().ttl = ttl;
        self
    }

    pub fn with_namespace(self, namespace: &str) -> Self {
        self.state.lock().namespace = namespace.to_string();
        self
    }

    pub fn with_namespace_clear(self) -> Self {
        self.state.lock().namespace_clear = true;
        self
    }

    pub fn with_capabilities(self, capabilities: Capabilities) -> Self {
        self.state.lock().capabilities = Some(capabilities);
        self
    }

    pub fn with_hook(mut self, hook: StorageErrorHook) -> Self {
        self.hook = Some(hook);
        self
    }

    pub fn seed(&self, key: &str, value: Value) {
        self.state.lock().data.insert(key.to_string(), value);
    }

    pub fn value_of(&self, key: &str) -> Option<Value> {
        self.state.lock().data.get(key).cloned()
    }

    pub fn current_ttl(&self) -> u64 {
        self.state.lock().ttl
    }

    pub fn calls(&self) -> CallLog {
        self.state.lock().calls.clone()
    }

    pub fn fail_reads(&self, kind: Option<FailKind>) {
        self.state.lock().fail_reads = kind;
    }

    pub fn fail_writes(&self, kind: Option<FailKind>) {
        self.state.lock().fail_writes = kind;
    }

    pub fn fail_writes_for(&self, key: &str) {
        self.state.lock().fail_write_keys.insert(key.to_string());
    }

    pub fn clear_write_failures(&self) {
        let mut state = self.state.lock();
        state.fail_writes = None;
        state.fail_write_keys.clear();
    }

    pub fn fail_removes(&self, kind: Option<FailKind>) {
        self.state.lock().fail_removes = kind;
    }

    pub fn fail_flush(&self, kind: Option<FailKind>) {
        self.state.lock().fail_flush = kind;
    }

    pub fn fail_namespace_clear(&self, kind: Option<FailKind>) {
        self.state.lock().fail_namespace_clear = kind;
    }

    fn raise(&self, kind: FailKind, what: &str) -> StorageError {
        let err = kind.to_error(what);
        // the backend notifies the hook, then the error keeps propagating
        if let Some(hook) = &self.hook {
            hook(&err);
        }
        err
    }
}

#[async_trait]
impl Storage for MockStorage {
    fn capabilities(&self) -> Capabilities {
        self.state
            .lock()
            .capabilities
            .clone()
            .unwrap_or(Capabilities {
                static_ttl: true,
                min_ttl: 1,
                flushable: true,
            })
    }

    fn options(&self) -> StorageOptions {
        let state = self.state.lock();
        StorageOptions {
            ttl: state.ttl,
            namespace: state.namespace.clone(),
        }
    }

    fn set_ttl(&self, ttl_secs: u64) {
        let mut state = self.state.lock();
        state.ttl = ttl_secs;
        state.calls.ttl_sets.push(ttl_secs);
    }

    async fn get_items(&self, keys: &[String]) -> StorageResult<HashMap<String, Value>> {
        let fail = {
            let mut state = self.state.lock();
            state.calls.get_items += 1;
            state.fail_reads
        };
        if let Some(kind) = fail {
            return Err(self.raise(kind, "read"));
        }

        let state = self.state.lock();
        Ok(keys
            .iter()
            .filter_map(|key| state.data.get(key).map(|value| (key.clone(), value.clone())))
            .collect())
    }

    async fn has_item(&self, key: &str) -> StorageResult<bool> {
        let fail = {
            let mut state = self.state.lock();
            state.calls.has_item += 1;
            state.fail_reads
        };
        if let Some(kind) = fail {
            return Err(self.raise(kind, "read"));
        }

        Ok(self.state.lock().data.contains_key(key))
    }

    async fn set_item(&self, key: &str, value: &Value) -> StorageResult<bool> {
        let fail = {
            let mut state = self.state.lock();
            state.calls.set_item += 1;
            if state.fail_write_keys.contains(key) {
                Some(FailKind::Runtime)
            } else {
                state.fail_writes
            }
        };
        if let Some(kind) = fail {
            return Err(self.raise(kind, "write"));
        }

        self.state
            .lock()
            .data
            .insert(key.to_string(), value.clone());
        Ok(true)
    }

    async fn remove_items(&self, keys: &[String]) -> StorageResult<()> {
        let fail = {
            let mut state = self.state.lock();
            state.calls.remove_items += 1;
            state.fail_removes
        };
        if let Some(kind) = fail {
            return Err(self.raise(kind, "remove"));
        }

        let mut state = self.state.lock();
        for key in keys {
            state.data.remove(key);
        }
        Ok(())
    }

    async fn flush(&self) -> StorageResult<bool> {
        let fail = {
            let mut state = self.state.lock();
            state.calls.flush += 1;
            state.fail_flush
        };
        if let Some(kind) = fail {
            return Err(self.raise(kind, "flush"));
        }

        self.state.lock().data.clear();
        Ok(true)
    }

    fn supports_clear_by_namespace(&self) -> bool {
        self.state.lock().namespace_clear
    }

    async fn clear_by_namespace(&self, namespace: &str) -> StorageResult<bool> {
        let fail = {
            let mut state = self.state.lock();
            state.calls.clear_by_namespace += 1;
            state.fail_namespace_clear
        };
        if let Some(kind) = fail {
            return Err(self.raise(kind, "namespace clear"));
        }

        // namespacing is a key-prefix convention in this mock
        let prefix = format!("{namespace}.");
        let mut state = self.state.lock();
        state.data.retain(|key, _| !key.starts_with(&prefix));
        Ok(true)
    }
}
