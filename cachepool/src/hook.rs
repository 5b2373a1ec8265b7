//! Bridging backend-internal errors to the tracing sink

use std::sync::Arc;

use tracing::{debug, error};

use crate::error::StorageError;

/// Callback a backend invokes just before surfacing an internal error.
///
/// Registered once, at backend construction. The backend calls the hook and
/// then returns the error unchanged, so the pool's soft-fail translation
/// still sees it.
pub type StorageErrorHook = Arc<dyn Fn(&StorageError) + Send + Sync>;

/// Standard hook: error message at `error` severity, full detail at `debug`.
pub struct LoggingHook;

impl LoggingHook {
    /// Build the hook callback.
    pub fn hook() -> StorageErrorHook {
        Arc::new(|err: &StorageError| {
            error!(target: "cachepool::storage", "{err}");
            debug!(target: "cachepool::storage", detail = ?err, "storage error detail");
        })
    }
}
