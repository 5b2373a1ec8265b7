//! Error types for cachepool operations

use thiserror::Error;

/// Result type alias for pool operations
pub type Result<T> = std::result::Result<T, CacheError>;

/// Result type alias for backend operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Errors surfaced to pool callers.
///
/// These are the only conditions a pool raises. Every other backend fault is
/// absorbed into a `false` result or a miss item (see [`soft`]).
#[derive(Debug, Error)]
pub enum CacheError {
    /// The backend lacks a capability the pool requires. Raised only when
    /// constructing a pool.
    #[error("storage backend not usable as an item pool: {0}")]
    Configuration(String),

    /// Malformed key or expiration argument. Always propagated, never
    /// absorbed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Closed error set produced by storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend rejected the request itself (malformed key, bad options).
    #[error("storage validation failure: {0}")]
    Validation(String),

    /// Any operational failure, such as connection loss or a timeout.
    #[error("storage runtime failure: {0}")]
    Runtime(String),
}

/// Collapse a backend result into the pool's error model.
///
/// Validation failures are caller bugs and propagate as
/// [`CacheError::InvalidArgument`]; operational faults degrade to the
/// supplied fallback ("nothing here") instead of reaching the caller.
pub(crate) fn soft<T>(result: StorageResult<T>, fallback: T) -> Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(StorageError::Validation(msg)) => Err(CacheError::InvalidArgument(msg)),
        Err(StorageError::Runtime(msg)) => {
            tracing::debug!(error = %msg, "storage fault absorbed");
            Ok(fallback)
        }
    }
}
