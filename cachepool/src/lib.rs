//! # cachepool
//!
//! Capability-checked cache item pool over pluggable key/value storage
//! backends.
//!
//! ## Features
//!
//! - **Item model**: sanitized keys, opaque JSON payloads, hit flags, and
//!   optional absolute expirations
//! - **Deferred writes**: stage items in a buffer, commit them in one pass,
//!   keep the failures for retry
//! - **Soft failure policy**: backend faults degrade to misses and `false`
//!   results instead of crashing callers; validation errors always surface
//! - **Scoped TTL override**: per-item expirations are forwarded by swapping
//!   the backend's default TTL around a single write, restore guaranteed
//!
//! ## Quick Start
//!
//! ```ignore
//! use cachepool::CacheItemPool;
//! use serde_json::json;
//!
//! let mut pool = CacheItemPool::new(backend)?;
//!
//! let mut item = pool.get_item("user.1").await?;
//! if !item.is_hit() {
//!     item.set(json!({"name": "Ada"})).expires_after_secs(3600)?;
//!     pool.save(&item).await?;
//! }
//!
//! pool.close().await?;
//! ```
//!
//! Backends implement the [`Storage`] trait and report their feature set
//! through [`Capabilities`]; pools refuse construction over backends that
//! cannot flush or do not honor a static per-write TTL.

pub mod error;
pub mod hook;
pub mod item;
pub mod key;
pub mod pool;
pub mod storage;

pub use error::{CacheError, Result, StorageError, StorageResult};
pub use hook::{LoggingHook, StorageErrorHook};
pub use item::CacheItem;
pub use key::{validate_key, validate_keys, RESERVED_KEY_CHARS};
pub use pool::CacheItemPool;
pub use storage::{Capabilities, Storage, StorageOptions};
