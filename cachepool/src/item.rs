//! Cache item exchanged between pool callers and the backend

use chrono::{DateTime, TimeDelta, Utc};
use serde_json::Value;

use crate::error::{CacheError, Result};

/// A single key/value entry with a hit flag and an optional absolute
/// expiration.
///
/// Items are produced by [`CacheItemPool`](crate::pool::CacheItemPool);
/// there is no public constructor. A typical write mutates an item obtained
/// from `get_item` and hands it back to `save` or `save_deferred`:
///
/// ```ignore
/// let mut item = pool.get_item("user.1").await?;
/// item.set(json!({"name": "Ada"})).expires_after_secs(3600)?;
/// pool.save(&item).await?;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CacheItem {
    key: String,
    value: Option<Value>,
    is_hit: bool,
    expiration: Option<DateTime<Utc>>,
}

impl CacheItem {
    /// A miss never carries a payload, whatever the caller supplied.
    pub(crate) fn new(key: impl Into<String>, value: Option<Value>, is_hit: bool) -> Self {
        Self {
            key: key.into(),
            value: if is_hit { value } else { None },
            is_hit,
            expiration: None,
        }
    }

    /// Key this item lives under.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Stored payload, or `None` when this item is not a hit.
    pub fn get(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Replace the payload in place, returning the receiver for chaining.
    pub fn set(&mut self, value: Value) -> &mut Self {
        self.value = Some(value);
        self
    }

    /// Whether this item was found in storage or is staged as a deferred
    /// write.
    pub fn is_hit(&self) -> bool {
        self.is_hit
    }

    /// Reserved for the pool's deferred-save path, which stages items as
    /// authoritative future hits.
    pub(crate) fn set_is_hit(&mut self, is_hit: bool) -> &mut Self {
        self.is_hit = is_hit;
        self
    }

    /// Set an absolute expiration instant; `None` reverts to the backend's
    /// default TTL.
    pub fn expires_at(&mut self, expiration: Option<DateTime<Utc>>) -> &mut Self {
        self.expiration = expiration;
        self
    }

    /// Expire this item `ttl` from now. Negative durations are invalid.
    pub fn expires_after(&mut self, ttl: TimeDelta) -> Result<&mut Self> {
        if ttl < TimeDelta::zero() {
            return Err(CacheError::InvalidArgument(format!(
                "expiry duration must not be negative, got {ttl}"
            )));
        }
        let expiration = Utc::now().checked_add_signed(ttl).ok_or_else(|| {
            CacheError::InvalidArgument(format!("expiry duration out of range: {ttl}"))
        })?;
        self.expiration = Some(expiration);
        Ok(self)
    }

    /// Expire this item a whole number of seconds from now.
    pub fn expires_after_secs(&mut self, secs: i64) -> Result<&mut Self> {
        let ttl = TimeDelta::try_seconds(secs).ok_or_else(|| {
            CacheError::InvalidArgument(format!("expiry seconds out of range: {secs}"))
        })?;
        self.expires_after(ttl)
    }

    /// Absolute expiration previously set on this item.
    ///
    /// Items read back from storage never carry one; the backend's own TTL
    /// policy applies to those transparently. The pool's save path consults
    /// this to compute its TTL override.
    pub fn expiration(&self) -> Option<DateTime<Utc>> {
        self.expiration
    }
}
