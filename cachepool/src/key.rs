//! Cache key validation

use crate::error::{CacheError, Result};

/// Characters that may never appear in a cache key.
pub const RESERVED_KEY_CHARS: [char; 8] = ['{', '}', '(', ')', '/', '\\', '@', ':'];

/// Check a single key: non-empty and free of reserved characters.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() || key.contains(RESERVED_KEY_CHARS) {
        return Err(CacheError::InvalidArgument(format!(
            "key must be a non-empty string without '{{}}()/\\@:', got {key:?}"
        )));
    }
    Ok(())
}

/// Check a batch of keys, rejecting the whole call on the first bad one.
pub fn validate_keys<K: AsRef<str>>(keys: &[K]) -> Result<()> {
    for key in keys {
        validate_key(key.as_ref())?;
    }
    Ok(())
}
