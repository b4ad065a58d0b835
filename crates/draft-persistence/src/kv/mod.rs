//! Durable key-value storage for drafts.
//!
//! This module handles:
//! - The [`KeyValueStore`] seam the draft store writes through
//! - An in-process [`MemoryStore`]
//! - A directory-backed [`FileStore`] with atomic writes

mod file;
mod memory;

pub use file::{FileStore, MAX_KEY_BYTES, StoredEntry};
pub use memory::MemoryStore;

use crate::error::{PersistenceError, Result};

/// String key to JSON string value. No transactions, no TTL.
///
/// Calls are synchronous from the caller's point of view. A store is shared
/// between every draft that uses it, so implementations must be thread-safe.
pub trait KeyValueStore: Send + Sync {
    /// Read the value under `key`, or `None` if it was never written.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing a missing key is not an error.
    fn delete(&self, key: &str) -> Result<()>;

    /// All keys currently stored, sorted.
    fn keys(&self) -> Result<Vec<String>>;
}

pub(crate) fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(PersistenceError::InvalidKey {
            key: key.to_string(),
            reason: "key is empty",
        });
    }
    Ok(())
}
