//! Local key-value persistence and the per-identity secure storage built on it.
//!
//! `KeyValueStore` is the seam: secure storage never touches a concrete backend,
//! so tests run against `MemoryStore` while the CLI uses `FileStore`.

use thiserror::Error;

pub mod file;
pub mod memory;
pub mod secure;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use secure::{DecryptError, SecureStorage};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store read failed: {0}")]
    Read(String),
    #[error("store write failed: {0}")]
    Write(String),
    #[error("store contents corrupt: {0}")]
    Corrupt(String),
}

/// A string-to-string mapping of named slots.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, slot: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, slot: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&self, slot: &str) -> Result<(), StorageError>;

    /// Stores `value` only when `slot` is empty. Returns the occupying value
    /// otherwise. Backends that can do this atomically should override it.
    fn set_if_absent(&self, slot: &str, value: &str) -> Result<Option<String>, StorageError> {
        if let Some(existing) = self.get(slot)? {
            return Ok(Some(existing));
        }
        self.set(slot, value)?;
        Ok(None)
    }

    /// Stores `value` when `slot` is empty or still holds `expected`, and
    /// returns whatever the slot holds afterwards. A result other than `value`
    /// means another writer got there first.
    fn compare_and_swap(&self, slot: &str, expected: &str, value: &str) -> Result<String, StorageError> {
        match self.get(slot)? {
            Some(current) if current != expected => Ok(current),
            _ => {
                self.set(slot, value)?;
                Ok(value.to_string())
            }
        }
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<T> {
    fn get(&self, slot: &str) -> Result<Option<String>, StorageError> {
        (**self).get(slot)
    }

    fn set(&self, slot: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(slot, value)
    }

    fn remove(&self, slot: &str) -> Result<(), StorageError> {
        (**self).remove(slot)
    }

    fn set_if_absent(&self, slot: &str, value: &str) -> Result<Option<String>, StorageError> {
        (**self).set_if_absent(slot, value)
    }

    fn compare_and_swap(&self, slot: &str, expected: &str, value: &str) -> Result<String, StorageError> {
        (**self).compare_and_swap(slot, expected, value)
    }
}
