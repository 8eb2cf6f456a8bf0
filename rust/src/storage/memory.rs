use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::{KeyValueStore, StorageError};

/// Process-local store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().map(|slots| slots.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, String>>, StorageError> {
        self.slots
            .lock()
            .map_err(|_| StorageError::Unavailable("memory store lock poisoned".to_string()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, slot: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock()?.get(slot).cloned())
    }

    fn set(&self, slot: &str, value: &str) -> Result<(), StorageError> {
        self.lock()?.insert(slot.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, slot: &str) -> Result<(), StorageError> {
        self.lock()?.remove(slot);
        Ok(())
    }

    fn set_if_absent(&self, slot: &str, value: &str) -> Result<Option<String>, StorageError> {
        let mut slots = self.lock()?;
        if let Some(existing) = slots.get(slot) {
            return Ok(Some(existing.clone()));
        }
        slots.insert(slot.to_string(), value.to_string());
        Ok(None)
    }

    fn compare_and_swap(&self, slot: &str, expected: &str, value: &str) -> Result<String, StorageError> {
        let mut slots = self.lock()?;
        match slots.get(slot) {
            Some(current) if current != expected => Ok(current.clone()),
            _ => {
                slots.insert(slot.to_string(), value.to_string());
                Ok(value.to_string())
            }
        }
    }
}
