//! JSON-file backed store, the on-disk counterpart of browser local storage.
//! The whole map is rewritten on every change; slots are few and small. A
//! change only becomes visible in memory once it has reached the disk.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use super::{KeyValueStore, StorageError};

type Slots = BTreeMap<String, String>;

pub struct FileStore {
    path: PathBuf,
    slots: Mutex<Slots>,
}

impl FileStore {
    /// Opens the store at `path`, creating nothing until the first write. The
    /// parent directory must already exist so a bad location fails here and
    /// not halfway through an encryption.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let slots = if path.exists() {
            let raw = fs::read_to_string(&path)
                .map_err(|e| StorageError::Read(format!("{}: {e}", path.display())))?;
            if raw.trim().is_empty() {
                Slots::new()
            } else {
                serde_json::from_str(&raw)
                    .map_err(|e| StorageError::Corrupt(format!("{}: {e}", path.display())))?
            }
        } else {
            let parent = match path.parent() {
                Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
                _ => PathBuf::from("."),
            };
            if !parent.is_dir() {
                return Err(StorageError::Unavailable(format!(
                    "directory {} does not exist",
                    parent.display()
                )));
            }
            Slots::new()
        };

        Ok(Self {
            path,
            slots: Mutex::new(slots),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<MutexGuard<'_, Slots>, StorageError> {
        self.slots
            .lock()
            .map_err(|_| StorageError::Unavailable("file store lock poisoned".to_string()))
    }

    fn persist(&self, slots: &Slots) -> Result<(), StorageError> {
        let encoded = serde_json::to_vec_pretty(slots)
            .map_err(|e| StorageError::Write(format!("{e}")))?;
        let staging = self.path.with_extension("tmp");
        fs::write(&staging, encoded)
            .map_err(|e| StorageError::Write(format!("{}: {e}", staging.display())))?;
        fs::rename(&staging, &self.path)
            .map_err(|e| StorageError::Write(format!("{}: {e}", self.path.display())))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, slot: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock()?.get(slot).cloned())
    }

    fn set(&self, slot: &str, value: &str) -> Result<(), StorageError> {
        let mut slots = self.lock()?;
        let mut next = slots.clone();
        next.insert(slot.to_string(), value.to_string());
        self.persist(&next)?;
        *slots = next;
        Ok(())
    }

    fn remove(&self, slot: &str) -> Result<(), StorageError> {
        let mut slots = self.lock()?;
        if !slots.contains_key(slot) {
            return Ok(());
        }
        let mut next = slots.clone();
        next.remove(slot);
        self.persist(&next)?;
        *slots = next;
        Ok(())
    }

    // This and compare_and_swap are atomic within one process only; two
    // processes sharing the file still race.
    fn set_if_absent(&self, slot: &str, value: &str) -> Result<Option<String>, StorageError> {
        let mut slots = self.lock()?;
        if let Some(existing) = slots.get(slot) {
            return Ok(Some(existing.clone()));
        }
        let mut next = slots.clone();
        next.insert(slot.to_string(), value.to_string());
        self.persist(&next)?;
        *slots = next;
        Ok(None)
    }

    fn compare_and_swap(&self, slot: &str, expected: &str, value: &str) -> Result<String, StorageError> {
        let mut slots = self.lock()?;
        if let Some(current) = slots.get(slot) {
            if current != expected {
                return Ok(current.clone());
            }
        }
        let mut next = slots.clone();
        next.insert(slot.to_string(), value.to_string());
        self.persist(&next)?;
        *slots = next;
        Ok(value.to_string())
    }
}
