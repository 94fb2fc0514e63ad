use std::{
    collections::BTreeMap,
    sync::{Mutex, MutexGuard},
};

use super::KeyValueBackend;
use crate::errors::{BuddyError, Result};

/// Process-local backend, used in tests and for throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<BTreeMap<String, String>>,
    quarantined: Mutex<Vec<(String, String)>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> Result<MutexGuard<'_, BTreeMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| BuddyError::Storage("memory backend lock poisoned".into()))
    }

    /// Values set aside as unreadable, oldest first, as `(key, value)` pairs.
    pub fn quarantined(&self) -> Vec<(String, String)> {
        self.quarantined
            .lock()
            .map(|values| values.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl KeyValueBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        Ok(self.entries()?.remove(key).is_some())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries()?.keys().cloned().collect())
    }

    fn quarantine(&self, key: &str) -> Result<Option<String>> {
        let Some(value) = self.entries()?.remove(key) else {
            return Ok(None);
        };
        let mut quarantined = self
            .quarantined
            .lock()
            .map_err(|_| BuddyError::Storage("memory backend lock poisoned".into()))?;
        quarantined.push((key.to_string(), value));
        Ok(Some(format!("memory quarantine #{}", quarantined.len())))
    }
}
