use std::collections::HashMap;
use std::sync::RwLock;

use super::{SlotStorage, StorageError, validate_slot};

/// In-memory slot storage for tests/dev.
#[derive(Debug, Default)]
pub struct InMemorySlotStorage {
    inner: RwLock<HashMap<String, String>>,
}

impl InMemorySlotStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SlotStorage for InMemorySlotStorage {
    fn load(&self, slot: &str) -> Result<Option<String>, StorageError> {
        validate_slot(slot)?;
        let map = self.inner.read().map_err(|_| StorageError::Poisoned)?;
        Ok(map.get(slot).cloned())
    }

    fn save(&self, slot: &str, blob: &str) -> Result<(), StorageError> {
        validate_slot(slot)?;
        let mut map = self.inner.write().map_err(|_| StorageError::Poisoned)?;
        map.insert(slot.to_string(), blob.to_string());
        Ok(())
    }
}
