//! Slot-based persistence backends.
//!
//! A slot holds one serialized blob. The inventory store reads and rewrites
//! whole blobs; backends never see partial updates.

pub mod file;
pub mod in_memory;

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

pub use file::FileSlotStorage;
pub use in_memory::InMemorySlotStorage;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid slot name: {0:?}")]
    InvalidSlot(String),

    #[error("i/o error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("storage lock poisoned")]
    Poisoned,
}

/// Key/value persistence for whole serialized blobs.
pub trait SlotStorage: Send + Sync {
    /// Read a slot; `None` if it has never been written.
    fn load(&self, slot: &str) -> Result<Option<String>, StorageError>;

    /// Replace a slot's contents.
    fn save(&self, slot: &str, blob: &str) -> Result<(), StorageError>;
}

impl<S> SlotStorage for Arc<S>
where
    S: SlotStorage + ?Sized,
{
    fn load(&self, slot: &str) -> Result<Option<String>, StorageError> {
        (**self).load(slot)
    }

    fn save(&self, slot: &str, blob: &str) -> Result<(), StorageError> {
        (**self).save(slot, blob)
    }
}

/// Slot names become file names, so keep them to a safe alphabet.
pub(crate) fn validate_slot(slot: &str) -> Result<(), StorageError> {
    let ok = !slot.is_empty()
        && slot
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
        && !slot.starts_with('.');
    if ok {
        Ok(())
    } else {
        Err(StorageError::InvalidSlot(slot.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_names_are_restricted() {
        assert!(validate_slot("inventory").is_ok());
        assert!(validate_slot("inventory-v2.backup").is_ok());
        assert!(validate_slot("").is_err());
        assert!(validate_slot("../etc").is_err());
        assert!(validate_slot(".hidden").is_err());
        assert!(validate_slot("a/b").is_err());
    }
}
