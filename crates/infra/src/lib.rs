//! Infrastructure layer: persistence backends, configuration, and the
//! inventory store that ties them to the domain.

pub mod config;
pub mod storage;
pub mod store;

pub use config::{Backend, ConfigError, StoreConfig};
pub use storage::{FileSlotStorage, InMemorySlotStorage, SlotStorage, StorageError};
pub use store::{ConfiguredStore, InventoryStore, StoreError, open_configured};
