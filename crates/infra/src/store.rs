//! Inventory store: the load/get/update contract over a persisted blob.
//!
//! ```text
//! update → load blob → apply to operator record → save blob → notify
//! ```
//!
//! Every call re-reads and rewrites the whole `GlobalInventory`. Updates made
//! through one store value are serialised by an internal mutex; separate
//! processes sharing a slot are not coordinated.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use thiserror::Error;

use stockroom_core::{ItemType, OperatorId};
use stockroom_events::{Event, EventBus, InMemoryEventBus, Subscription};
use stockroom_inventory::{
    GlobalInventory, InventoryChanged, InventoryError, Movement, OperatorInventory, StockLevel,
    StockUpdate, Transaction,
};

use crate::config::{Backend, StoreConfig};
use crate::storage::{FileSlotStorage, InMemorySlotStorage, SlotStorage, StorageError};

#[derive(Debug, Error)]
pub enum StoreError {
    /// The update was rejected by the inventory rules; nothing was written.
    #[error(transparent)]
    Inventory(#[from] InventoryError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The slot holds something that is not a valid inventory blob.
    #[error("corrupt inventory blob in slot {slot:?}: {source}")]
    Corrupt {
        slot: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize inventory: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("inventory store lock poisoned")]
    Poisoned,
}

impl StoreError {
    pub fn is_insufficient_stock(&self) -> bool {
        matches!(self, StoreError::Inventory(InventoryError::InsufficientStock { .. }))
    }
}

/// Persistent per-operator inventory.
#[derive(Debug)]
pub struct InventoryStore<S, B>
where
    S: SlotStorage,
    B: EventBus<InventoryChanged>,
{
    storage: S,
    bus: B,
    slot: String,
    write_lock: Mutex<()>,
}

/// Store type assembled from a [`StoreConfig`].
pub type ConfiguredStore =
    InventoryStore<Arc<dyn SlotStorage>, Arc<InMemoryEventBus<InventoryChanged>>>;

/// Build a store from configuration, with an in-process notification bus.
pub fn open_configured(config: &StoreConfig) -> Result<ConfiguredStore, StoreError> {
    let storage: Arc<dyn SlotStorage> = match config.backend {
        Backend::File => Arc::new(FileSlotStorage::open(&config.data_dir)?),
        Backend::Memory => Arc::new(InMemorySlotStorage::new()),
    };
    tracing::debug!(backend = ?config.backend, data_dir = %config.data_dir.display(), slot = %config.slot, "opening inventory store");
    InventoryStore::open(storage, Arc::new(InMemoryEventBus::new()), config.slot.clone())
}

/// Publish a notification; a failed publish is logged, never propagated.
fn publish_event<E, B>(bus: &B, event: E)
where
    E: Event,
    B: EventBus<E>,
{
    let (event_type, version, occurred_at) = (event.event_type(), event.version(), event.occurred_at());
    match bus.publish(event) {
        Ok(()) => tracing::debug!(event_type, version, %occurred_at, "notification published"),
        Err(err) => tracing::warn!(
            event_type,
            version,
            error = ?err,
            "failed to publish notification"
        ),
    }
}

impl<S, B> InventoryStore<S, B>
where
    S: SlotStorage,
    B: EventBus<InventoryChanged>,
{
    /// Open the store, writing an empty inventory to `slot` if it has none.
    pub fn open(storage: S, bus: B, slot: impl Into<String>) -> Result<Self, StoreError> {
        let store = Self {
            storage,
            bus,
            slot: slot.into(),
            write_lock: Mutex::new(()),
        };

        if store.storage.load(&store.slot)?.is_none() {
            store.persist(&GlobalInventory::new())?;
            tracing::info!(slot = %store.slot, "initialized empty inventory");
        }

        Ok(store)
    }

    pub fn slot(&self) -> &str {
        &self.slot
    }

    /// Subscribe to "inventory changed" notifications.
    pub fn subscribe(&self) -> Subscription<InventoryChanged> {
        self.bus.subscribe()
    }

    /// Read the full persisted inventory.
    ///
    /// Records whose item type list drifted from their items are repaired in
    /// memory; the repair is persisted with the next update.
    pub fn load(&self) -> Result<GlobalInventory, StoreError> {
        let Some(blob) = self.storage.load(&self.slot)? else {
            return Ok(GlobalInventory::new());
        };
        if blob.trim().is_empty() {
            return Ok(GlobalInventory::new());
        }

        let mut global: GlobalInventory =
            serde_json::from_str(&blob).map_err(|source| StoreError::Corrupt {
                slot: self.slot.clone(),
                source,
            })?;

        let repaired = global.reconcile();
        if !repaired.is_empty() {
            tracing::warn!(slot = %self.slot, operators = ?repaired, "repaired item type lists on load");
        }

        tracing::debug!(slot = %self.slot, operators = global.len(), "inventory loaded");
        Ok(global)
    }

    fn persist(&self, global: &GlobalInventory) -> Result<(), StoreError> {
        let blob = serde_json::to_string(global).map_err(StoreError::Serialize)?;
        self.storage.save(&self.slot, &blob)?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>, StoreError> {
        self.write_lock.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Fetch an operator's record, creating and persisting an empty one on
    /// first access.
    pub fn get_operator_inventory(&self, operator: &OperatorId) -> Result<OperatorInventory, StoreError> {
        let _guard = self.lock()?;
        let mut global = self.load()?;

        let (inventory, created) = global.operator_or_insert(operator);
        let inventory = inventory.clone();

        if created {
            self.persist(&global)?;
            tracing::info!(operator = %operator, "created operator inventory");
        }

        Ok(inventory)
    }

    /// Record a receipt or withdrawal stamped with the current time.
    pub fn update_inventory(
        &self,
        item_type: &ItemType,
        quantity: u64,
        movement: Movement,
        service: Option<&str>,
        operator: &OperatorId,
    ) -> Result<Transaction, StoreError> {
        self.apply_update(StockUpdate {
            operator: operator.clone(),
            item_type: item_type.clone(),
            quantity,
            movement,
            service: service.map(str::to_string),
            occurred_at: Utc::now(),
        })
    }

    /// Record a stock update.
    ///
    /// A rejected update writes nothing and sends no notification. A successful
    /// one persists the whole inventory, then notifies subscribers; a failed
    /// notification is logged and does not undo the write.
    pub fn apply_update(&self, update: StockUpdate) -> Result<Transaction, StoreError> {
        let guard = self.lock()?;
        let mut global = self.load()?;

        let (inventory, _) = global.operator_or_insert(&update.operator);
        let transaction = match inventory.apply(&update) {
            Ok(tx) => tx,
            Err(err) => {
                tracing::warn!(
                    operator = %update.operator,
                    item_type = %update.item_type,
                    quantity = update.quantity,
                    error = %err,
                    "stock update rejected"
                );
                return Err(err.into());
            }
        };

        self.persist(&global)?;
        drop(guard);

        tracing::info!(
            operator = %transaction.operator,
            item_type = %transaction.item_type,
            quantity = transaction.quantity,
            movement = transaction.movement().label(),
            service = transaction.service.as_deref().unwrap_or("-"),
            "stock updated"
        );

        publish_event(
            &self.bus,
            InventoryChanged {
                occurred_at: transaction.date,
            },
        );

        Ok(transaction)
    }

    fn read_operator<T>(
        &self,
        operator: &OperatorId,
        f: impl FnOnce(&OperatorInventory) -> T,
    ) -> Result<T, StoreError> {
        let global = self.load()?;
        Ok(match global.operator(operator) {
            Some(inventory) => f(inventory),
            None => f(&OperatorInventory::new()),
        })
    }

    /// Current stock for an operator, sorted by item type.
    pub fn stock_levels(&self, operator: &OperatorId) -> Result<Vec<StockLevel>, StoreError> {
        self.read_operator(operator, OperatorInventory::stock_levels)
    }

    /// Transaction history for an operator, most recent first.
    pub fn history(&self, operator: &OperatorId) -> Result<Vec<Transaction>, StoreError> {
        self.read_operator(operator, OperatorInventory::history)
    }

    /// Item types an operator has ever used, in first-seen order.
    pub fn item_types(&self, operator: &OperatorId) -> Result<Vec<ItemType>, StoreError> {
        self.read_operator(operator, |inv| inv.item_types().to_vec())
    }

    /// Item types an operator currently holds stock of, sorted by name.
    pub fn withdrawable_types(&self, operator: &OperatorId) -> Result<Vec<ItemType>, StoreError> {
        self.read_operator(operator, OperatorInventory::withdrawable_types)
    }

    pub fn operators(&self) -> Result<Vec<OperatorId>, StoreError> {
        Ok(self.load()?.operators())
    }

    /// Stock summed across all operators.
    pub fn combined_stock(&self) -> Result<Vec<StockLevel>, StoreError> {
        Ok(self.load()?.combined_stock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::thread;

    type TestStore = InventoryStore<Arc<InMemorySlotStorage>, Arc<InMemoryEventBus<InventoryChanged>>>;

    fn setup() -> (TestStore, Arc<InMemorySlotStorage>) {
        let storage = Arc::new(InMemorySlotStorage::new());
        let store = InventoryStore::open(storage.clone(), Arc::new(InMemoryEventBus::new()), "inventory").unwrap();
        (store, storage)
    }

    fn op(name: &str) -> OperatorId {
        OperatorId::parse(name).unwrap()
    }

    fn item(name: &str) -> ItemType {
        ItemType::parse(name).unwrap()
    }

    fn quantities(store: &TestStore, operator: &OperatorId) -> Vec<(String, u64)> {
        store
            .stock_levels(operator)
            .unwrap()
            .into_iter()
            .map(|l| (l.item_type.into_inner(), l.quantity))
            .collect()
    }

    #[test]
    fn open_initializes_empty_blob_once() {
        let (store, storage) = setup();
        assert_eq!(storage.load("inventory").unwrap().as_deref(), Some("{}"));

        store
            .update_inventory(&item("gloves"), 1, Movement::Receipt, None, &op("username"))
            .unwrap();

        let reopened = InventoryStore::open(storage.clone(), Arc::new(InMemoryEventBus::new()), "inventory").unwrap();
        assert_eq!(quantities(&reopened, &op("username")), vec![("gloves".to_string(), 1)]);
    }

    #[test]
    fn receipts_and_withdrawals_follow_the_worked_example() {
        let (store, _) = setup();
        let user = op("username");
        let gloves = item("gloves");

        store.update_inventory(&gloves, 10, Movement::Receipt, None, &user).unwrap();
        assert_eq!(quantities(&store, &user), vec![("gloves".to_string(), 10)]);

        store.update_inventory(&gloves, 3, Movement::Withdrawal, Some("ER"), &user).unwrap();
        assert_eq!(quantities(&store, &user), vec![("gloves".to_string(), 7)]);

        let err = store
            .update_inventory(&gloves, 20, Movement::Withdrawal, Some("ER"), &user)
            .unwrap_err();
        assert!(err.is_insufficient_stock());
        assert_eq!(err.to_string(), "insufficient stock for gloves (available: 7, requested: 20)");
        assert_eq!(quantities(&store, &user), vec![("gloves".to_string(), 7)]);

        let history = store.history(&user).unwrap();
        let log: Vec<_> = history.iter().map(|t| (t.is_addition, t.quantity)).collect();
        assert_eq!(log, vec![(false, 3), (true, 10)]);
        assert_eq!(history[0].service.as_deref(), Some("ER"));
        assert_eq!(history[1].service, None);
    }

    #[test]
    fn rejected_update_leaves_blob_untouched() {
        let (store, storage) = setup();
        let user = op("username");
        store.update_inventory(&item("gloves"), 2, Movement::Receipt, None, &user).unwrap();
        let before = storage.load("inventory").unwrap();

        let err = store
            .update_inventory(&item("gloves"), 3, Movement::Withdrawal, Some("ICU"), &user)
            .unwrap_err();
        assert!(err.is_insufficient_stock());
        assert_eq!(storage.load("inventory").unwrap(), before);
    }

    #[test]
    fn rejected_update_for_unseen_operator_creates_nothing() {
        let (store, _) = setup();

        let err = store
            .update_inventory(&item("masks"), 1, Movement::Withdrawal, None, &op("newcomer"))
            .unwrap_err();
        assert!(err.is_insufficient_stock());
        assert!(store.operators().unwrap().is_empty());
    }

    #[test]
    fn get_operator_inventory_creates_and_persists_on_first_access() {
        let (store, storage) = setup();
        let user = op("username");

        assert!(store.stock_levels(&user).unwrap().is_empty());
        assert!(store.operators().unwrap().is_empty());

        let inventory = store.get_operator_inventory(&user).unwrap();
        assert!(inventory.is_empty());
        assert_eq!(store.operators().unwrap(), vec![user.clone()]);

        let blob = storage.load("inventory").unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&blob).unwrap();
        assert_eq!(value["username"]["items"], serde_json::json!({}));
        assert_eq!(value["username"]["itemTypes"], serde_json::json!([]));
    }

    #[test]
    fn each_success_notifies_once_and_failures_do_not() {
        let (store, _) = setup();
        let sub = store.subscribe();
        let user = op("username");

        store.update_inventory(&item("gloves"), 5, Movement::Receipt, None, &user).unwrap();
        store.update_inventory(&item("gloves"), 1, Movement::Withdrawal, Some("ER"), &user).unwrap();
        let _ = store.update_inventory(&item("gloves"), 99, Movement::Withdrawal, Some("ER"), &user);
        store.get_operator_inventory(&op("other")).unwrap();

        let events = sub.drain();
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.event_type() == "inventory.changed"));

        let history = store.history(&user).unwrap();
        assert_eq!(events[1].occurred_at(), history[0].date);
    }

    #[derive(Debug, Default)]
    struct RefusingBus;

    impl EventBus<InventoryChanged> for RefusingBus {
        type Error = &'static str;

        fn publish(&self, _message: InventoryChanged) -> Result<(), Self::Error> {
            Err("bus offline")
        }

        fn subscribe(&self) -> Subscription<InventoryChanged> {
            let (_tx, rx) = mpsc::channel();
            Subscription::new(rx)
        }
    }

    #[test]
    fn failed_notification_keeps_the_update() {
        let storage = Arc::new(InMemorySlotStorage::new());
        let store = InventoryStore::open(storage, RefusingBus, "inventory").unwrap();
        let user = op("username");

        store.update_inventory(&item("gloves"), 4, Movement::Receipt, None, &user).unwrap();
        assert_eq!(store.get_operator_inventory(&user).unwrap().quantity("gloves"), 4);
    }

    #[test]
    fn apply_update_keeps_caller_time() {
        let (store, _) = setup();
        let at = "2024-03-01T08:30:00Z".parse().unwrap();

        let tx = store
            .apply_update(StockUpdate {
                operator: op("username"),
                item_type: item("gloves"),
                quantity: 1,
                movement: Movement::Receipt,
                service: None,
                occurred_at: at,
            })
            .unwrap();

        assert_eq!(tx.date, at);
        assert_eq!(store.history(&op("username")).unwrap()[0].date, at);
    }

    #[test]
    fn queries_cover_types_and_operators() {
        let (store, _) = setup();
        let alice = op("alice");
        let bob = op("bob");

        store.update_inventory(&item("masks"), 3, Movement::Receipt, None, &alice).unwrap();
        store.update_inventory(&item("gloves"), 1, Movement::Receipt, None, &alice).unwrap();
        store.update_inventory(&item("gloves"), 1, Movement::Withdrawal, Some("ER"), &alice).unwrap();
        store.update_inventory(&item("masks"), 2, Movement::Receipt, None, &bob).unwrap();

        assert_eq!(store.item_types(&alice).unwrap(), vec![item("masks"), item("gloves")]);
        assert_eq!(store.withdrawable_types(&alice).unwrap(), vec![item("masks")]);
        assert_eq!(store.operators().unwrap(), vec![alice, bob]);

        let combined: Vec<_> = store
            .combined_stock()
            .unwrap()
            .into_iter()
            .map(|l| (l.item_type.into_inner(), l.quantity))
            .collect();
        assert_eq!(combined, vec![("gloves".to_string(), 0), ("masks".to_string(), 5)]);
    }

    #[test]
    fn corrupt_blob_is_reported() {
        let (store, storage) = setup();
        storage.save("inventory", "not json").unwrap();

        let err = store.stock_levels(&op("username")).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { ref slot, .. } if slot == "inventory"));
    }

    #[test]
    fn drifted_item_types_are_repaired_on_next_write() {
        let (store, storage) = setup();
        storage
            .save(
                "inventory",
                r#"{"username":{"items":{"gloves":2},"transactions":[],"itemTypes":[]}}"#,
            )
            .unwrap();

        let user = op("username");
        assert_eq!(store.item_types(&user).unwrap(), vec![item("gloves")]);

        store.update_inventory(&item("masks"), 1, Movement::Receipt, None, &user).unwrap();
        let blob: serde_json::Value = serde_json::from_str(&storage.load("inventory").unwrap().unwrap()).unwrap();
        assert_eq!(blob["username"]["itemTypes"], serde_json::json!(["gloves", "masks"]));
    }

    #[test]
    fn concurrent_receipts_through_one_store_are_not_lost() {
        let (store, _) = setup();
        let store = Arc::new(store);
        let user = op("username");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                let user = user.clone();
                thread::spawn(move || {
                    for _ in 0..25 {
                        store.update_inventory(&item("gloves"), 1, Movement::Receipt, None, &user).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let inventory = store.get_operator_inventory(&user).unwrap();
        assert_eq!(inventory.quantity("gloves"), 200);
        assert_eq!(inventory.transactions().len(), 200);
    }

    #[test]
    fn configured_memory_store_opens() {
        let config = StoreConfig {
            backend: Backend::Memory,
            data_dir: std::env::temp_dir(),
            slot: "inventory".to_string(),
        };
        let store = open_configured(&config).unwrap();
        assert_eq!(store.slot(), "inventory");
        assert!(store.operators().unwrap().is_empty());
    }
}
