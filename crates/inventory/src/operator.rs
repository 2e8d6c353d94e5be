use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{ItemType, OperatorId};

use crate::error::InventoryError;
use crate::transaction::{Movement, Transaction};

/// Command: record one receipt or withdrawal for an operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockUpdate {
    pub operator: OperatorId,
    pub item_type: ItemType,
    pub quantity: u64,
    pub movement: Movement,
    pub service: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// One row of the current-stock view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLevel {
    pub item_type: ItemType,
    pub quantity: u64,
}

/// Everything recorded for a single operator.
///
/// Quantities are unsigned, so a negative stock level cannot be represented.
/// `item_types` lists every key ever seen in `items`, once each, in first-seen
/// order. `transactions` is append-only and stored oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorInventory {
    #[serde(default)]
    items: BTreeMap<ItemType, u64>,
    #[serde(default)]
    transactions: Vec<Transaction>,
    #[serde(default)]
    item_types: Vec<ItemType>,
}

impl OperatorInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &BTreeMap<ItemType, u64> {
        &self.items
    }

    /// Current quantity on hand; unknown item types have none.
    pub fn quantity(&self, item_type: &str) -> u64 {
        self.items.get(item_type).copied().unwrap_or(0)
    }

    /// Transactions in storage order (oldest first).
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Item types in first-seen order.
    pub fn item_types(&self) -> &[ItemType] {
        &self.item_types
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.transactions.is_empty()
    }

    /// Apply a stock update.
    ///
    /// On error nothing changes. On success exactly one transaction is
    /// appended and returned.
    pub fn apply(&mut self, update: &StockUpdate) -> Result<Transaction, InventoryError> {
        let available = self.quantity(update.item_type.as_str());

        let next = match update.movement {
            Movement::Receipt => available.checked_add(update.quantity).ok_or_else(|| {
                InventoryError::QuantityOverflow {
                    item_type: update.item_type.clone(),
                }
            })?,
            Movement::Withdrawal => available.checked_sub(update.quantity).ok_or_else(|| {
                InventoryError::InsufficientStock {
                    item_type: update.item_type.clone(),
                    available,
                    requested: update.quantity,
                }
            })?,
        };

        self.items.insert(update.item_type.clone(), next);

        let transaction = Transaction {
            item_type: update.item_type.clone(),
            quantity: update.quantity,
            is_addition: update.movement.is_addition(),
            service: update.service.clone(),
            operator: update.operator.clone(),
            date: update.occurred_at,
        };
        self.transactions.push(transaction.clone());

        if !self.item_types.contains(&update.item_type) {
            self.item_types.push(update.item_type.clone());
        }

        Ok(transaction)
    }

    /// Current stock, sorted by item type name ignoring case.
    pub fn stock_levels(&self) -> Vec<StockLevel> {
        let mut levels: Vec<StockLevel> = self
            .items
            .iter()
            .map(|(item_type, quantity)| StockLevel {
                item_type: item_type.clone(),
                quantity: *quantity,
            })
            .collect();
        levels.sort_by(|a, b| a.item_type.display_cmp(&b.item_type));
        levels
    }

    /// Transaction history, most recent first.
    pub fn history(&self) -> Vec<Transaction> {
        self.transactions.iter().rev().cloned().collect()
    }

    /// Item types that can currently be withdrawn, sorted by name ignoring case.
    pub fn withdrawable_types(&self) -> Vec<ItemType> {
        let mut types: Vec<ItemType> = self
            .items
            .iter()
            .filter(|(_, quantity)| **quantity > 0)
            .map(|(item_type, _)| item_type.clone())
            .collect();
        types.sort_by(ItemType::display_cmp);
        types
    }

    /// Restore the `item_types` invariant on a record read from storage.
    ///
    /// Duplicates are dropped (first occurrence wins) and any `items` key that
    /// was never registered is appended in name order. Returns whether the
    /// record changed.
    pub fn reconcile_item_types(&mut self) -> bool {
        let before = self.item_types.len();
        let mut seen = HashSet::new();
        self.item_types.retain(|t| seen.insert(t.clone()));
        let deduped = self.item_types.len() != before;

        let mut appended = false;
        for item_type in self.items.keys() {
            if seen.insert(item_type.clone()) {
                self.item_types.push(item_type.clone());
                appended = true;
            }
        }

        deduped || appended
    }
}
