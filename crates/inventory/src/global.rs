use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use stockroom_core::{ItemType, OperatorId};

use crate::operator::{OperatorInventory, StockLevel};

/// Every operator's inventory: the single persisted unit.
///
/// Serialised as a plain JSON object keyed by operator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GlobalInventory {
    operators: BTreeMap<OperatorId, OperatorInventory>,
}

impl GlobalInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read access without creating a record.
    pub fn operator(&self, operator: &OperatorId) -> Option<&OperatorInventory> {
        self.operators.get(operator)
    }

    /// Mutable access, lazily creating an empty record for an unseen operator.
    ///
    /// The flag is `true` when the record was created by this call.
    pub fn operator_or_insert(&mut self, operator: &OperatorId) -> (&mut OperatorInventory, bool) {
        let created = !self.operators.contains_key(operator);
        let inventory = self.operators.entry(operator.clone()).or_default();
        (inventory, created)
    }

    /// Known operators, sorted by name.
    pub fn operators(&self) -> Vec<OperatorId> {
        self.operators.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.operators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }

    /// Stock summed per item type across all operators, sorted by name ignoring case.
    pub fn combined_stock(&self) -> Vec<StockLevel> {
        let mut totals: BTreeMap<ItemType, u64> = BTreeMap::new();
        for inventory in self.operators.values() {
            for (item_type, quantity) in inventory.items() {
                let total = totals.entry(item_type.clone()).or_default();
                *total = total.saturating_add(*quantity);
            }
        }

        let mut levels: Vec<StockLevel> = totals
            .into_iter()
            .map(|(item_type, quantity)| StockLevel { item_type, quantity })
            .collect();
        levels.sort_by(|a, b| a.item_type.display_cmp(&b.item_type));
        levels
    }

    /// Run [`OperatorInventory::reconcile_item_types`] on every record.
    ///
    /// Returns the operators whose records were repaired.
    pub fn reconcile(&mut self) -> Vec<OperatorId> {
        self.operators
            .iter_mut()
            .filter_map(|(operator, inventory)| inventory.reconcile_item_types().then(|| operator.clone()))
            .collect()
    }
}
