use stockroom_core::ItemType;
use thiserror::Error;

/// Rejections raised by an inventory update.
///
/// Either variant leaves the operator's record exactly as it was.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InventoryError {
    /// A withdrawal asked for more than is on hand.
    #[error("insufficient stock for {item_type} (available: {available}, requested: {requested})")]
    InsufficientStock {
        item_type: ItemType,
        available: u64,
        requested: u64,
    },

    /// A receipt would push the quantity past the representable maximum.
    #[error("stock overflow for {item_type}")]
    QuantityOverflow { item_type: ItemType },
}

impl InventoryError {
    /// Item type the rejected update was about.
    pub fn item_type(&self) -> &ItemType {
        match self {
            InventoryError::InsufficientStock { item_type, .. } => item_type,
            InventoryError::QuantityOverflow { item_type } => item_type,
        }
    }
}
