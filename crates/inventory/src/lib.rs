//! Inventory domain module.
//!
//! This crate contains the business rules for per-operator stock keeping,
//! implemented purely as deterministic domain logic (no IO, no storage).

pub mod error;
pub mod form;
pub mod global;
pub mod notification;
pub mod operator;
pub mod transaction;

pub use error::InventoryError;
pub use form::{ReceiptForm, ValidatedReceipt, ValidatedWithdrawal, WithdrawalForm};
pub use global::GlobalInventory;
pub use notification::InventoryChanged;
pub use operator::{OperatorInventory, StockLevel, StockUpdate};
pub use transaction::{Movement, Transaction};
