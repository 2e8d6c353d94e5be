//! Form input validation.
//!
//! The receipt and withdrawal forms arrive as raw text. They are validated
//! here, before anything touches the store.

use chrono::{DateTime, Utc};

use stockroom_core::{DomainError, DomainResult, ItemType, OperatorId};

use crate::operator::StockUpdate;
use crate::transaction::Movement;

/// Raw receipt form: item type and quantity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReceiptForm {
    pub item_type: String,
    pub quantity: String,
}

/// Raw withdrawal form: item type, quantity and destination service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WithdrawalForm {
    pub item_type: String,
    pub quantity: String,
    pub service: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedReceipt {
    pub item_type: ItemType,
    pub quantity: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedWithdrawal {
    pub item_type: ItemType,
    pub quantity: u64,
    pub service: Option<String>,
}

fn parse_item_type(raw: &str) -> DomainResult<ItemType> {
    ItemType::parse(raw).map_err(|_| DomainError::validation("item type cannot be empty"))
}

fn parse_quantity(raw: &str) -> DomainResult<u64> {
    let trimmed = raw.trim();
    let quantity: u64 = trimmed
        .parse()
        .map_err(|_| DomainError::validation(format!("quantity must be a positive integer, got {trimmed:?}")))?;
    if quantity == 0 {
        return Err(DomainError::validation("quantity must be greater than zero"));
    }
    Ok(quantity)
}

impl ReceiptForm {
    pub fn new(item_type: impl Into<String>, quantity: impl Into<String>) -> Self {
        Self {
            item_type: item_type.into(),
            quantity: quantity.into(),
        }
    }

    pub fn validate(&self) -> DomainResult<ValidatedReceipt> {
        Ok(ValidatedReceipt {
            item_type: parse_item_type(&self.item_type)?,
            quantity: parse_quantity(&self.quantity)?,
        })
    }
}

impl WithdrawalForm {
    pub fn new(
        item_type: impl Into<String>,
        quantity: impl Into<String>,
        service: impl Into<String>,
    ) -> Self {
        Self {
            item_type: item_type.into(),
            quantity: quantity.into(),
            service: service.into(),
        }
    }

    pub fn validate(&self) -> DomainResult<ValidatedWithdrawal> {
        let service = self.service.trim();
        Ok(ValidatedWithdrawal {
            item_type: parse_item_type(&self.item_type)?,
            quantity: parse_quantity(&self.quantity)?,
            service: (!service.is_empty()).then(|| service.to_string()),
        })
    }
}

impl ValidatedReceipt {
    pub fn into_update(self, operator: OperatorId, occurred_at: DateTime<Utc>) -> StockUpdate {
        StockUpdate {
            operator,
            item_type: self.item_type,
            quantity: self.quantity,
            movement: Movement::Receipt,
            service: None,
            occurred_at,
        }
    }
}

impl ValidatedWithdrawal {
    pub fn into_update(self, operator: OperatorId, occurred_at: DateTime<Utc>) -> StockUpdate {
        StockUpdate {
            operator,
            item_type: self.item_type,
            quantity: self.quantity,
            movement: Movement::Withdrawal,
            service: self.service,
            occurred_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn receipt_form_trims_and_parses() {
        let form = ReceiptForm::new("  gloves ", " 10 ");
        let valid = form.validate().unwrap();
        assert_eq!(valid.item_type.as_str(), "gloves");
        assert_eq!(valid.quantity, 10);
    }

    #[test]
    fn empty_item_type_is_rejected() {
        let err = ReceiptForm::new("   ", "10").validate().unwrap_err();
        assert_eq!(err, DomainError::validation("item type cannot be empty"));
    }

    #[test]
    fn quantity_must_be_a_positive_integer() {
        for bad in ["0", "-3", "2.5", "", "ten", "12abc"] {
            let result = ReceiptForm::new("gloves", bad).validate();
            assert!(matches!(result, Err(DomainError::Validation(_))), "accepted {bad:?}");
        }
    }

    #[test]
    fn blank_service_becomes_none() {
        let valid = WithdrawalForm::new("gloves", "3", "  ").validate().unwrap();
        assert_eq!(valid.service, None);

        let valid = WithdrawalForm::new("gloves", "3", " ER ").validate().unwrap();
        assert_eq!(valid.service.as_deref(), Some("ER"));
    }

    #[test]
    fn validated_forms_become_updates() {
        let operator = OperatorId::parse("username").unwrap();
        let at: DateTime<Utc> = "2024-03-01T08:30:00Z".parse().unwrap();

        let update = WithdrawalForm::new("gloves", "3", "ER")
            .validate()
            .unwrap()
            .into_update(operator.clone(), at);

        assert_eq!(update.movement, Movement::Withdrawal);
        assert_eq!(update.operator, operator);
        assert_eq!(update.occurred_at, at);
        assert_eq!(update.service.as_deref(), Some("ER"));

        let update = ReceiptForm::new("gloves", "3").validate().unwrap().into_update(operator, at);
        assert_eq!(update.movement, Movement::Receipt);
        assert_eq!(update.service, None);
    }
}
