use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use stockroom_core::{ItemType, OperatorId};

/// Direction of a stock movement.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Movement {
    /// Stock received (addition).
    Receipt,
    /// Stock handed out to a service (subtraction).
    Withdrawal,
}

impl Movement {
    pub fn from_is_addition(is_addition: bool) -> Self {
        if is_addition {
            Movement::Receipt
        } else {
            Movement::Withdrawal
        }
    }

    pub fn is_addition(self) -> bool {
        matches!(self, Movement::Receipt)
    }

    pub fn label(self) -> &'static str {
        match self {
            Movement::Receipt => "Receipt",
            Movement::Withdrawal => "Withdrawal",
        }
    }
}

/// One recorded receipt or withdrawal.
///
/// The field names match the persisted JSON layout exactly. Older blobs wrote
/// the operator under `operateur`; that spelling is still accepted on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub quantity: u64,
    pub is_addition: bool,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub service: Option<String>,
    #[serde(alias = "operateur")]
    pub operator: OperatorId,
    pub date: DateTime<Utc>,
}

/// The browser form stored an empty string when no service was entered.
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let service = Option::<String>::deserialize(deserializer)?;
    Ok(service.filter(|s| !s.trim().is_empty()))
}

impl Transaction {
    pub fn movement(&self) -> Movement {
        Movement::from_is_addition(self.is_addition)
    }
}
