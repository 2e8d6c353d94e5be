use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_events::Event;

/// Notification: the persisted inventory changed.
///
/// Subscribers re-query the store; nothing about the change itself is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryChanged {
    pub occurred_at: DateTime<Utc>,
}

impl Event for InventoryChanged {
    fn event_type(&self) -> &'static str {
        "inventory.changed"
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}
