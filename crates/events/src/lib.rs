//! Change notifications (mechanics only).
//!
//! The store publishes a notification after every successful update; the
//! presentation layer subscribes and re-queries. Notifications carry no
//! state of their own.

pub mod bus;
pub mod event;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
