//! Record change notifications
//!
//! The repository publishes a [`RecordEvent`] after each committed create,
//! update or delete. Publishing never blocks and never fails the operation:
//! a full or closed mailbox is logged and the event dropped.
//!
//! ## Architecture
//!
//! - `EventBus` actor keeps the subscriber list and forwards every event
//! - Subscribers are any `Recipient<RecordEvent>`, e.g. the `EventLogger`

pub mod bus;
pub mod message;

use actix::prelude::{Addr, SendError};

pub use bus::{EventBus, EventLogger};
pub use message::{EventKind, GetSubscriberCount, RecordEvent, Subscribe, Unsubscribe};

/// Hand an event to the bus without waiting for delivery.
pub fn publish(bus: &Addr<EventBus>, event: RecordEvent) {
    match bus.try_send(event) {
        Ok(()) => {}
        Err(SendError::Full(event)) => log::warn!(
            "Event bus full, dropped {} for {} {}",
            event.kind.as_str(),
            event.entity,
            event.id
        ),
        Err(SendError::Closed(event)) => log::warn!(
            "Event bus closed, dropped {} for {} {}",
            event.kind.as_str(),
            event.entity,
            event.id
        ),
    }
}
