//! Match and payment lifecycle managers.
//!
//! Each operation runs in its own database transaction: it loads the current
//! row, applies the ownership policy and the transition table, and writes the
//! new state with a compare-and-swap on the status it read. Events describing
//! the change are returned alongside the record and only published once the
//! transaction has committed.

use carryshare_core::types::DbId;
use carryshare_events::{EventBus, PlatformEvent};

pub mod matches;
pub mod payments;

/// Who is asking for a lifecycle change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    /// An authenticated platform user.
    User(DbId),
    /// The external payment processor, via a signed webhook.
    PaymentProcessor,
}

impl Actor {
    pub fn user_id(&self) -> Option<DbId> {
        match self {
            Actor::User(id) => Some(*id),
            Actor::PaymentProcessor => None,
        }
    }
}

/// A committed lifecycle result plus the events it owes the bus.
#[derive(Debug)]
pub struct Outcome<T> {
    pub record: T,
    pub events: Vec<PlatformEvent>,
}

impl<T> Outcome<T> {
    pub fn new(record: T) -> Self {
        Self {
            record,
            events: Vec::new(),
        }
    }

    pub fn with_event(mut self, event: PlatformEvent) -> Self {
        self.events.push(event);
        self
    }

    /// Hand the pending events to the bus and return the record.
    pub fn publish(self, bus: &EventBus) -> T {
        bus.publish_all(self.events);
        self.record
    }
}
