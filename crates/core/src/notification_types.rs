//! Well-known notification type constants.
//!
//! These are stored verbatim in `notifications.notification_type` and double
//! as the `event_type` of the platform events the lifecycle handlers publish
//! after commit.

use crate::payment_status::PaymentStatus;

/// A participant proposed a match; sent to the counterparty.
pub const MATCH_PROPOSED: &str = "match.proposed";

/// A match moved to a new status; sent to the counterparty.
pub const MATCH_STATUS_CHANGED: &str = "match.status_changed";

/// The proposed price of a match was revised; sent to the counterparty.
pub const MATCH_PRICE_CHANGED: &str = "match.price_changed";

/// A payment was created for a confirmed match; sent to the counterparty.
pub const PAYMENT_INITIATED: &str = "payment.initiated";

pub const PAYMENT_COMPLETED: &str = "payment.completed";
pub const PAYMENT_FAILED: &str = "payment.failed";
pub const PAYMENT_REFUNDED: &str = "payment.refunded";

/// Source entity kinds used for deep links.
pub const ENTITY_MATCH: &str = "match";
pub const ENTITY_PAYMENT: &str = "payment";

/// Notification type announcing that a payment reached `status`.
pub fn for_payment_status(status: PaymentStatus) -> Option<&'static str> {
    match status {
        PaymentStatus::Pending => None,
        PaymentStatus::Completed => Some(PAYMENT_COMPLETED),
        PaymentStatus::Failed => Some(PAYMENT_FAILED),
        PaymentStatus::Refunded => Some(PAYMENT_REFUNDED),
    }
}
