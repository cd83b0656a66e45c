//! Payment entity models and DTOs.

use carryshare_core::payment_status::PaymentStatus;
use carryshare_core::policy::MatchParties;
use carryshare_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `payments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: DbId,
    pub user_id: DbId,
    pub match_id: DbId,
    pub amount: f64,
    pub currency: String,
    pub payment_method: String,
    #[sqlx(try_from = "String")]
    pub status: PaymentStatus,
    pub transaction_id: Option<String>,
    pub payment_intent_id: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A payment joined with the two participants of the paid match.
#[derive(Debug, Clone, FromRow)]
pub struct PaymentWithParties {
    #[sqlx(flatten)]
    pub record: Payment,
    pub package_owner_id: DbId,
    pub ride_owner_id: DbId,
}

impl PaymentWithParties {
    pub fn parties(&self) -> MatchParties {
        MatchParties::new(self.package_owner_id, self.ride_owner_id)
    }
}

/// DTO for inserting a payment. The status is always `PENDING`.
#[derive(Debug, Clone)]
pub struct CreatePayment {
    pub user_id: DbId,
    pub match_id: DbId,
    pub amount: f64,
    pub currency: String,
    pub payment_method: String,
}

/// Opaque payment-processor references. `None` leaves the stored value as is.
#[derive(Debug, Clone, Default)]
pub struct ExternalRefs {
    pub transaction_id: Option<String>,
    pub payment_intent_id: Option<String>,
}

impl ExternalRefs {
    pub fn is_empty(&self) -> bool {
        self.transaction_id.is_none() && self.payment_intent_id.is_none()
    }
}

/// Scope and filters for listing payments.
///
/// Listings cover payments the user owns or whose match they participate in.
#[derive(Debug, Clone)]
pub struct PaymentFilter {
    pub user_id: DbId,
    pub statuses: Vec<PaymentStatus>,
    pub match_id: Option<DbId>,
    pub limit: i64,
    pub offset: i64,
}
